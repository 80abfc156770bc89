//! Fetch-then-rank pipeline over the co-expression cache

use std::cell::RefCell;
use std::rc::Rc;

use super::rank::{rank, RankingParams};
use crate::cache::{Derived, FetchCache, Fetcher};
use crate::data::{CoExpressionQuery, CoExpressionRow, RankedRow};

struct RankedMemo {
    query: CoExpressionQuery,
    raw: Rc<Vec<CoExpressionRow>>,
    ranked: Rc<Vec<RankedRow>>,
}

/// Ranked co-expression rows for the current query.
///
/// The full query (reference gene, profile, scope) is the cache key, so a
/// result is never reused across scopes. The ranked list is recomputed only
/// when the query or the fetched row set changes. Cloning shares state.
#[derive(Clone)]
pub struct RankingPipeline {
    cache: FetchCache<CoExpressionQuery, Vec<CoExpressionRow>>,
    params: RankingParams,
    memo: Rc<RefCell<Option<RankedMemo>>>,
}

impl RankingPipeline {
    pub fn new(cache: FetchCache<CoExpressionQuery, Vec<CoExpressionRow>>, params: RankingParams) -> Self {
        Self {
            cache,
            params,
            memo: Rc::new(RefCell::new(None)),
        }
    }

    /// Build the pipeline together with its cache
    pub fn from_source<F>(source: F, params: RankingParams) -> Self
    where
        F: Fetcher<CoExpressionQuery, Vec<CoExpressionRow>> + 'static,
    {
        Self::new(FetchCache::new("co-expression data", source), params)
    }

    pub fn cache(&self) -> &FetchCache<CoExpressionQuery, Vec<CoExpressionRow>> {
        &self.cache
    }

    pub fn params(&self) -> &RankingParams {
        &self.params
    }

    /// Ranked rows for `query`, fetching on first access
    pub fn ranked(&self, query: &CoExpressionQuery) -> Derived<Rc<Vec<RankedRow>>> {
        let raw = match self.cache.get(query).derive(self.cache.resource()) {
            Derived::Ready(raw) => raw,
            Derived::Pending => return Derived::Pending,
            Derived::Failed(err) => return Derived::Failed(err),
        };

        let mut memo = self.memo.borrow_mut();
        if let Some(m) = memo.as_ref() {
            if m.query == *query && Rc::ptr_eq(&m.raw, &raw) {
                return Derived::Ready(Rc::clone(&m.ranked));
            }
        }

        log::debug!("Ranking {} co-expression rows for {:?}", raw.len(), query);
        let ranked = Rc::new(rank(&raw, &self.params));
        *memo = Some(RankedMemo {
            query: query.clone(),
            raw,
            ranked: Rc::clone(&ranked),
        });
        Derived::Ready(ranked)
    }

    /// Drop settled rows for `query` so the next read refetches.
    /// Returns false while the fetch is still pending.
    pub fn refresh(&self, query: &CoExpressionQuery) -> bool {
        self.cache.invalidate(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Completer, FnSource};
    use crate::data::{Gene, GeneScope};

    type Pending = Rc<RefCell<Vec<Completer<CoExpressionQuery, Vec<CoExpressionRow>>>>>;

    fn deferred_pipeline() -> (RankingPipeline, Pending) {
        let pending: Pending = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pending);
        let pipeline = RankingPipeline::from_source(
            FnSource(move |c: Completer<CoExpressionQuery, Vec<CoExpressionRow>>| sink.borrow_mut().push(c)),
            RankingParams::default(),
        );
        (pipeline, pending)
    }

    fn rows() -> Vec<CoExpressionRow> {
        vec![
            CoExpressionRow::new(Gene::new(2, "B"), 0.2, 0.3),
            CoExpressionRow::new(Gene::new(1, "A"), -0.6, 0.001),
        ]
    }

    #[test]
    fn test_pending_then_ranked() {
        let (pipeline, pending) = deferred_pipeline();
        let query = CoExpressionQuery::new(7157, "brca_mrna", GeneScope::Restricted);

        assert!(pipeline.ranked(&query).is_pending());
        pending.borrow_mut().pop().unwrap().succeed(rows());

        let ranked = pipeline.ranked(&query);
        let ranked = ranked.ready().unwrap();
        assert_eq!(ranked[0].entrez_gene_id(), 1);
        assert_eq!(pipeline.cache().fetch_count(), 1);
    }

    #[test]
    fn test_memoized_until_query_changes() {
        let (pipeline, pending) = deferred_pipeline();
        let query = CoExpressionQuery::new(7157, "brca_mrna", GeneScope::Restricted);
        pipeline.ranked(&query);
        pending.borrow_mut().pop().unwrap().succeed(rows());

        let a = pipeline.ranked(&query);
        let b = pipeline.ranked(&query);
        assert!(Rc::ptr_eq(a.ready().unwrap(), b.ready().unwrap()));
    }

    #[test]
    fn test_scope_flip_refetches() {
        let (pipeline, pending) = deferred_pipeline();
        let narrow = CoExpressionQuery::new(7157, "brca_mrna", GeneScope::Restricted);
        let all = CoExpressionQuery::new(7157, "brca_mrna", GeneScope::All);

        pipeline.ranked(&narrow);
        pending.borrow_mut().pop().unwrap().succeed(rows());
        assert!(pipeline.ranked(&narrow).is_ready());

        assert!(pipeline.ranked(&all).is_pending());
        assert_eq!(pipeline.cache().fetch_count(), 2);
    }

    #[test]
    fn test_fetch_error_is_surfaced() {
        let (pipeline, pending) = deferred_pipeline();
        let query = CoExpressionQuery::new(7157, "brca_mrna", GeneScope::All);
        pipeline.ranked(&query);
        pending.borrow_mut().pop().unwrap().fail("timeout");

        let result = pipeline.ranked(&query);
        let err = result.error().unwrap();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_refresh_refetches() {
        let (pipeline, pending) = deferred_pipeline();
        let query = CoExpressionQuery::new(7157, "brca_mrna", GeneScope::All);
        pipeline.ranked(&query);
        pending.borrow_mut().pop().unwrap().fail("timeout");

        assert!(pipeline.refresh(&query));
        assert!(pipeline.ranked(&query).is_pending());
        pending.borrow_mut().pop().unwrap().succeed(rows());
        assert!(pipeline.ranked(&query).is_ready());
    }
}
