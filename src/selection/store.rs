//! Selection state for the co-expression table

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use crate::cache::{Derived, Subscription};
use crate::data::{CoExpressionQuery, CoExpressionRow, RankedRow};
use crate::error::CoexprError;
use crate::ranking::RankingPipeline;

/// Which rows the table offers for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    All,
    /// Correlation >= 0
    PositiveOnly,
    /// Correlation <= 0
    NegativeOnly,
}

impl DisplayMode {
    /// Zero correlation passes both sign filters
    pub fn admits(&self, row: &CoExpressionRow) -> bool {
        match self {
            DisplayMode::All => true,
            DisplayMode::PositiveOnly => row.spearman_correlation >= 0.0,
            DisplayMode::NegativeOnly => row.spearman_correlation <= 0.0,
        }
    }
}

impl FromStr for DisplayMode {
    type Err = CoexprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(DisplayMode::All),
            "positive" | "pos" => Ok(DisplayMode::PositiveOnly),
            "negative" | "neg" => Ok(DisplayMode::NegativeOnly),
            other => Err(CoexprError::InvalidInput {
                reason: format!(
                    "Unknown display mode '{}'. Use 'all', 'positive' or 'negative'.",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct SelectionState {
    mode: DisplayMode,
    highlighted: Option<RankedRow>,
    rows: Rc<Vec<RankedRow>>,
    /// Rows were non-empty at the last sync
    rows_available: bool,
    /// Auto-highlight may fire; cleared once it fires or the user deselects
    auto_armed: bool,
}

/// Holds the display mode and highlighted row over the latest ranked rows.
///
/// Auto-highlight: when ranked rows are available and nothing is
/// highlighted, the first row in canonical (p-value) order is highlighted,
/// regardless of the display mode. This fires once per transition of the
/// rows from pending/empty/failed to non-empty, so an explicit de-selection
/// sticks until new data arrives. Cloning shares state.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    state: Rc<RefCell<SelectionState>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.state.borrow().mode
    }

    /// Change the filter; the highlight is left alone
    pub fn set_display_mode(&self, mode: DisplayMode) {
        self.state.borrow_mut().mode = mode;
    }

    pub fn highlighted(&self) -> Option<RankedRow> {
        self.state.borrow().highlighted.clone()
    }

    /// Highlight a row, or clear the highlight with `None`.
    /// Clearing counts as an explicit de-selection.
    pub fn set_highlighted(&self, row: Option<RankedRow>) {
        let mut state = self.state.borrow_mut();
        if row.is_none() {
            state.auto_armed = false;
        }
        state.highlighted = row;
    }

    /// Whether `row` is the highlighted comparison gene
    pub fn is_highlighted(&self, row: &RankedRow) -> bool {
        self.state
            .borrow()
            .highlighted
            .as_ref()
            .map_or(false, |h| h.same_gene(row))
    }

    /// Latest ranked rows in canonical order
    pub fn rows(&self) -> Rc<Vec<RankedRow>> {
        Rc::clone(&self.state.borrow().rows)
    }

    /// Rows admitted by the display mode, in canonical order
    pub fn visible_rows(&self) -> Vec<RankedRow> {
        let state = self.state.borrow();
        state
            .rows
            .iter()
            .filter(|r| state.mode.admits(&r.row))
            .cloned()
            .collect()
    }

    /// Feed the latest ranked rows; returns true if auto-highlight fired
    pub fn sync(&self, ranked: &Derived<Rc<Vec<RankedRow>>>) -> bool {
        let mut state = self.state.borrow_mut();
        let rows = match ranked {
            Derived::Ready(rows) if !rows.is_empty() => Rc::clone(rows),
            _ => {
                state.rows = Rc::new(Vec::new());
                state.rows_available = false;
                return false;
            }
        };

        state.rows = rows;
        if !state.rows_available {
            state.rows_available = true;
            state.auto_armed = true;
        }

        if state.highlighted.is_none() && state.auto_armed {
            let first = state.rows[0].clone();
            log::debug!(
                "Auto-highlighting {} ({})",
                first.gene().hugo_gene_symbol,
                first.entrez_gene_id()
            );
            state.highlighted = Some(first);
            state.auto_armed = false;
            return true;
        }
        false
    }

    /// React to the pipeline's results for `query` until the returned
    /// subscription is disposed. Syncs once immediately, which also issues
    /// the fetch.
    pub fn watch(&self, pipeline: &RankingPipeline, query: CoExpressionQuery) -> Subscription {
        let weak = Rc::downgrade(&self.state);
        let reacting = pipeline.clone();
        let watched = query.clone();
        let subscription = pipeline.cache().watch(move |key: &CoExpressionQuery| {
            if *key != watched {
                return;
            }
            if let Some(state) = weak.upgrade() {
                let ranked = reacting.ranked(&watched);
                SelectionStore { state }.sync(&ranked);
            }
        });

        self.sync(&pipeline.ranked(&query));
        subscription
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Completer, FnSource};
    use crate::data::{Gene, GeneScope};
    use crate::ranking::{rank, RankingParams};

    fn ranked_rows(correlations: &[f64]) -> Rc<Vec<RankedRow>> {
        let raw: Vec<CoExpressionRow> = correlations
            .iter()
            .enumerate()
            .map(|(i, &rho)| {
                CoExpressionRow::new(Gene::new(i as i64 + 1, &format!("G{}", i + 1)), rho, 0.01 * (i + 1) as f64)
            })
            .collect();
        Rc::new(rank(&raw, &RankingParams::default()))
    }

    #[test]
    fn test_positive_only_includes_zero() {
        let store = SelectionStore::new();
        store.sync(&Derived::Ready(ranked_rows(&[-0.5, 0.0, 0.3])));
        store.set_display_mode(DisplayMode::PositiveOnly);

        let visible: Vec<f64> = store.visible_rows().iter().map(|r| r.spearman_correlation()).collect();
        assert_eq!(visible, vec![0.0, 0.3]);

        store.set_display_mode(DisplayMode::NegativeOnly);
        let visible: Vec<f64> = store.visible_rows().iter().map(|r| r.spearman_correlation()).collect();
        assert_eq!(visible, vec![-0.5, 0.0]);

        store.set_display_mode(DisplayMode::All);
        assert_eq!(store.visible_rows().len(), 3);
    }

    #[test]
    fn test_auto_highlight_first_row() {
        let store = SelectionStore::new();
        let rows = ranked_rows(&[-0.5, 0.2, 0.3]);
        store.set_display_mode(DisplayMode::PositiveOnly);

        assert!(store.sync(&Derived::Ready(Rc::clone(&rows))));
        // canonical first row, even though the filter hides it
        assert_eq!(store.highlighted().unwrap().entrez_gene_id(), rows[0].entrez_gene_id());
        assert!(!store.sync(&Derived::Ready(rows)));
    }

    #[test]
    fn test_explicit_highlight_survives_mode_change() {
        let store = SelectionStore::new();
        let rows = ranked_rows(&[0.5, -0.2, 0.3]);
        store.sync(&Derived::Ready(Rc::clone(&rows)));

        store.set_highlighted(Some(rows[1].clone()));
        store.set_display_mode(DisplayMode::PositiveOnly);
        store.sync(&Derived::Ready(Rc::clone(&rows)));

        assert_eq!(store.highlighted().unwrap().entrez_gene_id(), 2);
        assert!(store.is_highlighted(&rows[1]));
        assert!(!store.is_highlighted(&rows[0]));
    }

    #[test]
    fn test_deselection_sticks_until_new_data() {
        let store = SelectionStore::new();
        let rows = ranked_rows(&[0.5, 0.4]);
        store.sync(&Derived::Ready(Rc::clone(&rows)));
        store.set_highlighted(None);

        assert!(!store.sync(&Derived::Ready(Rc::clone(&rows))));
        assert!(store.highlighted().is_none());

        store.sync(&Derived::Pending);
        assert!(store.rows().is_empty());
        assert!(store.sync(&Derived::Ready(rows)));
        assert_eq!(store.highlighted().unwrap().entrez_gene_id(), 1);
    }

    #[test]
    fn test_empty_rows_do_not_highlight() {
        let store = SelectionStore::new();
        assert!(!store.sync(&Derived::Ready(Rc::new(Vec::new()))));
        assert!(store.highlighted().is_none());
    }

    #[test]
    fn test_tied_pvalues_highlight_first_in_fetch_order() {
        let raw = vec![
            CoExpressionRow::new(Gene::new(30, "C"), 0.4, 0.01),
            CoExpressionRow::new(Gene::new(10, "A"), 0.5, 0.01),
            CoExpressionRow::new(Gene::new(20, "B"), 0.6, 0.2),
        ];
        let store = SelectionStore::new();
        store.sync(&Derived::Ready(Rc::new(rank(&raw, &RankingParams::default()))));
        assert_eq!(store.highlighted().unwrap().entrez_gene_id(), 30);
    }

    #[test]
    fn test_watch_reacts_and_disposes() {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pending);
        let pipeline = RankingPipeline::from_source(
            FnSource(move |c: Completer<CoExpressionQuery, Vec<CoExpressionRow>>| sink.borrow_mut().push(c)),
            RankingParams::default(),
        );
        let query = CoExpressionQuery::new(7157, "brca_mrna", GeneScope::Restricted);
        let store = SelectionStore::new();

        let subscription = store.watch(&pipeline, query.clone());
        assert!(store.highlighted().is_none());
        assert_eq!(pipeline.cache().n_listeners(), 1);

        let completer: Completer<CoExpressionQuery, Vec<CoExpressionRow>> = pending.borrow_mut().pop().unwrap();
        completer.succeed(vec![
            CoExpressionRow::new(Gene::new(5, "E"), 0.1, 0.4),
            CoExpressionRow::new(Gene::new(6, "F"), 0.7, 0.001),
        ]);
        assert_eq!(store.highlighted().unwrap().entrez_gene_id(), 6);
        assert_eq!(store.rows().len(), 2);

        subscription.dispose();
        assert_eq!(pipeline.cache().n_listeners(), 0);

        // no reaction after disposal
        let other = CoExpressionQuery::new(7157, "brca_mrna", GeneScope::All);
        pipeline.ranked(&other);
        pending.borrow_mut().pop().unwrap().succeed(Vec::new());
        assert_eq!(store.rows().len(), 2);
    }
}
