//! Fetchers backed by an in-memory expression table

use std::rc::Rc;

use crate::cache::{Completer, Fetcher};
use crate::data::{CoExpressionQuery, CoExpressionRow, ExpressionTable, Gene, GeneScope, NumericDataQuery, NumericMolecularDatum};
use crate::testing::{compute_coexpression, CorrelationParams};

/// Numeric data per (gene, profile); genes without data resolve empty
#[derive(Debug, Clone)]
pub struct ExpressionSource {
    table: Rc<ExpressionTable>,
}

impl ExpressionSource {
    pub fn new(table: Rc<ExpressionTable>) -> Self {
        Self { table }
    }
}

impl Fetcher<NumericDataQuery, Vec<NumericMolecularDatum>> for ExpressionSource {
    fn fetch(&self, completer: Completer<NumericDataQuery, Vec<NumericMolecularDatum>>) {
        let data = self.table.get(completer.key()).map(|d| d.to_vec()).unwrap_or_default();
        completer.succeed(data);
    }
}

/// Co-expression rows computed from the expression table.
///
/// The restricted scope keeps genes with |rho| >= `params.threshold`; the
/// all-genes scope keeps every gene with a defined correlation.
#[derive(Debug, Clone)]
pub struct CorrelationSource {
    table: Rc<ExpressionTable>,
    params: CorrelationParams,
}

impl CorrelationSource {
    pub fn new(table: Rc<ExpressionTable>, params: CorrelationParams) -> Self {
        Self { table, params }
    }

    fn compute(&self, query: &CoExpressionQuery) -> std::result::Result<Vec<CoExpressionRow>, String> {
        let profile = query.molecular_profile_id.as_str();
        let reference = self
            .table
            .get(&NumericDataQuery::new(query.reference_gene, profile))
            .ok_or_else(|| format!("gene {} has no data in profile {}", query.reference_gene, profile))?;

        let candidates: Vec<(Gene, &[NumericMolecularDatum])> = self
            .table
            .genes_in_profile(profile)
            .into_iter()
            .filter_map(|id| {
                self.table
                    .get(&NumericDataQuery::new(id, profile))
                    .map(|data| (self.table.gene(id), data))
            })
            .collect();

        let params = match query.scope {
            GeneScope::Restricted => self.params.clone(),
            GeneScope::All => CorrelationParams {
                threshold: 0.0,
                ..self.params.clone()
            },
        };
        Ok(compute_coexpression(query.reference_gene, reference, &candidates, &params))
    }
}

impl Fetcher<CoExpressionQuery, Vec<CoExpressionRow>> for CorrelationSource {
    fn fetch(&self, completer: Completer<CoExpressionQuery, Vec<CoExpressionRow>>) {
        let result = self.compute(completer.key());
        completer.resolve(result);
    }
}
