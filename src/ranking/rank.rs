//! Sort co-expression rows by significance and attach q-values

use rayon::prelude::*;
use std::fmt;

use crate::data::{CoExpressionRow, RankedRow};
use crate::testing::FdrMethod;

/// Parameters for ranking
#[derive(Debug, Clone)]
pub struct RankingParams {
    /// FDR variant used for q-values
    pub fdr_method: FdrMethod,
    /// Row counts at or above this are sorted in parallel
    pub parallel_threshold: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            fdr_method: FdrMethod::Positional,
            parallel_threshold: 50_000,
        }
    }
}

/// Stable-sort rows by p-value ascending and attach q-values by position.
///
/// Rows with equal p-values keep their input order. The output order is the
/// canonical order consumers use for "first row" selection. Deterministic:
/// ranking the same input twice gives bit-identical output.
pub fn rank(raw_rows: &[CoExpressionRow], params: &RankingParams) -> Vec<RankedRow> {
    let mut sorted: Vec<CoExpressionRow> = raw_rows.to_vec();
    if sorted.len() >= params.parallel_threshold {
        sorted.par_sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
    } else {
        sorted.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
    }

    let pvalues: Vec<f64> = sorted.iter().map(|r| r.p_value).collect();
    let qvalues = params.fdr_method.apply(&pvalues);

    sorted
        .into_iter()
        .zip(qvalues)
        .map(|(row, q_value)| RankedRow { row, q_value })
        .collect()
}

/// Summary of a ranked row set
#[derive(Debug, Clone)]
pub struct RankingSummary {
    pub total_genes: usize,
    pub significant: usize,
    pub positive: usize,
    pub negative: usize,
    pub alpha: f64,
}

impl RankingSummary {
    /// Count rows with q < alpha, split by correlation sign
    pub fn from_rows(rows: &[RankedRow], alpha: f64) -> Self {
        let significant: Vec<&RankedRow> = rows
            .iter()
            .filter(|r| r.q_value.is_finite() && r.q_value < alpha)
            .collect();
        Self {
            total_genes: rows.len(),
            significant: significant.len(),
            positive: significant.iter().filter(|r| r.spearman_correlation() > 0.0).count(),
            negative: significant.iter().filter(|r| r.spearman_correlation() < 0.0).count(),
            alpha,
        }
    }
}

impl fmt::Display for RankingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Co-expression Summary")?;
        writeln!(f, "=====================")?;
        writeln!(f, "Genes ranked: {}", self.total_genes)?;
        writeln!(f, "Significant (q < {}): {}", self.alpha, self.significant)?;
        writeln!(f, "  Positively correlated: {}", self.positive)?;
        writeln!(f, "  Negatively correlated: {}", self.negative)?;
        Ok(())
    }
}
