//! Statistical testing: correlation statistics and FDR correction

mod correlation;
mod fdr;

pub use correlation::{
    average_ranks, compute_coexpression, correlation_pvalue, spearman_correlation, CorrelationParams,
};
pub use fdr::{benjamini_hochberg, benjamini_hochberg_step_up, FdrMethod};
