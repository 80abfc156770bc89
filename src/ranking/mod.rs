//! Co-expression ranking: sort by significance, correct for multiple testing

mod pipeline;
mod rank;

pub use pipeline::RankingPipeline;
pub use rank::{rank, RankingParams, RankingSummary};
