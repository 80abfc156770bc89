//! Data structures for co-expression analysis

mod coverage;
mod molecular;
mod rows;

pub use coverage::{CoverageInformation, SampleCoverage, StudyMutationProfiles};
pub use molecular::{ExpressionTable, MutationRecord, NumericDataQuery, NumericMolecularDatum, SampleKey};
pub use rows::{CoExpressionQuery, CoExpressionRow, EntrezGeneId, Gene, GeneScope, RankedRow};
