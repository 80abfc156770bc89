//! rust_coexpression: gene co-expression ranking and plot data joins
//!
//! Ranks every comparison gene's correlation with a reference gene, attaches
//! Benjamini-Hochberg q-values, tracks the highlighted comparison gene, and
//! joins both genes' expression, mutation calls and coverage into
//! per-sample plot data. Upstream data arrives through keyed, memoizing
//! fetch caches; every derived value is pending, ready or failed.
//!
//! # Example
//!
//! ```ignore
//! use rust_coexpression::prelude::*;
//!
//! let pipeline = RankingPipeline::from_source(source, RankingParams::default());
//! let store = SelectionStore::new();
//! let subscription = store.watch(&pipeline, query);
//!
//! let request = PlotRequest::new(reference, store.highlighted().map(|r| r.gene().clone()), "brca_mrna");
//! let plot = builder.build(&request);
//!
//! subscription.dispose();
//! ```

pub mod cache;
pub mod cli;
pub mod data;
pub mod error;
pub mod io;
pub mod join;
pub mod ranking;
pub mod selection;
pub mod sources;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::{Completer, Derived, FetchCache, FetchHandle, FetchStatus, Fetcher, FnSource, Subscription, TableSource};
    pub use crate::data::{
        CoExpressionQuery, CoExpressionRow, CoverageInformation, EntrezGeneId, ExpressionTable, Gene, GeneScope,
        MutationRecord, NumericDataQuery, NumericMolecularDatum, RankedRow, SampleKey, StudyMutationProfiles,
    };
    pub use crate::error::{CoexprError, Result};
    pub use crate::io::{
        read_coexpression_rows, read_coverage, read_expression_table, read_mutations, read_study_profiles,
        write_plot_data, write_ranked_rows, PlotDocument,
    };
    pub use crate::join::{JoinParams, MutationStatus, PlotDataBuilder, PlotDatum, PlotRequest, PlotSources};
    pub use crate::ranking::{rank, RankingParams, RankingPipeline, RankingSummary};
    pub use crate::selection::{DisplayMode, SelectionStore};
    pub use crate::sources::{CorrelationSource, ExpressionSource};
    pub use crate::testing::{benjamini_hochberg, benjamini_hochberg_step_up, CorrelationParams, FdrMethod};
}

use std::rc::Rc;

use prelude::*;

/// Everything a co-expression view needs, wired over one expression table
pub struct CoExpressionSession {
    pub pipeline: RankingPipeline,
    pub store: SelectionStore,
    pub builder: PlotDataBuilder,
}

impl CoExpressionSession {
    /// Wire correlation, numeric, mutation and coverage caches.
    /// Passing no mutations disables the mutation overlay.
    pub fn from_tables(
        table: Rc<ExpressionTable>,
        mutations: Option<std::collections::HashMap<EntrezGeneId, Vec<MutationRecord>>>,
        coverage: CoverageInformation,
        study_profiles: StudyMutationProfiles,
        correlation: CorrelationParams,
        ranking: RankingParams,
    ) -> Self {
        let pipeline = RankingPipeline::from_source(CorrelationSource::new(Rc::clone(&table), correlation), ranking);
        let sources = PlotSources {
            numeric: FetchCache::new("numeric data", ExpressionSource::new(table)),
            mutations: mutations
                .map(|m| FetchCache::new("mutation data", TableSource::new(m).with_fallback(Vec::new()))),
            coverage: FetchCache::new("coverage information", TableSource::single(coverage)),
            study_profiles: FetchCache::new("mutation profiles", TableSource::single(study_profiles)),
        };

        Self {
            pipeline,
            store: SelectionStore::new(),
            builder: PlotDataBuilder::new(sources, JoinParams::default()),
        }
    }

    /// Plot data for the reference gene and the store's highlighted gene
    pub fn plot_for_highlighted(&self, reference_gene: &Gene, molecular_profile_id: &str) -> Derived<Rc<Vec<PlotDatum>>> {
        let comparison = self.store.highlighted().map(|r| r.gene().clone());
        self.builder
            .build(&PlotRequest::new(reference_gene.clone(), comparison, molecular_profile_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cohort() -> Rc<ExpressionTable> {
        // gene 1 is the reference; gene 3 tracks it most closely
        let profiles: [(i64, [f64; 6]); 3] = [
            (1, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            (2, [6.0, 4.0, 5.0, 3.0, 1.0, 2.0]),
            (3, [1.1, 2.5, 2.9, 4.2, 5.5, 6.1]),
        ];
        let mut records = Vec::new();
        for (gene, values) in profiles {
            for (i, value) in values.iter().enumerate() {
                records.push(NumericMolecularDatum {
                    study_id: "brca".to_string(),
                    sample_id: format!("S{}", i + 1),
                    patient_id: format!("P{}", i + 1),
                    molecular_profile_id: "brca_mrna".to_string(),
                    entrez_gene_id: gene,
                    value: *value,
                });
            }
        }
        Rc::new(ExpressionTable::from_records(
            records,
            vec![Gene::new(1, "REF"), Gene::new(2, "ANTI"), Gene::new(3, "PRO")],
        ))
    }

    #[test]
    fn test_full_session() {
        let mut mutations = HashMap::new();
        mutations.insert(
            3,
            vec![MutationRecord {
                study_id: "brca".to_string(),
                sample_id: "S1".to_string(),
                patient_id: "P1".to_string(),
                molecular_profile_id: "brca_mutations".to_string(),
                entrez_gene_id: 3,
                protein_change: "R248Q".to_string(),
                mutation_type: "Missense_Mutation".to_string(),
            }],
        );
        let mut coverage = CoverageInformation::new();
        for i in 1..=6 {
            coverage.add_all_genes(SampleKey::new("brca", &format!("S{}", i)), "brca_mutations");
        }
        let mut profiles = StudyMutationProfiles::new();
        profiles.insert("brca", "brca_mutations");

        let session = CoExpressionSession::from_tables(
            cohort(),
            Some(mutations),
            coverage,
            profiles,
            CorrelationParams::default(),
            RankingParams::default(),
        );

        let reference = Gene::new(1, "REF");
        let query = CoExpressionQuery::new(1, "brca_mrna", GeneScope::All);
        let subscription = session.store.watch(&session.pipeline, query);

        // PRO has rho = 1 and the smallest p-value
        let highlighted = session.store.highlighted().unwrap();
        assert_eq!(highlighted.gene().hugo_gene_symbol, "PRO");
        assert_eq!(session.store.rows().len(), 2);

        session.store.set_display_mode(DisplayMode::NegativeOnly);
        let visible = session.store.visible_rows();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].gene().hugo_gene_symbol, "ANTI");
        assert_eq!(session.store.highlighted().unwrap().gene().hugo_gene_symbol, "PRO");

        let plot = session.plot_for_highlighted(&reference, "brca_mrna");
        let data = plot.ready().unwrap();
        assert_eq!(data.len(), 6);
        assert_eq!(data[0].y_mutation_status, Some(MutationStatus::Mutated));
        assert_eq!(data[1].y_mutation_status, Some(MutationStatus::NotMutated));
        assert_eq!(data[0].x_mutation_status, Some(MutationStatus::NotMutated));

        subscription.dispose();
        assert_eq!(session.pipeline.cache().n_listeners(), 0);
    }
}
