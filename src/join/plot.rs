//! Sample-level join of two genes' expression with their mutation status

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::data::{
    CoverageInformation, EntrezGeneId, MutationRecord, NumericMolecularDatum, SampleKey, StudyMutationProfiles,
};

/// Mutation status of one gene in one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationStatus {
    Mutated,
    NotMutated,
    /// The sample's study has no mutation profile, or the gene was not assayed
    NotProfiled,
}

/// One point of the co-expression scatter plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDatum {
    pub study_id: String,
    pub sample_id: String,
    /// Reference gene value
    pub x_value: f64,
    /// Comparison gene value
    pub y_value: f64,
    /// `None` when the mutation overlay is disabled
    pub x_mutation_status: Option<MutationStatus>,
    pub y_mutation_status: Option<MutationStatus>,
    /// Protein changes of the reference gene in this sample
    pub x_mutations: Vec<String>,
    /// Protein changes of the comparison gene in this sample
    pub y_mutations: Vec<String>,
}

/// Mutation calls and coverage used to annotate joined samples
#[derive(Debug, Clone, Copy)]
pub struct MutationOverlay<'a> {
    pub x_gene: EntrezGeneId,
    pub y_gene: EntrezGeneId,
    pub x_mutations: &'a [MutationRecord],
    pub y_mutations: &'a [MutationRecord],
    pub coverage: &'a CoverageInformation,
    pub study_profiles: &'a StudyMutationProfiles,
}

fn index_mutations(records: &[MutationRecord], gene: EntrezGeneId) -> HashMap<SampleKey, Vec<String>> {
    let mut by_sample: HashMap<SampleKey, Vec<String>> = HashMap::new();
    for record in records.iter().filter(|r| r.entrez_gene_id == gene) {
        by_sample
            .entry(record.sample_key())
            .or_default()
            .push(record.protein_change.clone());
    }
    by_sample
}

/// Status of `gene` in `key`: mutated if a call exists, otherwise not
/// profiled unless the study's mutation profile covered the gene there
pub fn mutation_status(
    key: &SampleKey,
    gene: EntrezGeneId,
    mutated: bool,
    coverage: &CoverageInformation,
    study_profiles: &StudyMutationProfiles,
) -> MutationStatus {
    if mutated {
        return MutationStatus::Mutated;
    }
    match study_profiles.profile_for_study(&key.study_id) {
        Some(profile) if coverage.is_profiled(key, profile, gene) => MutationStatus::NotMutated,
        _ => MutationStatus::NotProfiled,
    }
}

/// Inner join of x and y on unique sample key, in x order.
///
/// Samples missing from either side are excluded, as are duplicate samples
/// after their first occurrence. With `drop_non_finite`, samples with a
/// NaN/infinite value on either side are excluded too.
pub fn join_plot_data(
    x: &[NumericMolecularDatum],
    y: &[NumericMolecularDatum],
    overlay: Option<MutationOverlay<'_>>,
    drop_non_finite: bool,
) -> Vec<PlotDatum> {
    let mut y_by_sample: HashMap<SampleKey, f64> = HashMap::with_capacity(y.len());
    for datum in y {
        y_by_sample.entry(datum.sample_key()).or_insert(datum.value);
    }

    let mutations = overlay.map(|o| {
        (
            index_mutations(o.x_mutations, o.x_gene),
            index_mutations(o.y_mutations, o.y_gene),
        )
    });

    let mut seen: HashSet<SampleKey> = HashSet::with_capacity(x.len());
    let mut data = Vec::new();
    for datum in x {
        let key = datum.sample_key();
        let Some(&y_value) = y_by_sample.get(&key) else {
            continue;
        };
        if drop_non_finite && !(datum.value.is_finite() && y_value.is_finite()) {
            continue;
        }
        if !seen.insert(key.clone()) {
            continue;
        }

        let mut point = PlotDatum {
            study_id: key.study_id.clone(),
            sample_id: key.sample_id.clone(),
            x_value: datum.value,
            y_value,
            x_mutation_status: None,
            y_mutation_status: None,
            x_mutations: Vec::new(),
            y_mutations: Vec::new(),
        };

        if let (Some(o), Some((x_muts, y_muts))) = (overlay.as_ref(), mutations.as_ref()) {
            point.x_mutations = x_muts.get(&key).cloned().unwrap_or_default();
            point.y_mutations = y_muts.get(&key).cloned().unwrap_or_default();
            point.x_mutation_status = Some(mutation_status(
                &key,
                o.x_gene,
                !point.x_mutations.is_empty(),
                o.coverage,
                o.study_profiles,
            ));
            point.y_mutation_status = Some(mutation_status(
                &key,
                o.y_gene,
                !point.y_mutations.is_empty(),
                o.coverage,
                o.study_profiles,
            ));
        }

        data.push(point);
    }
    data
}
