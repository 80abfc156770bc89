//! Sample coverage: which profiles assayed which genes in which samples

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::molecular::SampleKey;
use super::rows::EntrezGeneId;

/// Profiles covering one sample
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleCoverage {
    /// Profiles that assayed every gene in this sample
    pub all_genes: HashSet<String>,
    /// Profiles that assayed only a gene panel, per gene
    pub by_gene: HashMap<EntrezGeneId, HashSet<String>>,
}

/// Coverage for every sample in the cohort, keyed by unique sample key.
///
/// A sample without an entry counts as not profiled by any profile.
#[derive(Debug, Clone, Default)]
pub struct CoverageInformation {
    samples: HashMap<SampleKey, SampleCoverage>,
}

impl CoverageInformation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a sample as whole-genome/exome profiled by a profile
    pub fn add_all_genes(&mut self, key: SampleKey, molecular_profile_id: &str) {
        self.samples
            .entry(key)
            .or_default()
            .all_genes
            .insert(molecular_profile_id.to_string());
    }

    /// Mark a single gene of a sample as profiled by a (panel) profile
    pub fn add_gene(&mut self, key: SampleKey, entrez_gene_id: EntrezGeneId, molecular_profile_id: &str) {
        self.samples
            .entry(key)
            .or_default()
            .by_gene
            .entry(entrez_gene_id)
            .or_default()
            .insert(molecular_profile_id.to_string());
    }

    pub fn sample(&self, key: &SampleKey) -> Option<&SampleCoverage> {
        self.samples.get(key)
    }

    /// Whether `gene` was assayed by `molecular_profile_id` in the sample
    pub fn is_profiled(&self, key: &SampleKey, molecular_profile_id: &str, entrez_gene_id: EntrezGeneId) -> bool {
        let Some(coverage) = self.samples.get(key) else {
            return false;
        };
        coverage.all_genes.contains(molecular_profile_id)
            || coverage
                .by_gene
                .get(&entrez_gene_id)
                .map_or(false, |profiles| profiles.contains(molecular_profile_id))
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }
}

/// Study id to the mutation profile applicable for that study
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyMutationProfiles {
    profiles: HashMap<String, String>,
}

impl StudyMutationProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, study_id: &str, molecular_profile_id: &str) {
        self.profiles
            .insert(study_id.to_string(), molecular_profile_id.to_string());
    }

    pub fn profile_for_study(&self, study_id: &str) -> Option<&str> {
        self.profiles.get(study_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_coverage_is_per_gene() {
        let mut coverage = CoverageInformation::new();
        let wes = SampleKey::new("brca", "s1");
        let panel = SampleKey::new("brca", "s2");
        coverage.add_all_genes(wes.clone(), "brca_mutations");
        coverage.add_gene(panel.clone(), 7157, "brca_mutations");

        assert!(coverage.is_profiled(&wes, "brca_mutations", 672));
        assert!(coverage.is_profiled(&panel, "brca_mutations", 7157));
        assert!(!coverage.is_profiled(&panel, "brca_mutations", 672));
        assert!(!coverage.is_profiled(&SampleKey::new("brca", "s3"), "brca_mutations", 7157));
        assert!(!coverage.is_profiled(&wes, "other_mutations", 7157));
    }
}
