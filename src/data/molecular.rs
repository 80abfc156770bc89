//! Per-sample molecular records: numeric expression values and mutation calls

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::rows::{EntrezGeneId, Gene};

/// Unique sample key: sample identifiers are only unique within a study
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleKey {
    pub study_id: String,
    pub sample_id: String,
}

impl SampleKey {
    pub fn new(study_id: &str, sample_id: &str) -> Self {
        Self {
            study_id: study_id.to_string(),
            sample_id: sample_id.to_string(),
        }
    }
}

/// One numeric value (e.g. mRNA expression) for a gene in a sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericMolecularDatum {
    pub study_id: String,
    pub sample_id: String,
    pub patient_id: String,
    pub molecular_profile_id: String,
    pub entrez_gene_id: EntrezGeneId,
    pub value: f64,
}

impl NumericMolecularDatum {
    pub fn sample_key(&self) -> SampleKey {
        SampleKey::new(&self.study_id, &self.sample_id)
    }
}

/// One mutation call for a gene in a sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub study_id: String,
    pub sample_id: String,
    pub patient_id: String,
    pub molecular_profile_id: String,
    pub entrez_gene_id: EntrezGeneId,
    pub protein_change: String,
    #[serde(default)]
    pub mutation_type: String,
}

impl MutationRecord {
    pub fn sample_key(&self) -> SampleKey {
        SampleKey::new(&self.study_id, &self.sample_id)
    }
}

/// Key of one numeric data fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericDataQuery {
    pub entrez_gene_id: EntrezGeneId,
    pub molecular_profile_id: String,
}

impl NumericDataQuery {
    pub fn new(entrez_gene_id: EntrezGeneId, molecular_profile_id: &str) -> Self {
        Self {
            entrez_gene_id,
            molecular_profile_id: molecular_profile_id.to_string(),
        }
    }
}

/// In-memory expression table grouped by (gene, profile)
#[derive(Debug, Clone, Default)]
pub struct ExpressionTable {
    genes: HashMap<EntrezGeneId, Gene>,
    data: HashMap<NumericDataQuery, Vec<NumericMolecularDatum>>,
}

impl ExpressionTable {
    /// Group records by gene and profile, keeping record order within a group
    pub fn from_records(records: Vec<NumericMolecularDatum>, genes: Vec<Gene>) -> Self {
        let mut data: HashMap<NumericDataQuery, Vec<NumericMolecularDatum>> = HashMap::new();
        for record in records {
            data.entry(NumericDataQuery::new(
                record.entrez_gene_id,
                &record.molecular_profile_id,
            ))
            .or_default()
            .push(record);
        }

        let genes = genes.into_iter().map(|g| (g.entrez_gene_id, g)).collect();
        Self { genes, data }
    }

    pub fn get(&self, query: &NumericDataQuery) -> Option<&[NumericMolecularDatum]> {
        self.data.get(query).map(|v| v.as_slice())
    }

    /// Gene annotation, falling back to the numeric id as symbol
    pub fn gene(&self, entrez_gene_id: EntrezGeneId) -> Gene {
        self.genes
            .get(&entrez_gene_id)
            .cloned()
            .unwrap_or_else(|| Gene::new(entrez_gene_id, &entrez_gene_id.to_string()))
    }

    /// Look a gene up by Hugo symbol (case-insensitive) or Entrez id
    pub fn resolve_gene(&self, name: &str) -> Option<Gene> {
        if let Ok(id) = name.parse::<EntrezGeneId>() {
            if self.genes.contains_key(&id) || self.data.keys().any(|q| q.entrez_gene_id == id) {
                return Some(self.gene(id));
            }
        }
        self.genes
            .values()
            .find(|g| g.hugo_gene_symbol.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Genes with data in a profile, sorted by Entrez id
    pub fn genes_in_profile(&self, molecular_profile_id: &str) -> Vec<EntrezGeneId> {
        let mut ids: Vec<EntrezGeneId> = self
            .data
            .keys()
            .filter(|q| q.molecular_profile_id == molecular_profile_id)
            .map(|q| q.entrez_gene_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn n_records(&self) -> usize {
        self.data.values().map(|v| v.len()).sum()
    }
}
