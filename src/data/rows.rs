//! Co-expression rows and the query keys they are fetched under

use serde::{Deserialize, Serialize};

/// Entrez gene identifier
pub type EntrezGeneId = i64;

/// Gene annotation carried by every row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub entrez_gene_id: EntrezGeneId,
    pub hugo_gene_symbol: String,
    #[serde(default)]
    pub cytoband: Option<String>,
}

impl Gene {
    pub fn new(entrez_gene_id: EntrezGeneId, hugo_gene_symbol: &str) -> Self {
        Self {
            entrez_gene_id,
            hugo_gene_symbol: hugo_gene_symbol.to_string(),
            cytoband: None,
        }
    }
}

/// Correlation statistic between the reference gene and one comparison gene.
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoExpressionRow {
    pub comparison_gene: Gene,
    pub spearman_correlation: f64,
    pub p_value: f64,
}

impl CoExpressionRow {
    pub fn new(comparison_gene: Gene, spearman_correlation: f64, p_value: f64) -> Self {
        Self {
            comparison_gene,
            spearman_correlation,
            p_value,
        }
    }

    pub fn entrez_gene_id(&self) -> EntrezGeneId {
        self.comparison_gene.entrez_gene_id
    }
}

/// A co-expression row with its Benjamini-Hochberg q-value attached.
///
/// The q-value reflects the row's position in the stable p-value-ascending
/// order of the full row set it was ranked with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub row: CoExpressionRow,
    pub q_value: f64,
}

impl RankedRow {
    pub fn entrez_gene_id(&self) -> EntrezGeneId {
        self.row.comparison_gene.entrez_gene_id
    }

    pub fn gene(&self) -> &Gene {
        &self.row.comparison_gene
    }

    pub fn spearman_correlation(&self) -> f64 {
        self.row.spearman_correlation
    }

    pub fn p_value(&self) -> f64 {
        self.row.p_value
    }

    /// Same comparison gene, regardless of statistics
    pub fn same_gene(&self, other: &RankedRow) -> bool {
        self.entrez_gene_id() == other.entrez_gene_id()
    }
}

/// Which comparison genes a co-expression fetch covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneScope {
    /// Only genes passing the source's correlation threshold
    Restricted,
    /// Every gene with data in the profile
    All,
}

impl GeneScope {
    /// Map the "show all data" toggle onto a scope
    pub fn from_all_data(all_data: bool) -> Self {
        if all_data {
            GeneScope::All
        } else {
            GeneScope::Restricted
        }
    }
}

/// Key of one co-expression fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoExpressionQuery {
    pub reference_gene: EntrezGeneId,
    pub molecular_profile_id: String,
    pub scope: GeneScope,
}

impl CoExpressionQuery {
    pub fn new(reference_gene: EntrezGeneId, molecular_profile_id: &str, scope: GeneScope) -> Self {
        Self {
            reference_gene,
            molecular_profile_id: molecular_profile_id.to_string(),
            scope,
        }
    }
}
