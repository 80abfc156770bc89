//! Delimited-table readers for co-expression inputs
//!
//! Every reader auto-detects tab vs comma from the header line and trims
//! fields. Missing numeric values ("NA", "NaN", empty) become NaN.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::data::{
    CoExpressionRow, CoverageInformation, EntrezGeneId, ExpressionTable, Gene, MutationRecord, NumericMolecularDatum,
    SampleKey, StudyMutationProfiles,
};
use crate::error::{CoexprError, Result};

fn parse_value(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Deserialize every record of a delimited file
fn read_records<T, P>(path: P) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let content = fs::read_to_string(path.as_ref())?;
    let header_line = content.lines().next().ok_or_else(|| CoexprError::EmptyData {
        reason: format!("Empty file: {}", path.as_ref().display()),
    })?;

    // Detect delimiter
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for record in reader.deserialize::<T>() {
        records.push(record?);
    }
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct CoExpressionRecord {
    entrez_gene_id: EntrezGeneId,
    hugo_gene_symbol: String,
    #[serde(default)]
    cytoband: Option<String>,
    spearman_correlation: String,
    p_value: String,
}

/// Read co-expression rows.
/// Columns: entrez_gene_id, hugo_gene_symbol, [cytoband], spearman_correlation, p_value
pub fn read_coexpression_rows<P: AsRef<Path>>(path: P) -> Result<Vec<CoExpressionRow>> {
    let records: Vec<CoExpressionRecord> = read_records(path)?;
    if records.is_empty() {
        return Err(CoexprError::EmptyData {
            reason: "No co-expression rows found".to_string(),
        });
    }

    Ok(records
        .into_iter()
        .map(|r| {
            CoExpressionRow::new(
                Gene {
                    entrez_gene_id: r.entrez_gene_id,
                    hugo_gene_symbol: r.hugo_gene_symbol,
                    cytoband: r.cytoband.filter(|c| !c.is_empty()),
                },
                parse_value(&r.spearman_correlation),
                parse_value(&r.p_value),
            )
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ExpressionRecord {
    study_id: String,
    sample_id: String,
    #[serde(default)]
    patient_id: String,
    molecular_profile_id: String,
    entrez_gene_id: EntrezGeneId,
    #[serde(default)]
    hugo_gene_symbol: String,
    value: String,
}

/// Read a long-format expression table.
/// Columns: study_id, sample_id, [patient_id], molecular_profile_id,
/// entrez_gene_id, [hugo_gene_symbol], value
pub fn read_expression_table<P: AsRef<Path>>(path: P) -> Result<ExpressionTable> {
    let records: Vec<ExpressionRecord> = read_records(path)?;
    if records.is_empty() {
        return Err(CoexprError::EmptyData {
            reason: "No expression values found".to_string(),
        });
    }

    let mut genes: HashMap<EntrezGeneId, Gene> = HashMap::new();
    let mut data = Vec::with_capacity(records.len());
    for r in records {
        if !r.hugo_gene_symbol.is_empty() {
            genes
                .entry(r.entrez_gene_id)
                .or_insert_with(|| Gene::new(r.entrez_gene_id, &r.hugo_gene_symbol));
        }
        let patient_id = if r.patient_id.is_empty() {
            r.sample_id.clone()
        } else {
            r.patient_id
        };
        data.push(NumericMolecularDatum {
            study_id: r.study_id,
            sample_id: r.sample_id,
            patient_id,
            molecular_profile_id: r.molecular_profile_id,
            entrez_gene_id: r.entrez_gene_id,
            value: parse_value(&r.value),
        });
    }

    Ok(ExpressionTable::from_records(data, genes.into_values().collect()))
}

/// Read mutation calls grouped by gene.
/// Columns: study_id, sample_id, patient_id, molecular_profile_id,
/// entrez_gene_id, protein_change, [mutation_type]
pub fn read_mutations<P: AsRef<Path>>(path: P) -> Result<HashMap<EntrezGeneId, Vec<MutationRecord>>> {
    let records: Vec<MutationRecord> = read_records(path)?;
    let mut by_gene: HashMap<EntrezGeneId, Vec<MutationRecord>> = HashMap::new();
    for record in records {
        by_gene.entry(record.entrez_gene_id).or_default().push(record);
    }
    Ok(by_gene)
}

#[derive(Debug, Deserialize)]
struct CoverageRecord {
    study_id: String,
    sample_id: String,
    molecular_profile_id: String,
    #[serde(default)]
    entrez_gene_id: Option<EntrezGeneId>,
}

/// Read sample coverage.
/// Columns: study_id, sample_id, molecular_profile_id, [entrez_gene_id];
/// an empty gene means the profile covered all genes of the sample
pub fn read_coverage<P: AsRef<Path>>(path: P) -> Result<CoverageInformation> {
    let records: Vec<CoverageRecord> = read_records(path)?;
    let mut coverage = CoverageInformation::new();
    for r in records {
        let key = SampleKey::new(&r.study_id, &r.sample_id);
        match r.entrez_gene_id {
            Some(gene) => coverage.add_gene(key, gene, &r.molecular_profile_id),
            None => coverage.add_all_genes(key, &r.molecular_profile_id),
        }
    }
    Ok(coverage)
}

#[derive(Debug, Deserialize)]
struct StudyProfileRecord {
    study_id: String,
    molecular_profile_id: String,
}

/// Read the study to mutation profile map.
/// Columns: study_id, molecular_profile_id
pub fn read_study_profiles<P: AsRef<Path>>(path: P) -> Result<StudyMutationProfiles> {
    let records: Vec<StudyProfileRecord> = read_records(path)?;
    let mut profiles = StudyMutationProfiles::new();
    for r in records {
        profiles.insert(&r.study_id, &r.molecular_profile_id);
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NumericDataQuery;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_coexpression_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "entrez_gene_id\thugo_gene_symbol\tcytoband\tspearman_correlation\tp_value").unwrap();
        writeln!(file, "7157\tTP53\t17p13.1\t0.42\t1e-5").unwrap();
        writeln!(file, "672\tBRCA1\t\t-0.1\tNA").unwrap();

        let rows = read_coexpression_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].comparison_gene.cytoband.as_deref(), Some("17p13.1"));
        assert!(rows[1].comparison_gene.cytoband.is_none());
        assert!(rows[1].p_value.is_nan());
    }

    #[test]
    fn test_read_expression_table_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "study_id,sample_id,patient_id,molecular_profile_id,entrez_gene_id,hugo_gene_symbol,value").unwrap();
        writeln!(file, "brca,s1,p1,brca_mrna,7157,TP53,1.5").unwrap();
        writeln!(file, "brca,s2,,brca_mrna,7157,TP53,NA").unwrap();

        let table = read_expression_table(file.path()).unwrap();
        let data = table.get(&NumericDataQuery::new(7157, "brca_mrna")).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].patient_id, "s2");
        assert!(data[1].value.is_nan());
        assert_eq!(table.resolve_gene("TP53").unwrap().entrez_gene_id, 7157);
    }

    #[test]
    fn test_read_coverage_and_profiles() {
        let mut coverage_file = NamedTempFile::new().unwrap();
        writeln!(coverage_file, "study_id\tsample_id\tmolecular_profile_id\tentrez_gene_id").unwrap();
        writeln!(coverage_file, "brca\ts1\tbrca_mutations\t").unwrap();
        writeln!(coverage_file, "brca\ts2\tbrca_mutations\t7157").unwrap();

        let coverage = read_coverage(coverage_file.path()).unwrap();
        assert!(coverage.is_profiled(&SampleKey::new("brca", "s1"), "brca_mutations", 672));
        assert!(!coverage.is_profiled(&SampleKey::new("brca", "s2"), "brca_mutations", 672));

        let mut profile_file = NamedTempFile::new().unwrap();
        writeln!(profile_file, "study_id,molecular_profile_id").unwrap();
        writeln!(profile_file, "brca,brca_mutations").unwrap();
        let profiles = read_study_profiles(profile_file.path()).unwrap();
        assert_eq!(profiles.profile_for_study("brca"), Some("brca_mutations"));
    }

    #[test]
    fn test_empty_file_is_error() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            read_coexpression_rows(file.path()),
            Err(CoexprError::EmptyData { .. })
        ));
    }
}
