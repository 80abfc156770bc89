//! Spearman rank correlation between gene expression profiles

use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::HashMap;

use crate::data::{CoExpressionRow, EntrezGeneId, Gene, NumericMolecularDatum, SampleKey};

/// Parameters for computing co-expression rows
#[derive(Debug, Clone)]
pub struct CorrelationParams {
    /// Genes with fewer paired samples are skipped
    pub min_samples: usize,
    /// Minimum |rho| for a gene to be reported in the restricted scope
    pub threshold: f64,
}

impl Default for CorrelationParams {
    fn default() -> Self {
        Self {
            min_samples: 3,
            threshold: 0.3,
        }
    }
}

/// Ranks with ties replaced by their average (1-based)
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j share the average of ranks i+1..=j+1
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Spearman correlation: Pearson correlation of average ranks.
/// NaN for fewer than two points or a constant profile.
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Two-sided p-value for a correlation over `n` samples, from Student's t
/// with n - 2 degrees of freedom
pub fn correlation_pvalue(rho: f64, n: usize) -> f64 {
    if !rho.is_finite() || n < 3 {
        return f64::NAN;
    }
    if rho.abs() >= 1.0 {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t = rho * (df / (1.0 - rho * rho)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.cdf(-t.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}

/// Finite values paired on unique sample key, in `x` order
fn paired_values(
    x: &[NumericMolecularDatum],
    y_by_sample: &HashMap<SampleKey, f64>,
) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .filter(|d| d.value.is_finite())
        .filter_map(|d| {
            y_by_sample
                .get(&d.sample_key())
                .filter(|v| v.is_finite())
                .map(|&v| (d.value, v))
        })
        .unzip()
}

/// Correlate the reference profile against every candidate gene.
///
/// The reference gene itself is excluded; genes with fewer than
/// `params.min_samples` paired samples, an undefined correlation, or
/// `|rho| < params.threshold` are skipped. Output follows candidate order.
pub fn compute_coexpression(
    reference_gene: EntrezGeneId,
    reference: &[NumericMolecularDatum],
    candidates: &[(Gene, &[NumericMolecularDatum])],
    params: &CorrelationParams,
) -> Vec<CoExpressionRow> {
    let rows: Vec<CoExpressionRow> = candidates
        .par_iter()
        .filter(|(gene, _)| gene.entrez_gene_id != reference_gene)
        .filter_map(|(gene, data)| {
            let by_sample: HashMap<SampleKey, f64> =
                data.iter().map(|d| (d.sample_key(), d.value)).collect();
            let (x, y) = paired_values(reference, &by_sample);
            if x.len() < params.min_samples {
                return None;
            }

            let rho = spearman_correlation(&x, &y);
            if !rho.is_finite() || rho.abs() < params.threshold {
                return None;
            }
            let p_value = correlation_pvalue(rho, x.len());
            Some(CoExpressionRow::new(gene.clone(), rho, p_value))
        })
        .collect();

    log::debug!(
        "Correlated gene {} against {} candidates, {} rows kept",
        reference_gene,
        candidates.len(),
        rows.len()
    );
    rows
}
