//! P-value adjustment for multiple testing correction
//!
//! Implements Benjamini-Hochberg FDR correction over p-values that are
//! already sorted ascending. Two flavours:
//! - positional: each q-value is computed independently from its rank
//! - step-up: the positional values followed by a cumulative minimum from
//!   the largest rank down, which makes q non-decreasing
//!
//! Neither validates its input: p-values outside [0, 1] give undefined
//! (but non-panicking) output.

use serde::{Deserialize, Serialize};

/// Which Benjamini-Hochberg variant to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FdrMethod {
    /// q_i = min(1, p_i * n / i), no monotonicity pass
    #[default]
    Positional,
    /// Positional values plus the cumulative-minimum step-up pass
    StepUp,
}

impl FdrMethod {
    pub fn apply(&self, pvalues_ascending: &[f64]) -> Vec<f64> {
        match self {
            FdrMethod::Positional => benjamini_hochberg(pvalues_ascending),
            FdrMethod::StepUp => benjamini_hochberg_step_up(pvalues_ascending),
        }
    }
}

/// Apply Benjamini-Hochberg correction to p-values sorted ascending.
///
/// The i-th value (1-based) becomes `p_i * n / i`, capped at 1. Ranks are
/// positional, so tied p-values may receive different q-values. NaN
/// p-values (missing tests) stay NaN and are left out of `n` and the ranks.
pub fn benjamini_hochberg(pvalues_ascending: &[f64]) -> Vec<f64> {
    let n = pvalues_ascending.iter().filter(|p| !p.is_nan()).count() as f64;
    let mut rank = 0usize;
    pvalues_ascending
        .iter()
        .map(|&p| {
            if p.is_nan() {
                return f64::NAN;
            }
            rank += 1;
            (p * n / rank as f64).min(1.0)
        })
        .collect()
}

/// Benjamini-Hochberg with the step-up monotonicity pass.
/// Equivalent to R's p.adjust(method="BH") on sorted input.
pub fn benjamini_hochberg_step_up(pvalues_ascending: &[f64]) -> Vec<f64> {
    let mut qvalues = benjamini_hochberg(pvalues_ascending);
    let mut cummin = f64::INFINITY;
    for q in qvalues.iter_mut().rev() {
        if q.is_nan() {
            continue;
        }
        cummin = cummin.min(*q);
        *q = cummin;
    }
    qvalues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-12, "got {:?}, expected {:?}", actual, expected);
        }
    }

    #[test]
    fn test_bh_known_values() {
        let q = benjamini_hochberg(&[0.01, 0.02, 0.03, 0.50]);
        assert_close(&q, &[0.04, 0.04, 0.04, 0.50]);
    }

    #[test]
    fn test_bh_empty() {
        assert!(benjamini_hochberg(&[]).is_empty());
        assert!(benjamini_hochberg_step_up(&[]).is_empty());
    }

    #[test]
    fn test_bh_length_and_range() {
        let pvalues = vec![0.0, 0.001, 0.2, 0.2, 0.35, 0.6, 0.9, 1.0, 1.0];
        let q = benjamini_hochberg(&pvalues);
        assert_eq!(q.len(), pvalues.len());
        for (p, adj) in pvalues.iter().zip(q.iter()) {
            assert!((0.0..=1.0).contains(adj));
            assert!(*adj >= *p);
        }
    }

    #[test]
    fn test_bh_is_not_monotone() {
        // 0.04 * 3 / 2 = 0.06 > 0.045 * 3 / 3 = 0.045
        let q = benjamini_hochberg(&[0.001, 0.04, 0.045]);
        assert_close(&q, &[0.003, 0.06, 0.045]);
    }

    #[test]
    fn test_bh_ties_are_positional() {
        let q = benjamini_hochberg(&[0.02, 0.02]);
        assert_close(&q, &[0.04, 0.02]);
    }

    #[test]
    fn test_step_up_is_monotone() {
        let q = benjamini_hochberg_step_up(&[0.001, 0.04, 0.045]);
        assert_close(&q, &[0.003, 0.045, 0.045]);
        for i in 0..q.len() - 1 {
            assert!(q[i] <= q[i + 1]);
        }
    }

    #[test]
    fn test_nan_excluded_from_count() {
        let q = benjamini_hochberg(&[0.01, 0.02, f64::NAN]);
        assert_close(&q[..2], &[0.02, 0.02]);
        assert!(q[2].is_nan());

        let q = benjamini_hochberg_step_up(&[0.01, 0.04, f64::NAN]);
        assert_close(&q[..2], &[0.02, 0.04]);
        assert!(q[2].is_nan());
    }

    #[test]
    fn test_method_dispatch() {
        let p = [0.02, 0.02];
        assert_eq!(FdrMethod::default(), FdrMethod::Positional);
        assert_close(&FdrMethod::Positional.apply(&p), &benjamini_hochberg(&p));
        assert_close(&FdrMethod::StepUp.apply(&p), &[0.02, 0.02]);
    }
}
