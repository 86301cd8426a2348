//! Polynomial least-squares fitting
//!
//! ## Overview
//!
//! Small-degree polynomial regression used by the forecaster. The training
//! sets here are tiny (two or three points), so the normal-equation system
//! is at most 3×3 and is solved directly by Gaussian elimination with
//! partial pivoting: no heap, no external linear-algebra crate.
//!
//! ## Numerical Conditioning
//!
//! Raw inputs are epoch seconds (~1e9) against glucose values (~1e2);
//! powers of epoch seconds would overwhelm f64 precision long before
//! degree 2. Both axes are therefore z-score normalized (zero mean, unit
//! variance) before fitting, and predictions are inverse-transformed on
//! the way out. A zero-variance axis falls back to unit scale.
//!
//! ## Model Selection
//!
//! Candidate degrees 1 and 2 (capped by sample count) are fitted
//! independently and the lowest residual sum of squares wins; near-ties go
//! to the lower degree, so collinear points come out as a line rather than
//! a degenerate parabola.

use libm::sqrt;

/// Highest candidate polynomial degree
const MAX_DEGREE: usize = 2;

const MAX_COEFFS: usize = MAX_DEGREE + 1;

/// Pivots smaller than this mean the normal equations are singular
const SINGULAR_PIVOT: f64 = 1e-12;

/// Residual margin below which two fits count as a tie
const RSS_TIE_MARGIN: f64 = 1e-9;

/// A fitted polynomial over normalized axes
#[derive(Debug, Clone)]
pub(crate) struct PolyFit {
    /// Coefficients in ascending power order, valid up to `degree`
    coeffs: [f64; MAX_COEFFS],
    degree: usize,
    t_mean: f64,
    t_scale: f64,
    v_mean: f64,
    v_scale: f64,
}

impl PolyFit {
    /// Fit the best-degree polynomial to `(t, value)` samples
    ///
    /// Returns `None` for fewer than two samples or when every candidate
    /// system is singular (coincident timestamps).
    pub fn fit(samples: &[(f64, f64)]) -> Option<Self> {
        let n = samples.len();
        if n < 2 {
            return None;
        }

        let (t_mean, t_scale) = axis_stats(samples.iter().map(|s| s.0));
        let (v_mean, v_scale) = axis_stats(samples.iter().map(|s| s.1));

        let mut normalized = [(0.0f64, 0.0f64); 8];
        let normalized = &mut normalized[..n.min(8)];
        for (slot, sample) in normalized.iter_mut().zip(samples) {
            *slot = (
                (sample.0 - t_mean) / t_scale,
                (sample.1 - v_mean) / v_scale,
            );
        }

        let mut best: Option<([f64; MAX_COEFFS], usize, f64)> = None;
        let top_degree = MAX_DEGREE.min(n - 1);

        for degree in 1..=top_degree {
            let coeffs = match solve_normal_equations(normalized, degree) {
                Some(coeffs) => coeffs,
                None => continue,
            };
            let rss = residual_sum(normalized, &coeffs, degree);

            let better = match &best {
                Some((_, _, best_rss)) => rss + RSS_TIE_MARGIN < *best_rss,
                None => true,
            };
            if better {
                best = Some((coeffs, degree, rss));
            }
        }

        best.map(|(coeffs, degree, _)| Self {
            coeffs,
            degree,
            t_mean,
            t_scale,
            v_mean,
            v_scale,
        })
    }

    /// Evaluate the fitted curve at time `t` (same axis as the samples)
    pub fn predict(&self, t: f64) -> f64 {
        let tn = (t - self.t_mean) / self.t_scale;

        // Horner evaluation over the active coefficients
        let mut vn = 0.0;
        for &c in self.coeffs[..=self.degree].iter().rev() {
            vn = vn * tn + c;
        }

        vn * self.v_scale + self.v_mean
    }

    /// Degree the model selection settled on
    #[cfg(test)]
    pub fn degree(&self) -> usize {
        self.degree
    }
}

/// Mean and scale (population standard deviation, floored to 1) of an axis
fn axis_stats(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std = sqrt(variance);

    (mean, if std > SINGULAR_PIVOT { std } else { 1.0 })
}

/// Solve the least-squares normal equations for the given degree
///
/// Builds the (degree+1)-square Gram matrix of power sums and eliminates
/// with partial pivoting. `None` when the system is singular.
fn solve_normal_equations(samples: &[(f64, f64)], degree: usize) -> Option<[f64; MAX_COEFFS]> {
    let m = degree + 1;

    // Power sums S_k = Σ t^k for k = 0..2*degree, and moment sums Σ t^j * v
    let mut power_sums = [0.0f64; 2 * MAX_DEGREE + 1];
    let mut moments = [0.0f64; MAX_COEFFS];
    for &(t, v) in samples {
        let mut tp = 1.0;
        for k in 0..=2 * degree {
            power_sums[k] += tp;
            if k < m {
                moments[k] += tp * v;
            }
            tp *= t;
        }
    }

    // Augmented system [A^T A | A^T y]
    let mut aug = [[0.0f64; MAX_COEFFS + 1]; MAX_COEFFS];
    for row in 0..m {
        for col in 0..m {
            aug[row][col] = power_sums[row + col];
        }
        aug[row][m] = moments[row];
    }

    // Gaussian elimination with partial pivoting
    for col in 0..m {
        let pivot_row = (col..m)
            .max_by(|&a, &b| {
                aug[a][col]
                    .abs()
                    .partial_cmp(&aug[b][col].abs())
                    .unwrap_or(core::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if aug[pivot_row][col].abs() < SINGULAR_PIVOT {
            return None;
        }
        aug.swap(col, pivot_row);

        for row in (col + 1)..m {
            let factor = aug[row][col] / aug[col][col];
            for k in col..=m {
                aug[row][k] -= factor * aug[col][k];
            }
        }
    }

    // Back substitution
    let mut coeffs = [0.0f64; MAX_COEFFS];
    for row in (0..m).rev() {
        let mut acc = aug[row][m];
        for col in (row + 1)..m {
            acc -= aug[row][col] * coeffs[col];
        }
        coeffs[row] = acc / aug[row][row];
    }

    Some(coeffs)
}

fn residual_sum(samples: &[(f64, f64)], coeffs: &[f64; MAX_COEFFS], degree: usize) -> f64 {
    samples
        .iter()
        .map(|&(t, v)| {
            let mut fitted = 0.0;
            for &c in coeffs[..=degree].iter().rev() {
                fitted = fitted * t + c;
            }
            let r = fitted - v;
            r * r
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_a_line_exactly() {
        // value = 2t + 1 over realistic epoch-second timestamps
        let t0 = 1_700_000_000.0;
        let samples = [
            (t0, 2.0 * t0 + 1.0),
            (t0 + 300.0, 2.0 * (t0 + 300.0) + 1.0),
            (t0 + 600.0, 2.0 * (t0 + 600.0) + 1.0),
        ];
        let fit = PolyFit::fit(&samples).unwrap();

        let t = t0 + 900.0;
        let expected = 2.0 * t + 1.0;
        assert!((fit.predict(t) - expected).abs() < 1e-3);
    }

    #[test]
    fn collinear_points_select_the_line() {
        let samples = [(0.0, 100.0), (300.0, 110.0), (600.0, 120.0)];
        let fit = PolyFit::fit(&samples).unwrap();
        assert_eq!(fit.degree(), 1);
    }

    #[test]
    fn curved_points_select_the_parabola() {
        // value = t^2 on a small axis: a line cannot fit this
        let samples = [(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)];
        let fit = PolyFit::fit(&samples).unwrap();
        assert_eq!(fit.degree(), 2);
        assert!((fit.predict(3.0) - 9.0).abs() < 1e-6);
    }

    #[test]
    fn interpolates_training_points() {
        let samples = [(0.0, 140.0), (300.0, 120.0), (600.0, 90.0)];
        let fit = PolyFit::fit(&samples).unwrap();
        for &(t, v) in &samples {
            assert!((fit.predict(t) - v).abs() < 1e-6);
        }
    }

    #[test]
    fn refuses_degenerate_input() {
        assert!(PolyFit::fit(&[]).is_none());
        assert!(PolyFit::fit(&[(0.0, 100.0)]).is_none());
        // Coincident timestamps make every system singular
        assert!(PolyFit::fit(&[(0.0, 100.0), (0.0, 120.0)]).is_none());
    }

    #[test]
    fn flat_values_stay_flat() {
        let samples = [(0.0, 100.0), (300.0, 100.0), (600.0, 100.0)];
        let fit = PolyFit::fit(&samples).unwrap();
        assert!((fit.predict(1200.0) - 100.0).abs() < 1e-6);
    }
}
