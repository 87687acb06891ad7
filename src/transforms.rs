//! Feature transforms over a generator sequence.
//!
//! Every transform maps a sequence whose position i stands for the integer
//! n0 + i to a sequence of the same length and alignment. None of them keep
//! state between calls.

use crate::characters::RealCharacter;
use crate::sieve::{mobius_values, ArithmeticTables};
use crate::{PolarityError, Result};

/// Elementwise min(frac(x), 1 − frac(x)), always in [0, 0.5].
pub fn fold_min(x: &[f64]) -> Vec<f64> {
    x.iter()
        .map(|&v| {
            let frac = v - v.floor();
            frac.min(1.0 - frac)
        })
        .collect()
}

/// Forward differences x[i+1] − x[i], with the last entry repeating the one
/// before it (0 for a single element).
pub fn forward_diff(x: &[f64]) -> Result<Vec<f64>> {
    if x.is_empty() {
        return Err(PolarityError::EmptySequence {
            transform: "forward_diff",
        });
    }

    let mut d: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let last = d.last().copied().unwrap_or(0.0);
    d.push(last);
    Ok(d)
}

/// Discrete log-derivative n · (x[i+1] − x[i]) with n = n0 + i.
pub fn log_mellin_slope(x: &[f64], n0: u64) -> Result<Vec<f64>> {
    if x.is_empty() {
        return Err(PolarityError::EmptySequence {
            transform: "log_mellin_slope",
        });
    }
    let d = forward_diff(x)?;
    Ok(d.iter()
        .enumerate()
        .map(|(i, &di)| (n0 + i as u64) as f64 * di)
        .collect())
}

/// M[G](n) = Σ_{d | n, μ(d) ≠ 0} μ(d) · G(n/d), over n in the window.
///
/// Terms whose quotient n/d falls before n0 are dropped rather than padded,
/// so values near the start of the window only see part of the divisor sum.
pub fn mobius_twist(g: &[f64], n0: u64) -> Vec<f64> {
    if g.is_empty() {
        return Vec::new();
    }
    let max_n = n0 as usize + g.len() - 1;
    let tables = ArithmeticTables::new(max_n);
    mobius_twist_with(g, n0, &tables)
}

/// [`mobius_twist`] with caller-supplied tables, which must reach n0 + len − 1.
pub fn mobius_twist_with(g: &[f64], n0: u64, tables: &ArithmeticTables) -> Vec<f64> {
    let n0 = n0 as usize;
    let len = g.len();
    debug_assert!(len == 0 || tables.covers(n0 + len - 1));

    (0..len)
        .map(|idx| {
            let n = n0 + idx;
            tables.divisors[n]
                .iter()
                .filter(|&&d| tables.mobius[d] != 0)
                .filter_map(|&d| {
                    let q = n / d;
                    (q >= n0 && q - n0 < len).then(|| f64::from(tables.mobius[d]) * g[q - n0])
                })
                .sum()
        })
        .collect()
}

/// Same values as [`mobius_twist`], accumulated by walking the multiples of
/// each squarefree d instead of materialising divisor lists.
pub fn mobius_twist_fast(g: &[f64], n0: u64) -> Vec<f64> {
    let len = g.len();
    if len == 0 {
        return Vec::new();
    }
    let n0 = n0 as usize;
    let max_n = n0 + len - 1;
    let mu = mobius_values(max_n);
    let mut out = vec![0.0; len];

    for d in 1..=max_n {
        if mu[d] == 0 {
            continue;
        }
        let mu_d = f64::from(mu[d]);
        // first positive multiple of d at or after n0; 0 has no divisors
        let mut n = n0.max(1).div_ceil(d) * d;
        while n <= max_n {
            let q = n / d;
            if q >= n0 {
                out[n - n0] += mu_d * g[q - n0];
            }
            n += d;
        }
    }

    out
}

/// G(n) · χ(n) for the given real character.
pub fn dirichlet_projection(g: &[f64], n0: u64, chi: RealCharacter) -> Vec<f64> {
    g.iter()
        .enumerate()
        .map(|(i, &v)| f64::from(chi.eval(n0 + i as u64)) * v)
        .collect()
}

/// [`dirichlet_projection`] for a raw modulus, rejecting anything outside
/// {4, 5, 8, 12}.
pub fn dirichlet_projection_mod(g: &[f64], n0: u64, modulus: u64) -> Result<Vec<f64>> {
    let chi = RealCharacter::try_from(modulus)?;
    Ok(dirichlet_projection(g, n0, chi))
}

/// Golden-ratio log bands: closeness of log_φ(n) mod 1 to {0, 1/3, 2/3}.
///
/// With t = frac(ln(max(n, 2)) / ln φ) and d the (wrapped) distance from t
/// to the nearest band, the score is clamp(1 − 3d, 0, 1). Depends only on
/// the index, not on the generator.
pub fn golden_log_bands(n0: u64, len: usize) -> Vec<f64> {
    const BANDS: [f64; 3] = [0.0, 1.0 / 3.0, 2.0 / 3.0];
    let ln_phi = ((1.0 + 5f64.sqrt()) / 2.0).ln();

    (0..len)
        .map(|i| {
            let n = ((n0 + i as u64) as f64).max(2.0);
            let t = (n.ln() / ln_phi).rem_euclid(1.0);
            let nearest = BANDS
                .iter()
                .map(|b| (t - b).abs())
                .fold(f64::INFINITY, f64::min);
            let wrapped = nearest.min(1.0 - nearest);
            (1.0 - 3.0 * wrapped).clamp(0.0, 1.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn test_fold_min_values() {
        let out = fold_min(&[2.25, 3.75, -0.25, 5.0, 0.5]);
        assert!(close(&out, &[0.25, 0.25, 0.25, 0.0, 0.5]), "{:?}", out);
    }

    #[test]
    fn test_forward_diff_edge_replication() {
        let d = forward_diff(&[1.0, 4.0, 9.0, 16.0]).unwrap();
        assert_eq!(d, vec![3.0, 5.0, 7.0, 7.0]);
        assert_eq!(forward_diff(&[2.5]).unwrap(), vec![0.0]);
        assert_eq!(forward_diff(&[1.0, 3.0]).unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_forward_diff_constant_is_zero() {
        let d = forward_diff(&[7.5; 10]).unwrap();
        assert!(d.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_forward_diff_rejects_empty() {
        assert_eq!(
            forward_diff(&[]),
            Err(PolarityError::EmptySequence {
                transform: "forward_diff"
            })
        );
        assert!(log_mellin_slope(&[], 3).is_err());
    }

    #[test]
    fn test_log_mellin_slope() {
        let s = log_mellin_slope(&[1.0, 4.0, 9.0], 10).unwrap();
        assert_eq!(s, vec![30.0, 55.0, 60.0]);
    }

    #[test]
    fn test_mobius_twist_of_ones_from_one() {
        // Σ_{d|n} μ(d) = [n = 1]
        let out = mobius_twist(&[1.0; 40], 1);
        assert_eq!(out[0], 1.0);
        assert!(out[1..].iter().all(|&v| v == 0.0), "{:?}", out);
    }

    #[test]
    fn test_mobius_twist_truncates_at_window_start() {
        // Window [10, 13]: for n = 12 only d ∈ {1} keeps n/d inside the window.
        let out = mobius_twist(&[1.0; 4], 10);
        // n = 10: d = 1 only (q = 10); n = 11: d = 1; n = 12: d = 1; n = 13: d = 1
        assert_eq!(out, vec![1.0, 1.0, 1.0, 1.0]);

        // Window [4, 12]: n = 8 sees d = 1 (q = 8) and d = 2 (q = 4)
        let out = mobius_twist(&[1.0; 9], 4);
        assert_eq!(out[4], 0.0);
        // n = 12: d ∈ {1, 2, 3} give q ∈ {12, 6, 4}, μ sum = 1 − 1 − 1 = −1
        assert_eq!(out[8], -1.0);
    }

    #[test]
    fn test_mobius_twist_inverts_summation() {
        // With G(n) = Σ_{d|n} f(d) and the window starting at 1, M[G] = f.
        let f: Vec<f64> = (1..=60).map(|n| (n as f64).sqrt()).collect();
        let g: Vec<f64> = (1..=60usize)
            .map(|n| (1..=n).filter(|d| n % d == 0).map(|d| f[d - 1]).sum())
            .collect();
        assert!(close(&mobius_twist(&g, 1), &f));
    }

    #[test]
    fn test_mobius_twist_fast_matches_divisor_version() {
        let g: Vec<f64> = (0..200).map(|i| ((i * 37 % 101) as f64).sin()).collect();
        for &n0 in &[1u64, 3, 50, 997] {
            assert!(close(&mobius_twist(&g, n0), &mobius_twist_fast(&g, n0)), "n0 = {}", n0);
        }
        assert!(mobius_twist(&[], 5).is_empty());
        assert!(mobius_twist_fast(&[], 5).is_empty());
    }

    #[test]
    fn test_dirichlet_projection() {
        let g = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = dirichlet_projection(&g, 3, RealCharacter::Mod4);
        // n = 3..7: χ₄ = −1, 0, 1, 0, −1
        assert_eq!(out, vec![-1.0, 0.0, 3.0, 0.0, -5.0]);
    }

    #[test]
    fn test_dirichlet_projection_rejects_modulus() {
        assert_eq!(
            dirichlet_projection_mod(&[1.0], 3, 7),
            Err(PolarityError::UnsupportedModulus(7))
        );
        assert!(dirichlet_projection_mod(&[1.0], 3, 12).is_ok());
    }

    #[test]
    fn test_golden_log_bands_range() {
        let bands = golden_log_bands(0, 500);
        assert_eq!(bands.len(), 500);
        assert!(bands.iter().all(|&v| (0.0..=1.0).contains(&v)));
        // n = 0, 1 are clamped to 2
        assert_eq!(bands[0], bands[2]);
        assert_eq!(bands[1], bands[2]);
    }

    #[test]
    fn test_golden_log_bands_peak_on_phi_powers() {
        // φ^k rounds to Lucas numbers; log_φ of L_10 = 123 is ≈ 10, t ≈ 0
        let bands = golden_log_bands(123, 1);
        assert!(bands[0] > 0.99, "score at 123 = {}", bands[0]);
    }
}
