//! Window planning and the cross-window stability predicate.

use crate::{PolarityError, Result};

/// Smallest derived window size.
pub const MIN_WINDOW_SIZE: u64 = 10;
/// Default lower bound every per-window PI must reach to count as stable.
pub const DEFAULT_MIN_PI: f64 = 0.2;
/// Default ceiling on std(PI) / |mean(PI)|.
pub const DEFAULT_MAX_REL_VAR: f64 = 0.2;

/// Split `[start, end]` into contiguous inclusive windows.
///
/// The size defaults to max(10, len / windows). The loop emits at most
/// `windows` windows, clamping each to `end` and stopping early once the
/// range is exhausted; when len is not a multiple of the size, the tail
/// after the last window is left out.
pub fn split_windows(
    start: u64,
    end: u64,
    windows: usize,
    window_size: Option<u64>,
) -> Result<Vec<(u64, u64)>> {
    if end < start {
        return Err(PolarityError::InvalidRange { start, end });
    }
    if windows == 0 {
        return Err(PolarityError::InvalidWindowCount);
    }

    let total = end - start + 1;
    let size = window_size
        .unwrap_or_else(|| MIN_WINDOW_SIZE.max(total / windows as u64))
        .max(1);

    let mut ranges = Vec::with_capacity(windows);
    let mut s = start;
    for _ in 0..windows {
        let e = end.min(s.saturating_add(size - 1));
        ranges.push((s, e));
        if e == end {
            break;
        }
        s = e + 1;
    }

    Ok(ranges)
}

/// Mean of a slice; 0 for an empty one.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Every PI at least `min_pi`, a non-zero mean, and a relative spread
/// std / |mean| of at most `max_rel_var`.
pub fn stability(pis: &[f64], min_pi: f64, max_rel_var: f64) -> bool {
    if pis.iter().any(|&pi| pi < min_pi) {
        return false;
    }
    let m = mean(pis);
    if m == 0.0 {
        return false;
    }
    population_std(pis) / m.abs() <= max_rel_var
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_windows_drops_uneven_tail() {
        // size = max(10, 100 / 3) = 33; three iterations end at 198
        let w = split_windows(100, 199, 3, None).unwrap();
        assert_eq!(w, vec![(100, 132), (133, 165), (166, 198)]);
    }

    #[test]
    fn test_split_windows_even() {
        let w = split_windows(0, 99, 4, None).unwrap();
        assert_eq!(w, vec![(0, 24), (25, 49), (50, 74), (75, 99)]);
    }

    #[test]
    fn test_split_windows_minimum_size_stops_early() {
        // 25 integers, 5 windows → size max(10, 5) = 10 → three windows
        let w = split_windows(1, 25, 5, None).unwrap();
        assert_eq!(w, vec![(1, 10), (11, 20), (21, 25)]);
    }

    #[test]
    fn test_split_windows_explicit_size() {
        let w = split_windows(1000, 1049, 10, Some(20)).unwrap();
        assert_eq!(w, vec![(1000, 1019), (1020, 1039), (1040, 1049)]);
        let w = split_windows(1000, 1049, 2, Some(20)).unwrap();
        assert_eq!(w, vec![(1000, 1019), (1020, 1039)]);
    }

    #[test]
    fn test_split_windows_single_point() {
        assert_eq!(split_windows(7, 7, 3, None).unwrap(), vec![(7, 7)]);
    }

    #[test]
    fn test_split_windows_errors() {
        assert_eq!(
            split_windows(10, 5, 3, None),
            Err(PolarityError::InvalidRange { start: 10, end: 5 })
        );
        assert_eq!(split_windows(0, 10, 0, None), Err(PolarityError::InvalidWindowCount));
    }

    #[test]
    fn test_stability_consistent_pis() {
        assert!(stability(&[0.3, 0.32, 0.29], DEFAULT_MIN_PI, DEFAULT_MAX_REL_VAR));
    }

    #[test]
    fn test_stability_rejects_low_pi() {
        assert!(!stability(&[0.1, 0.3, 0.3], DEFAULT_MIN_PI, DEFAULT_MAX_REL_VAR));
    }

    #[test]
    fn test_stability_rejects_spread() {
        // mean 0.6, population std ≈ 0.337 → relative ≈ 0.56
        assert!(!stability(&[0.25, 0.5, 1.05], DEFAULT_MIN_PI, DEFAULT_MAX_REL_VAR));
    }

    #[test]
    fn test_stability_zero_mean() {
        assert!(!stability(&[0.0, 0.0], -1.0, 1.0));
    }

    #[test]
    fn test_population_std() {
        assert!((population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
        assert_eq!(population_std(&[]), 0.0);
    }
}
