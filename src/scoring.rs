//! Rank-based separation scores.
//!
//! AUC is the Mann–Whitney estimate
//!   AUC = (R₊ − n₊(n₊+1)/2) / (n₊ n₋),
//! where R₊ is the rank sum of the positively labelled scores. The polarity
//! index rescales it to PI = 2·AUC − 1.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{PolarityError, Result};

/// How ranks are assigned to tied scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AucMethod {
    /// Tied scores share the average rank of their block.
    #[default]
    TieAware,
    /// Ranks follow a stable ascending sort; ties keep input order.
    Ordinal,
}

/// AUC and its polarity index for one feature over one label set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePair {
    pub auc: f64,
    pub pi: f64,
}

impl ScorePair {
    pub fn from_auc(auc: f64) -> Self {
        Self {
            auc,
            pi: polarity_index(auc),
        }
    }
}

/// PI = 2·AUC − 1.
pub fn polarity_index(auc: f64) -> f64 {
    2.0 * auc - 1.0
}

/// Tie-aware AUC; exactly 0.5 when either class is empty.
pub fn auc(scores: &[f64], labels: &[bool]) -> Result<f64> {
    auc_with(scores, labels, AucMethod::TieAware)
}

/// AUC from plain ordinal ranks, without tie averaging.
pub fn auc_ordinal(scores: &[f64], labels: &[bool]) -> Result<f64> {
    auc_with(scores, labels, AucMethod::Ordinal)
}

pub fn auc_with(scores: &[f64], labels: &[bool], method: AucMethod) -> Result<f64> {
    if scores.len() != labels.len() {
        return Err(PolarityError::LengthMismatch {
            scores: scores.len(),
            labels: labels.len(),
        });
    }

    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Ok(0.5);
    }

    let ranks = match method {
        AucMethod::TieAware => average_ranks(scores),
        AucMethod::Ordinal => ordinal_ranks(scores),
    };

    let rank_sum_pos: f64 = ranks
        .iter()
        .zip(labels)
        .filter(|(_, &l)| l)
        .map(|(&r, _)| r)
        .sum();

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Stable ascending order of score indices.
fn ascending_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));
    order
}

/// 1-based ranks in sort order.
fn ordinal_ranks(scores: &[f64]) -> Vec<f64> {
    let mut ranks = vec![0.0; scores.len()];
    for (position, idx) in ascending_order(scores).into_iter().enumerate() {
        ranks[idx] = (position + 1) as f64;
    }
    ranks
}

/// 1-based ranks with each block of equal scores given its mean rank.
fn average_ranks(scores: &[f64]) -> Vec<f64> {
    let order = ascending_order(scores);
    let n = order.len();
    let mut ranks = vec![0.0; n];

    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[order[j]].partial_cmp(&scores[order[i]]) == Some(Ordering::Equal) {
            j += 1;
        }
        // positions i..j hold ranks i+1..=j
        let avg_rank = 0.5 * (i + 1 + j) as f64;
        for &idx in &order[i..j] {
            ranks[idx] = avg_rank;
        }
        i = j;
    }

    ranks
}

/// Score one feature sequence against labels with the given method.
pub fn score(scores: &[f64], labels: &[bool], method: AucMethod) -> Result<ScorePair> {
    auc_with(scores, labels, method).map(ScorePair::from_auc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation() {
        let labels = [false, false, true, true];
        let scores = [0.1, 0.2, 0.8, 0.9];
        let a = auc(&scores, &labels).unwrap();
        assert!((a - 1.0).abs() < 1e-9);
        assert!((polarity_index(a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_inversion() {
        let labels = [true, true, false, false];
        let pair = score(&[0.1, 0.2, 0.8, 0.9], &labels, AucMethod::TieAware).unwrap();
        assert_eq!(pair.auc, 0.0);
        assert_eq!(pair.pi, -1.0);
    }

    #[test]
    fn test_degenerate_labels() {
        assert_eq!(auc(&[0.3, 0.1, 0.2], &[true, true, true]).unwrap(), 0.5);
        assert_eq!(auc(&[0.3, 0.1, 0.2], &[false, false, false]).unwrap(), 0.5);
        assert_eq!(auc_ordinal(&[0.3], &[true]).unwrap(), 0.5);
        assert_eq!(auc(&[], &[]).unwrap(), 0.5);
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            auc(&[0.1, 0.2], &[true]),
            Err(PolarityError::LengthMismatch { scores: 2, labels: 1 })
        );
    }

    #[test]
    fn test_all_tied_scores_give_half() {
        let labels = [true, false, true, false, false];
        assert_eq!(auc(&[1.0; 5], &labels).unwrap(), 0.5);
    }

    #[test]
    fn test_ties_average_ranks() {
        // scores: neg 0.1, pos 0.5, neg 0.5, pos 0.9
        // ranks: 1, 2.5, 2.5, 4 → R₊ = 6.5, AUC = (6.5 − 3) / 4 = 0.875
        let a = auc(&[0.1, 0.5, 0.5, 0.9], &[false, true, false, true]).unwrap();
        assert!((a - 0.875).abs() < 1e-12, "auc = {}", a);
    }

    #[test]
    fn test_ordinal_ties_follow_input_order() {
        // ordinal ranks: 1, 2, 3, 4 → R₊ = 6, AUC = 0.75
        let a = auc_ordinal(&[0.1, 0.5, 0.5, 0.9], &[false, true, false, true]).unwrap();
        assert!((a - 0.75).abs() < 1e-12, "auc = {}", a);
    }

    #[test]
    fn test_methods_agree_without_ties() {
        let scores = [0.3, 0.7, 0.1, 0.9, 0.5, 0.2];
        let labels = [false, true, false, true, true, false];
        let tie = auc(&scores, &labels).unwrap();
        let ord = auc_ordinal(&scores, &labels).unwrap();
        assert_eq!(tie, ord);
    }

    #[test]
    fn test_average_ranks() {
        assert_eq!(average_ranks(&[3.0, 1.0, 3.0, 2.0]), vec![3.5, 1.0, 3.5, 2.0]);
    }
}
