//! Arithmetic sieves: primality flags, the Möbius function and divisor lists.
//!
//! Every table is indexed directly by the integer it describes, so entry `k`
//! of a table built for `max_n` covers `k` for all `0 ≤ k ≤ max_n`.

use crate::{PolarityError, Result};

/// Primality flags for `0..=max_n` via the sieve of Eratosthenes.
///
/// Multiples of each prime p are struck starting at p², so the work is
/// O(max_n log log max_n). Entries 0 and 1 are always `false`.
pub fn primality_flags(max_n: usize) -> Vec<bool> {
    let mut is_prime = vec![true; max_n + 1];
    is_prime[0] = false;
    if max_n >= 1 {
        is_prime[1] = false;
    }

    let mut p = 2;
    while p * p <= max_n {
        if is_prime[p] {
            let mut multiple = p * p;
            while multiple <= max_n {
                is_prime[multiple] = false;
                multiple += p;
            }
        }
        p += 1;
    }

    is_prime
}

/// Möbius values μ(k) for `0..=max_n` using a linear sieve.
///
/// Each composite i·p is visited once, through its smallest prime factor p:
/// μ(i·p) = 0 when p | i, otherwise μ(i·p) = −μ(i). μ(0) = 0 is a sentinel.
pub fn mobius_values(max_n: usize) -> Vec<i8> {
    let mut mu = vec![1i8; max_n + 1];
    let mut composite = vec![false; max_n + 1];
    let mut primes: Vec<usize> = Vec::new();

    for i in 2..=max_n {
        if !composite[i] {
            primes.push(i);
            mu[i] = -1;
        }
        for &p in &primes {
            let ip = i * p;
            if ip > max_n {
                break;
            }
            composite[ip] = true;
            if i % p == 0 {
                mu[ip] = 0;
                break;
            }
            mu[ip] = -mu[i];
        }
    }

    mu[0] = 0;
    mu
}

/// Sorted positive divisors of every integer in `0..=max_n`.
///
/// Built by appending each candidate d to all of its multiples, which keeps
/// every list ascending without a sort. The list for 0 is empty.
pub fn divisors(max_n: usize) -> Vec<Vec<usize>> {
    let mut divs: Vec<Vec<usize>> = vec![Vec::new(); max_n + 1];
    for d in 1..=max_n {
        let mut k = d;
        while k <= max_n {
            divs[k].push(d);
            k += d;
        }
    }
    divs
}

/// List the primes up to `bound`.
pub fn primes_up_to(bound: usize) -> Vec<usize> {
    primality_flags(bound)
        .iter()
        .enumerate()
        .filter_map(|(i, &is_p)| if is_p { Some(i) } else { None })
        .collect()
}

/// Prime labels for the inclusive range `[start, end]`: position i is
/// `true` iff `start + i` is prime.
pub fn labels_for_range(start: u64, end: u64) -> Result<Vec<bool>> {
    if end < start {
        return Err(PolarityError::InvalidRange { start, end });
    }
    let flags = primality_flags(end as usize);
    Ok(flags[start as usize..=end as usize].to_vec())
}

/// The Möbius and divisor tables a Möbius twist over a window needs.
#[derive(Debug, Clone)]
pub struct ArithmeticTables {
    pub max_n: usize,
    pub mobius: Vec<i8>,
    pub divisors: Vec<Vec<usize>>,
}

impl ArithmeticTables {
    pub fn new(max_n: usize) -> Self {
        Self {
            max_n,
            mobius: mobius_values(max_n),
            divisors: divisors(max_n),
        }
    }

    /// Whether the tables reach integer `n`.
    pub fn covers(&self, n: usize) -> bool {
        n <= self.max_n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primality_flags_up_to_30() {
        let primes: Vec<usize> = primality_flags(30)
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn test_primality_flags_degenerate() {
        assert_eq!(primality_flags(0), vec![false]);
        assert_eq!(primality_flags(1), vec![false, false]);
        assert_eq!(primality_flags(2), vec![false, false, true]);
    }

    #[test]
    fn test_mobius_small_values() {
        let mu = mobius_values(10);
        assert_eq!(mu[0], 0);
        assert_eq!(mu[1], 1);
        assert_eq!(mu[2], -1);
        assert_eq!(mu[3], -1);
        assert_eq!(mu[4], 0);
        assert_eq!(mu[5], -1);
        assert_eq!(mu[6], 1);
        assert_eq!(mu[8], 0);
        assert_eq!(mu[10], 1);
    }

    #[test]
    fn test_mobius_degenerate() {
        assert_eq!(mobius_values(0), vec![0]);
        assert_eq!(mobius_values(1), vec![0, 1]);
    }

    #[test]
    fn test_mobius_matches_factorisation() {
        // 30 = 2·3·5, 42 = 2·3·7, 12 = 2²·3
        let mu = mobius_values(100);
        assert_eq!(mu[30], -1);
        assert_eq!(mu[42], -1);
        assert_eq!(mu[12], 0);
        assert_eq!(mu[77], 1);
        assert_eq!(mu[97], -1);
    }

    #[test]
    fn test_divisors_of_12() {
        let divs = divisors(12);
        assert_eq!(divs[12], vec![1, 2, 3, 4, 6, 12]);
        assert!(divs[0].is_empty());
        assert_eq!(divs[1], vec![1]);
    }

    #[test]
    fn test_divisors_of_primes() {
        let divs = divisors(50);
        for p in primes_up_to(50) {
            assert_eq!(divs[p], vec![1, p], "divisors of prime {}", p);
        }
    }

    #[test]
    fn test_labels_for_range() {
        let labels = labels_for_range(10, 20).unwrap();
        assert_eq!(labels.len(), 11);
        let primes: Vec<u64> = (10..=20).zip(&labels).filter(|(_, &b)| b).map(|(n, _)| n).collect();
        assert_eq!(primes, vec![11, 13, 17, 19]);
    }

    #[test]
    fn test_labels_reject_reversed_range() {
        assert_eq!(
            labels_for_range(20, 10),
            Err(PolarityError::InvalidRange { start: 20, end: 10 })
        );
    }
}
