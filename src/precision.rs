//! Binary fixed-point arithmetic at a caller-chosen decimal precision.
//!
//! A value x is stored as the integer ⌊x · 2^bits⌋ in a `BigInt`, where
//! `bits` covers the requested decimal digits plus guard bits. The context
//! owns the constants every generator evaluation needs (π and the Borwein
//! ζ coefficients), so one `Precision` is built per run and shared by all
//! evaluations made with it.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Precision floor; smaller requests are raised to this.
pub const MIN_DIGITS: u32 = 30;
/// Precision used when none is requested.
pub const DEFAULT_DIGITS: u32 = 50;

const GUARD_BITS: u64 = 32;

/// Working precision plus the constants derived from it.
#[derive(Debug, Clone)]
pub struct Precision {
    digits: u32,
    bits: u64,
    pi: BigInt,
    zeta_terms: usize,
    /// Borwein partial sums d_0..=d_n for the alternating η series.
    borwein: Vec<BigUint>,
}

impl Precision {
    /// Build a context for `digits` decimal digits, floored at [`MIN_DIGITS`].
    pub fn new(digits: u32) -> Self {
        let digits = digits.max(MIN_DIGITS);
        // log2(10) ≈ 3.3220
        let bits = digits as u64 * 3322 / 1000 + 1 + GUARD_BITS;
        // Borwein's error shrinks like (3 + √8)^-n ≈ 10^(-0.766 n).
        let zeta_terms = digits as usize * 4 / 3 + 8;
        let pi = machin_pi(bits);
        let borwein = borwein_coefficients(zeta_terms);

        log::debug!(
            "precision context: {} digits, {} bits, {} zeta terms",
            digits,
            bits,
            zeta_terms
        );

        Self {
            digits,
            bits,
            pi,
            zeta_terms,
            borwein,
        }
    }

    /// Effective decimal digits after flooring.
    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Fractional bits of the fixed-point representation.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Fixed-point 1.
    pub fn one(&self) -> BigInt {
        BigInt::one() << self.bits as usize
    }

    /// Fixed-point π.
    pub fn pi(&self) -> &BigInt {
        &self.pi
    }

    /// Fixed-point product.
    pub fn mul(&self, a: &BigInt, b: &BigInt) -> BigInt {
        (a * b) >> self.bits as usize
    }

    /// Fixed-point value of an integer.
    pub fn from_u64(&self, v: u64) -> BigInt {
        BigInt::from(v) << self.bits as usize
    }

    /// Riemann ζ(s) for an integer argument s ≥ 2, `None` below that.
    ///
    /// Uses Borwein's accelerated alternating series
    ///   ζ(s) = 1 / (d_n (1 − 2^{1−s})) · Σ_{k<n} (−1)^k (d_n − d_k) / (k+1)^s.
    /// Once 2^{−s} drops below one unit in the last place, ζ(s) is exactly 1
    /// at this precision.
    pub fn zeta(&self, s: u64) -> Option<BigInt> {
        if s < 2 {
            return None;
        }
        if s > self.bits {
            return Some(self.one());
        }

        let shift = self.bits as usize;
        let d_n = &self.borwein[self.zeta_terms];
        let mut acc = BigInt::zero();

        for k in 0..self.zeta_terms {
            let diff: BigUint = d_n - &self.borwein[k];
            let denom = BigUint::from(k as u64 + 1).pow(s as u32);
            let term = BigInt::from((diff << shift) / denom);
            if k % 2 == 0 {
                acc += term;
            } else {
                acc -= term;
            }
        }

        let half_power = BigUint::one() << (s - 1) as usize;
        let scale = BigInt::from(d_n * (&half_power - BigUint::one()));
        Some((acc << (s - 1) as usize) / scale)
    }

    /// Fixed-point e^x.
    ///
    /// The argument is halved until it is at most 1, expanded as a Taylor
    /// series, then squared back up.
    pub fn exp(&self, x: &BigInt) -> BigInt {
        if x.is_negative() {
            let positive = self.exp(&-x);
            return (self.one() << self.bits as usize) / positive;
        }

        let one = self.one();
        let mut reduced = x.clone();
        let mut halvings = 0u32;
        while reduced > one {
            reduced >>= 1;
            halvings += 1;
        }

        let mut sum = one.clone();
        let mut term = one;
        let mut k = 1u64;
        loop {
            term = self.mul(&term, &reduced) / BigInt::from(k);
            if term.is_zero() {
                break;
            }
            sum += &term;
            k += 1;
        }

        for _ in 0..halvings {
            sum = self.mul(&sum, &sum);
        }
        sum
    }

    /// Narrow a fixed-point value to `f64`.
    pub fn to_f64(&self, x: &BigInt) -> f64 {
        let shift = self.bits.saturating_sub(62);
        let top = (x >> shift as usize).to_f64().unwrap_or(f64::NAN);
        top / 2f64.powi((self.bits - shift) as i32)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::new(DEFAULT_DIGITS)
    }
}

/// π = 16·atan(1/5) − 4·atan(1/239) at `bits` fractional bits.
fn machin_pi(bits: u64) -> BigInt {
    atan_inverse(5, bits) * 16u32 - atan_inverse(239, bits) * 4u32
}

/// atan(1/x) = Σ (−1)^k / ((2k+1) x^{2k+1}) at `bits` fractional bits.
fn atan_inverse(x: u64, bits: u64) -> BigInt {
    let x_sq = BigUint::from(x * x);
    let mut power = (BigUint::one() << bits as usize) / x;
    let mut sum = BigInt::from(power.clone());
    let mut k = 1u64;

    loop {
        power /= &x_sq;
        let term = &power / (2 * k + 1);
        if term.is_zero() {
            break;
        }
        if k % 2 == 1 {
            sum -= BigInt::from(term);
        } else {
            sum += BigInt::from(term);
        }
        k += 1;
    }

    sum
}

/// Borwein coefficients d_k = n Σ_{i≤k} (n+i−1)! 4^i / ((n−i)! (2i)!).
///
/// Each summand follows from the previous by the ratio
/// 4 (n+i−1)(n−i+1) / (2i (2i−1)), and every summand is an integer, so the
/// division is exact.
fn borwein_coefficients(n: usize) -> Vec<BigUint> {
    let mut coefficients = Vec::with_capacity(n + 1);
    let mut summand = BigUint::one();
    let mut partial = BigUint::one();
    coefficients.push(partial.clone());

    for i in 1..=n as u64 {
        let n = n as u64;
        summand = summand * (4 * (n + i - 1) * (n - i + 1)) / ((2 * i) * (2 * i - 1));
        partial += &summand;
        coefficients.push(partial.clone());
    }

    coefficients
}
