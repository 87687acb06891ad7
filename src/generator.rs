//! Generator evaluation: Z(n) = exp(π · ζ(n − 1) / n) + 1.
//!
//! Z is defined for n ≥ 3 only, since ζ has its pole at 1. Evaluations run in
//! the fixed-point arithmetic of an explicit [`Precision`] and are narrowed
//! to `f64` for the feature transforms.

use crate::characters::RealCharacter;
use crate::precision::Precision;
use crate::{PolarityError, Result};

/// Smallest integer at which the generator is defined.
pub const MIN_DEFINED_N: u64 = 3;

/// Evaluates Z and the χ₄-twisted Z_o at one working precision.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    precision: Precision,
}

/// Generator values over an integer range, with undefined points set to 0.
#[derive(Debug, Clone)]
pub struct GeneratorSequence {
    pub start: u64,
    pub z: Vec<f64>,
    pub z_o: Vec<f64>,
    /// How many indices fell below [`MIN_DEFINED_N`] and were substituted.
    pub undefined: usize,
}

impl Generator {
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }

    /// Generator at `digits` decimal digits (floored at 30).
    pub fn with_digits(digits: u32) -> Self {
        Self::new(Precision::new(digits))
    }

    pub fn precision(&self) -> &Precision {
        &self.precision
    }

    /// Z(n), or `None` for n < 3.
    pub fn z(&self, n: u64) -> Option<f64> {
        if n < MIN_DEFINED_N {
            return None;
        }
        let ctx = &self.precision;
        let zeta = ctx.zeta(n - 1)?;
        let exponent = ctx.mul(ctx.pi(), &zeta) / n;
        let value = ctx.exp(&exponent) + ctx.one();
        Some(ctx.to_f64(&value))
    }

    /// Z_o(n) = χ₄(n) · Z(n), or `None` for n < 3.
    ///
    /// This is a demonstration twist, not a canonical definition; even n map
    /// to a computed 0, which is distinct from an undefined value.
    pub fn z_o(&self, n: u64) -> Option<f64> {
        self.z(n)
            .map(|z| f64::from(RealCharacter::Mod4.eval(n)) * z)
    }

    /// Evaluate Z and Z_o over `[start, end]`, substituting 0 where undefined.
    pub fn sequence(&self, start: u64, end: u64) -> Result<GeneratorSequence> {
        if end < start {
            return Err(PolarityError::InvalidRange { start, end });
        }

        let len = (end - start + 1) as usize;
        let mut z = Vec::with_capacity(len);
        let mut z_o = Vec::with_capacity(len);
        let mut undefined = 0;

        for n in start..=end {
            match self.z(n) {
                Some(value) => {
                    z.push(value);
                    z_o.push(f64::from(RealCharacter::Mod4.eval(n)) * value);
                }
                None => {
                    undefined += 1;
                    z.push(0.0);
                    z_o.push(0.0);
                }
            }
        }

        if undefined > 0 {
            log::debug!(
                "generator undefined at {} indices of [{}, {}]; substituted 0",
                undefined,
                start,
                end
            );
        }

        Ok(GeneratorSequence {
            start,
            z,
            z_o,
            undefined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_z_3_is_finite_positive() {
        let gen = Generator::default();
        let z3 = gen.z(3).unwrap();
        assert!(z3.is_finite() && z3 > 0.0);
        // ζ(2) = π²/6
        let expected = (PI * (PI * PI / 6.0) / 3.0).exp() + 1.0;
        assert!((z3 - expected).abs() < 1e-13, "Z(3) = {}, expected {}", z3, expected);
    }

    #[test]
    fn test_z_4_uses_apery() {
        let gen = Generator::with_digits(40);
        let expected = (PI * 1.2020569031595942 / 4.0).exp() + 1.0;
        assert!((gen.z(4).unwrap() - expected).abs() < 1e-13);
    }

    #[test]
    fn test_z_undefined_below_three() {
        let gen = Generator::default();
        assert_eq!(gen.z(0), None);
        assert_eq!(gen.z(1), None);
        assert_eq!(gen.z(2), None);
        assert_eq!(gen.z_o(2), None);
    }

    #[test]
    fn test_z_tends_to_two() {
        // ζ(n−1) → 1, so Z(n) ≈ exp(π/n) + 1
        let gen = Generator::default();
        let n = 5000u64;
        let expected = (PI / n as f64).exp() + 1.0;
        assert!((gen.z(n).unwrap() - expected).abs() < 1e-14);
    }

    #[test]
    fn test_z_o_twist() {
        let gen = Generator::default();
        assert_eq!(gen.z_o(4), Some(0.0));
        assert_eq!(gen.z_o(5), gen.z(5));
        assert_eq!(gen.z_o(7), gen.z(7).map(|z| -z));
    }

    #[test]
    fn test_precision_changes_are_explicit() {
        let low = Generator::with_digits(10);
        let high = Generator::with_digits(80);
        assert_eq!(low.precision().digits(), 30);
        assert!((low.z(6).unwrap() - high.z(6).unwrap()).abs() < 1e-14);
    }

    #[test]
    fn test_sequence_substitutes_zero() {
        let gen = Generator::default();
        let seq = gen.sequence(1, 6).unwrap();
        assert_eq!(seq.z.len(), 6);
        assert_eq!(seq.undefined, 2);
        assert_eq!(&seq.z[..2], &[0.0, 0.0]);
        assert_eq!(seq.z[2], gen.z(3).unwrap());
        assert_eq!(seq.z_o[2], -gen.z(3).unwrap());
        assert_eq!(seq.z_o[3], 0.0);
    }

    #[test]
    fn test_sequence_rejects_reversed_range() {
        let gen = Generator::default();
        assert!(matches!(
            gen.sequence(10, 3),
            Err(PolarityError::InvalidRange { start: 10, end: 3 })
        ));
    }
}
