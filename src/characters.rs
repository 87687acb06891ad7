//! Real Dirichlet characters for the small moduli the projections support.
//!
//! χ₄ is the primitive odd character mod 4; the mod 5, 8 and 12 characters
//! are the even real characters taking +1 on ±1 and −1 on the remaining
//! units. All vanish off the unit group.

use std::fmt;
use std::str::FromStr;

use num_integer::Integer;
use serde::{Deserialize, Serialize};

use crate::{PolarityError, Result};

/// A real character, fixed at construction to one of the supported moduli.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RealCharacter {
    Mod4,
    Mod5,
    Mod8,
    Mod12,
}

impl RealCharacter {
    pub const ALL: [RealCharacter; 4] = [
        RealCharacter::Mod4,
        RealCharacter::Mod5,
        RealCharacter::Mod8,
        RealCharacter::Mod12,
    ];

    pub fn modulus(self) -> u64 {
        match self {
            RealCharacter::Mod4 => 4,
            RealCharacter::Mod5 => 5,
            RealCharacter::Mod8 => 8,
            RealCharacter::Mod12 => 12,
        }
    }

    /// χ(m) ∈ {−1, 0, 1}.
    pub fn eval(self, m: u64) -> i8 {
        match self {
            RealCharacter::Mod4 => chi_mod4(m),
            RealCharacter::Mod5 => chi_mod5(m),
            RealCharacter::Mod8 => chi_unit_pm1(m, 8),
            RealCharacter::Mod12 => chi_unit_pm1(m, 12),
        }
    }
}

fn chi_mod4(m: u64) -> i8 {
    if m % 2 == 0 {
        0
    } else if m % 4 == 1 {
        1
    } else {
        -1
    }
}

fn chi_mod5(m: u64) -> i8 {
    match m % 5 {
        0 => 0,
        1 | 4 => 1,
        _ => -1,
    }
}

/// +1 on residues ±1 mod q, −1 on the other units, 0 off the units.
fn chi_unit_pm1(m: u64, q: u64) -> i8 {
    if m.gcd(&q) != 1 {
        return 0;
    }
    let r = m % q;
    if r == 1 || r == q - 1 {
        1
    } else {
        -1
    }
}

impl TryFrom<u64> for RealCharacter {
    type Error = PolarityError;

    fn try_from(modulus: u64) -> Result<Self> {
        match modulus {
            4 => Ok(RealCharacter::Mod4),
            5 => Ok(RealCharacter::Mod5),
            8 => Ok(RealCharacter::Mod8),
            12 => Ok(RealCharacter::Mod12),
            other => Err(PolarityError::UnsupportedModulus(other)),
        }
    }
}

impl FromStr for RealCharacter {
    type Err = PolarityError;

    fn from_str(s: &str) -> Result<Self> {
        let modulus: u64 = s
            .trim()
            .parse()
            .map_err(|_| PolarityError::InvalidModulusList(s.to_string()))?;
        RealCharacter::try_from(modulus)
    }
}

impl fmt::Display for RealCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chi mod {}", self.modulus())
    }
}

/// Parse a comma-separated modulus list such as `"4,5,8,12"`.
///
/// Blank entries are skipped; any unparsable or unsupported entry rejects
/// the whole list.
pub fn parse_moduli(list: &str) -> Result<Vec<RealCharacter>> {
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse)
        .collect()
}
