// Path: crates/types/src/app/decimal.rs

//! Fixed-point decimal arithmetic for consensus paths.
//!
//! `Dec` stores a non-negative value scaled by 10^18 in a `u128`. All operations
//! are checked integer operations so that every replica computes identical results.

use parity_scale_codec::{Decode, Encode};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places carried by `Dec`.
pub const DEC_PRECISION: u32 = 18;
const ONE_RAW: u128 = 1_000_000_000_000_000_000;

/// A non-negative fixed-point number with 18 decimal places.
#[derive(Encode, Decode, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(u128);

impl Dec {
    /// Zero.
    pub const ZERO: Dec = Dec(0);
    /// One.
    pub const ONE: Dec = Dec(ONE_RAW);

    /// Builds a value from its scaled representation.
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the scaled representation.
    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// Converts a whole number of units, returning `None` on overflow.
    pub fn from_units(units: u128) -> Option<Self> {
        units.checked_mul(ONE_RAW).map(Self)
    }

    /// True if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The whole-unit part, discarding the fraction.
    pub fn truncate(&self) -> u128 {
        self.0 / ONE_RAW
    }

    /// The fractional part.
    pub fn fract(&self) -> Dec {
        Dec(self.0 % ONE_RAW)
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Dec) -> Option<Dec> {
        self.0.checked_add(rhs.0).map(Dec)
    }

    /// `self - rhs`, or `None` if the result would be negative.
    pub fn checked_sub(self, rhs: Dec) -> Option<Dec> {
        self.0.checked_sub(rhs.0).map(Dec)
    }

    /// `self * n` for an integer `n`, or `None` on overflow.
    pub fn checked_mul_int(self, n: u64) -> Option<Dec> {
        self.0.checked_mul(u128::from(n)).map(Dec)
    }

    /// `self * rhs`, truncated to 18 decimals, or `None` on overflow.
    pub fn checked_mul(self, rhs: Dec) -> Option<Dec> {
        let (ai, af) = (self.0 / ONE_RAW, self.0 % ONE_RAW);
        let (bi, bf) = (rhs.0 / ONE_RAW, rhs.0 % ONE_RAW);
        let whole = ai.checked_mul(bi)?.checked_mul(ONE_RAW)?;
        let cross = ai.checked_mul(bf)?.checked_add(af.checked_mul(bi)?)?;
        // af and bf are both below 10^18, so their product fits.
        let frac = af * bf / ONE_RAW;
        whole.checked_add(cross)?.checked_add(frac).map(Dec)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / ONE_RAW;
        let frac = self.0 % ONE_RAW;
        if frac == 0 {
            return write!(f, "{}", int);
        }
        let digits = format!("{:018}", frac);
        write!(f, "{}.{}", int, digits.trim_end_matches('0'))
    }
}

impl FromStr for Dec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err("empty decimal".to_string());
        }
        if frac_part.len() > DEC_PRECISION as usize {
            return Err(format!("too many decimal places in '{}'", s));
        }
        let is_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if !is_digits(int_part) || !is_digits(frac_part) {
            return Err(format!("invalid decimal '{}'", s));
        }
        let int: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|e| format!("invalid decimal '{}': {}", s, e))?
        };
        let frac: u128 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{:0<18}", frac_part);
            padded
                .parse()
                .map_err(|e| format!("invalid decimal '{}': {}", s, e))?
        };
        int.checked_mul(ONE_RAW)
            .and_then(|v| v.checked_add(frac))
            .map(Dec)
            .ok_or_else(|| format!("decimal '{}' overflows", s))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Dec::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let d: Dec = "0.05".parse().unwrap();
        assert_eq!(d.raw(), 50_000_000_000_000_000);
        assert_eq!(d.to_string(), "0.05");
        assert_eq!("200000000".parse::<Dec>().unwrap().truncate(), 200_000_000);
        assert_eq!(Dec::ONE.to_string(), "1");
        assert!("1.2.3".parse::<Dec>().is_err());
        assert!("-1".parse::<Dec>().is_err());
        assert!("0.0000000000000000001".parse::<Dec>().is_err());
    }

    #[test]
    fn multiplication_truncates_toward_zero() {
        let rate: Dec = "1.5".parse().unwrap();
        let keep: Dec = "0.95".parse().unwrap();
        assert_eq!(rate.checked_mul(keep).unwrap().to_string(), "1.425");
        let tiny = Dec::from_raw(1);
        assert_eq!(tiny.checked_mul(keep).unwrap(), Dec::ZERO);
        assert_eq!(rate.checked_mul_int(3).unwrap().to_string(), "4.5");
    }

    #[test]
    fn truncate_and_fract_split_the_value() {
        let d: Dec = "12.75".parse().unwrap();
        assert_eq!(d.truncate(), 12);
        assert_eq!(d.fract().to_string(), "0.75");
    }
}
