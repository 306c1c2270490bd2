//! Signed unbounded integers for constant folding.

use num_bigint::BigInt;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// A signed integer with no fixed width.
///
/// Backed by [`num_bigint::BigInt`]; the wrapper pins down the division
/// semantics the folder relies on (quotient truncated toward zero, remainder
/// taking the dividend's sign, zero divisors surfaced as `None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(BigInt);

impl Int {
    pub fn zero() -> Self {
        Int(BigInt::from(0))
    }

    pub fn one() -> Self {
        Int(BigInt::from(1))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigInt::from(0)
    }

    /// Truncated division. `None` when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Int) -> Option<Int> {
        if rhs.is_zero() {
            return None;
        }
        Some(Int(&self.0 / &rhs.0))
    }

    /// Remainder with the sign of the dividend. `None` when `rhs` is zero.
    pub fn checked_rem(&self, rhs: &Int) -> Option<Int> {
        if rhs.is_zero() {
            return None;
        }
        Some(Int(&self.0 % &rhs.0))
    }

    /// Bit width of the magnitude (0 for zero).
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }
}

impl From<i64> for Int {
    fn from(v: i64) -> Self {
        Int(BigInt::from(v))
    }
}

impl From<u64> for Int {
    fn from(v: u64) -> Self {
        Int(BigInt::from(v))
    }
}

impl From<i32> for Int {
    fn from(v: i32) -> Self {
        Int(BigInt::from(v))
    }
}

impl From<BigInt> for Int {
    fn from(v: BigInt) -> Self {
        Int(v)
    }
}

impl FromStr for Int {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Int(BigInt::from_str(s)?))
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for &Int {
    type Output = Int;
    fn add(self, rhs: &Int) -> Int {
        Int(&self.0 + &rhs.0)
    }
}

impl Sub for &Int {
    type Output = Int;
    fn sub(self, rhs: &Int) -> Int {
        Int(&self.0 - &rhs.0)
    }
}

impl Mul for &Int {
    type Output = Int;
    fn mul(self, rhs: &Int) -> Int {
        Int(&self.0 * &rhs.0)
    }
}

impl Neg for &Int {
    type Output = Int;
    fn neg(self) -> Int {
        Int(-&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Int {
        Int::from(v)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(&(&int(1) + &int(2)) * &int(3), int(9));
        assert_eq!(&int(5) - &int(7), int(-2));
        assert_eq!(-&int(4), int(-4));
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(int(7).checked_div(&int(2)), Some(int(3)));
        assert_eq!(int(-7).checked_div(&int(2)), Some(int(-3)));
        assert_eq!(int(7).checked_div(&int(-2)), Some(int(-3)));
    }

    #[test]
    fn test_rem_takes_dividend_sign() {
        assert_eq!(int(7).checked_rem(&int(3)), Some(int(1)));
        assert_eq!(int(-7).checked_rem(&int(3)), Some(int(-1)));
        assert_eq!(int(7).checked_rem(&int(-3)), Some(int(1)));
    }

    #[test]
    fn test_zero_divisor() {
        assert_eq!(int(5).checked_div(&Int::zero()), None);
        assert_eq!(int(5).checked_rem(&Int::zero()), None);
    }

    #[test]
    fn test_parse_and_format() {
        let v: Int = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(v.to_string(), "123456789012345678901234567890");
        let n: Int = "-42".parse().unwrap();
        assert_eq!(n, int(-42));
        assert!("4x".parse::<Int>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(int(-1) < int(0));
        assert!(int(3) <= int(3));
    }

    #[test]
    fn test_bits() {
        assert_eq!(int(0).bits(), 0);
        assert_eq!(int(1).bits(), 1);
        assert_eq!(int(255).bits(), 8);
        assert_eq!(int(256).bits(), 9);
    }
}
