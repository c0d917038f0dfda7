//! The ring of integers Z.

use std::fmt;
use std::str::FromStr;

use dashu::base::{Abs, BitTest, Gcd, Signed as DashuSigned, UnsignedAbs};
use dashu::integer::IBig;

use crate::traits::{CommutativeRing, EuclideanDomain, IntegralDomain, OrderedRing, Ring};
use crate::ParseRingError;

/// An arbitrary precision integer.
///
/// This wraps `dashu::IBig` and implements the algebraic traits the
/// elimination engine consumes. Division truncates toward zero, so
/// remainders carry the sign of the dividend.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Z(pub IBig);

impl Z {
    /// Creates a new integer.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(IBig::from(value))
    }

    /// Creates an integer from a string in the given base.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid integer.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, ParseRingError> {
        Ok(Self(IBig::from_str_radix(s, radix)?))
    }

    /// Returns the inner `dashu::IBig`.
    #[must_use]
    pub fn into_inner(self) -> IBig {
        self.0
    }

    /// Returns a reference to the inner `dashu::IBig`.
    #[must_use]
    pub fn as_inner(&self) -> &IBig {
        &self.0
    }

    /// Attempts to convert to an i64.
    ///
    /// Returns `None` if the value doesn't fit in an i64.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.clone().try_into().ok()
    }

    /// Returns true if this integer is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }
}

impl Ring for Z {
    fn zero() -> Self {
        Self(IBig::ZERO)
    }

    fn one() -> Self {
        Self(IBig::ONE)
    }

    fn is_zero(&self) -> bool {
        self.0 == IBig::ZERO
    }

    fn is_one(&self) -> bool {
        self.0 == IBig::ONE
    }

    fn inverse(&self) -> Option<Self> {
        // The units of Z are exactly ±1, each its own inverse.
        if self.0 == IBig::ONE || self.0 == IBig::NEG_ONE {
            Some(self.clone())
        } else {
            None
        }
    }
}

impl CommutativeRing for Z {}
impl IntegralDomain for Z {}

impl EuclideanDomain for Z {
    fn div_rem(&self, other: &Self) -> (Self, Self) {
        let q = &self.0 / &other.0;
        let r = &self.0 % &other.0;
        (Self(q), Self(r))
    }

    fn euclidean_degree(&self) -> usize {
        // Magnitude bit length: 0 for zero, monotone in |n|.
        self.0.clone().unsigned_abs().bit_len()
    }

    fn gcd(&self, other: &Self) -> Self {
        if self.is_zero() && other.is_zero() {
            return Self::zero();
        }
        Self(IBig::from(self.0.clone().gcd(other.0.clone())))
    }
}

impl OrderedRing for Z {
    fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    fn signum(&self) -> i8 {
        if self.0 == IBig::ZERO {
            0
        } else if DashuSigned::is_positive(&self.0) {
            1
        } else {
            -1
        }
    }
}

impl num_traits::Zero for Z {
    fn zero() -> Self {
        Ring::zero()
    }

    fn is_zero(&self) -> bool {
        Ring::is_zero(self)
    }
}

impl num_traits::One for Z {
    fn one() -> Self {
        Ring::one()
    }

    fn is_one(&self) -> bool {
        Ring::is_one(self)
    }
}

impl std::ops::Add for Z {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Z {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Z {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl std::ops::Neg for Z {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl From<i64> for Z {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<IBig> for Z {
    fn from(value: IBig) -> Self {
        Self(value)
    }
}

impl FromStr for Z {
    type Err = ParseRingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(IBig::from_str(s)?))
    }
}

impl fmt::Display for Z {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_laws() {
        let a = Z::new(10);
        let b = Z::new(3);

        assert!(Ring::is_zero(&Z::zero()));
        assert!(Ring::is_one(&Z::one()));

        assert_eq!(a.clone() + b.clone(), Z::new(13));
        assert_eq!(a * b, Z::new(30));
    }

    #[test]
    fn test_units() {
        assert_eq!(Z::new(1).inverse(), Some(Z::new(1)));
        assert_eq!(Z::new(-1).inverse(), Some(Z::new(-1)));
        assert_eq!(Z::new(2).inverse(), None);
        assert_eq!(Z::new(0).inverse(), None);
    }

    #[test]
    fn test_euclidean_domain() {
        let a = Z::new(17);
        let b = Z::new(5);

        let (q, r) = a.div_rem(&b);
        assert_eq!(q, Z::new(3));
        assert_eq!(r, Z::new(2));

        // Truncated division: remainder carries the dividend's sign.
        let (q, r) = Z::new(-17).div_rem(&b);
        assert_eq!(q, Z::new(-3));
        assert_eq!(r, Z::new(-2));
    }

    #[test]
    fn test_euclidean_degree() {
        assert_eq!(Z::new(0).euclidean_degree(), 0);
        assert_eq!(Z::new(1).euclidean_degree(), 1);
        assert_eq!(Z::new(-8).euclidean_degree(), 4);
        assert!(Z::new(5).euclidean_degree() <= Z::new(100).euclidean_degree());
    }

    #[test]
    fn test_extended_gcd() {
        let a = Z::new(48);
        let b = Z::new(18);

        let (g, x, y) = a.extended_gcd(&b);
        assert_eq!(g.clone().abs(), Z::new(6));
        assert_eq!(a * x + b * y, g);
    }

    #[test]
    fn test_parse() {
        let n: Z = "-1234567890123456789012345".parse().unwrap();
        assert_eq!(n, -("1234567890123456789012345".parse::<Z>().unwrap()));
        assert!("12x".parse::<Z>().is_err());
    }
}
