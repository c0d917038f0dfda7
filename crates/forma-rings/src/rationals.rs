//! The field of rational numbers Q.

use std::fmt;
use std::str::FromStr;

use dashu::base::{Abs, Inverse, Signed as DashuSigned, UnsignedAbs};
use dashu::integer::IBig;
use dashu::rational::RBig;

use crate::traits::{CommutativeRing, EuclideanDomain, Field, IntegralDomain, OrderedRing, Ring};
use crate::ParseRingError;

/// An arbitrary precision rational number.
///
/// Wraps `dashu::RBig`; values are kept in lowest terms with a positive
/// denominator.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Q(pub RBig);

impl Q {
    /// Creates a new rational from numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "denominator cannot be zero");
        let num = if denominator < 0 {
            IBig::from(-numerator)
        } else {
            IBig::from(numerator)
        };
        Self(RBig::from_parts(num, IBig::from(denominator).unsigned_abs()))
    }

    /// Creates a rational from an integer (denominator = 1).
    #[must_use]
    pub fn from_integer(n: i64) -> Self {
        Self(RBig::from(n))
    }

    /// Returns the inner `dashu::RBig`.
    #[must_use]
    pub fn into_inner(self) -> RBig {
        self.0
    }

    /// Returns a reference to the inner `dashu::RBig`.
    #[must_use]
    pub fn as_inner(&self) -> &RBig {
        &self.0
    }

    /// Returns the reciprocal (1/x).
    ///
    /// # Panics
    ///
    /// Panics if the rational is zero.
    #[must_use]
    pub fn recip(&self) -> Self {
        assert!(!Ring::is_zero(self), "cannot take reciprocal of zero");
        Self(self.0.clone().inv())
    }
}

impl Ring for Q {
    fn zero() -> Self {
        Self(RBig::ZERO)
    }

    fn one() -> Self {
        Self(RBig::ONE)
    }

    fn is_zero(&self) -> bool {
        self.0 == RBig::ZERO
    }

    fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }

    fn inverse(&self) -> Option<Self> {
        if Ring::is_zero(self) {
            None
        } else {
            Some(self.recip())
        }
    }
}

impl CommutativeRing for Q {}
impl IntegralDomain for Q {}

impl EuclideanDomain for Q {
    fn div_rem(&self, other: &Self) -> (Self, Self) {
        // Division in a field is exact, so the remainder is always zero.
        (Self(self.0.clone() / other.0.clone()), Self::zero())
    }

    fn euclidean_degree(&self) -> usize {
        usize::from(!Ring::is_zero(self))
    }

    fn gcd(&self, other: &Self) -> Self {
        // In a field, the gcd of any two non-zero elements is 1.
        if Ring::is_zero(self) && Ring::is_zero(other) {
            Self::zero()
        } else {
            Self::one()
        }
    }
}

impl Field for Q {}

impl OrderedRing for Q {
    fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    fn signum(&self) -> i8 {
        if self.0 == RBig::ZERO {
            0
        } else if DashuSigned::is_positive(&self.0) {
            1
        } else {
            -1
        }
    }
}

impl num_traits::Zero for Q {
    fn zero() -> Self {
        Ring::zero()
    }

    fn is_zero(&self) -> bool {
        Ring::is_zero(self)
    }
}

impl num_traits::One for Q {
    fn one() -> Self {
        Ring::one()
    }

    fn is_one(&self) -> bool {
        Ring::is_one(self)
    }
}

impl std::ops::Add for Q {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Q {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Q {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl std::ops::Neg for Q {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl From<i64> for Q {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl FromStr for Q {
    type Err = ParseRingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(RBig::from_str(s)?))
    }
}

impl fmt::Display for Q {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_terms() {
        assert_eq!(Q::new(2, 4), Q::new(1, 2));
        assert_eq!(Q::new(1, -2), Q::new(-1, 2));
    }

    #[test]
    fn test_field_axioms() {
        let a = Q::new(3, 4);
        let inv = a.inverse().unwrap();
        assert!(Ring::is_one(&(a * inv)));
        assert_eq!(Q::zero().inverse(), None);
    }

    #[test]
    fn test_exact_division() {
        let a = Q::new(1, 3);
        let b = Q::new(2, 5);
        let (q, r) = a.div_rem(&b);
        assert!(Ring::is_zero(&r));
        assert_eq!(q * b, a);
    }

    #[test]
    fn test_degree() {
        assert_eq!(Q::zero().euclidean_degree(), 0);
        assert_eq!(Q::new(7, 3).euclidean_degree(), 1);
    }
}
