//! Algebraic structure traits.
//!
//! This module defines the algebraic contracts consumed by the elimination
//! engine: commutative rings with a partial unit inverse, Euclidean domains
//! with combined division-with-remainder, and fields.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// A ring is a set with addition and multiplication operations.
///
/// # Laws
///
/// - Addition is associative and commutative with identity `zero()`
/// - Multiplication is associative with identity `one()`
/// - Multiplication distributes over addition
/// - Every element has an additive inverse (`neg`)
pub trait Ring:
    Clone + Eq + Debug + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self>
{
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Returns true if this is the additive identity.
    fn is_zero(&self) -> bool;

    /// Returns true if this is the multiplicative identity.
    fn is_one(&self) -> bool;

    /// The multiplicative inverse, if this element is a unit.
    ///
    /// Returns `None` for non-units (in particular for zero). This is the
    /// invertibility test used when selecting elimination pivots.
    fn inverse(&self) -> Option<Self>;

    /// Computes self + self + ... (n times).
    fn mul_by_scalar(&self, n: i64) -> Self {
        if n == 0 {
            return Self::zero();
        }

        let mut result = self.clone();
        let abs_n = n.unsigned_abs();

        for _ in 1..abs_n {
            result = result + self.clone();
        }

        if n < 0 {
            -result
        } else {
            result
        }
    }

    /// Computes self^n for non-negative n.
    fn pow(&self, n: u32) -> Self {
        if n == 0 {
            return Self::one();
        }

        let mut result = Self::one();
        let mut base = self.clone();
        let mut exp = n;

        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base.clone();
            }
            base = base.clone() * base;
            exp >>= 1;
        }

        result
    }
}

/// A commutative ring where multiplication is commutative.
pub trait CommutativeRing: Ring {}

/// An integral domain is a commutative ring with no zero divisors.
///
/// If a * b = 0, then a = 0 or b = 0.
pub trait IntegralDomain: CommutativeRing {}

/// A Euclidean domain supports division with remainder.
///
/// For any a, b with b ≠ 0, there exist q, r such that:
/// - a = b*q + r
/// - Either r = 0 or φ(r) < φ(b) for the Euclidean function φ
pub trait EuclideanDomain: IntegralDomain {
    /// Computes the quotient and remainder of division.
    ///
    /// # Panics
    ///
    /// May panic if `other` is zero.
    fn div_rem(&self, other: &Self) -> (Self, Self);

    /// A non-negative measure compatible with `div_rem`: the remainder of a
    /// division always has strictly smaller degree than the divisor.
    ///
    /// `euclidean_degree(0) == 0` by convention. Elimination uses this only
    /// as a pivot-quality heuristic, never for correctness.
    fn euclidean_degree(&self) -> usize;

    /// Computes the quotient of division.
    fn div(&self, other: &Self) -> Self {
        self.div_rem(other).0
    }

    /// Computes the remainder of division.
    fn rem(&self, other: &Self) -> Self {
        self.div_rem(other).1
    }

    /// Returns true if `other` divides this element exactly.
    fn is_divisible_by(&self, other: &Self) -> bool {
        self.rem(other).is_zero()
    }

    /// Computes the greatest common divisor.
    fn gcd(&self, other: &Self) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();

        while !b.is_zero() {
            let r = a.rem(&b);
            a = b;
            b = r;
        }

        a
    }

    /// Computes the least common multiple.
    fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let g = self.gcd(other);
        self.div(&g) * other.clone()
    }

    /// Extended Euclidean algorithm.
    ///
    /// Returns (gcd, x, y) such that gcd = self*x + other*y.
    fn extended_gcd(&self, other: &Self) -> (Self, Self, Self) {
        let mut old_r = self.clone();
        let mut r = other.clone();
        let mut old_s = Self::one();
        let mut s = Self::zero();
        let mut old_t = Self::zero();
        let mut t = Self::one();

        while !r.is_zero() {
            let (q, rem) = old_r.div_rem(&r);
            old_r = r;
            r = rem;

            let new_s = old_s.clone() - q.clone() * s.clone();
            old_s = s;
            s = new_s;

            let new_t = old_t.clone() - q * t.clone();
            old_t = t;
            t = new_t;
        }

        (old_r, old_s, old_t)
    }
}

/// A field is a ring where every non-zero element has a multiplicative
/// inverse, so `Ring::inverse` is `Some` exactly on non-zero elements.
pub trait Field: EuclideanDomain {
    /// Divides by another element.
    ///
    /// # Panics
    ///
    /// Panics if `other` is zero.
    fn field_div(&self, other: &Self) -> Self {
        self.clone() * other.inverse().expect("division by zero")
    }
}

/// Marker trait for ordered rings.
pub trait OrderedRing: Ring + Ord {
    /// Returns the absolute value.
    fn abs(&self) -> Self;

    /// Returns the sign: -1, 0, or 1.
    fn signum(&self) -> i8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integers::Z;

    #[test]
    fn test_default_gcd_and_lcm() {
        let a = Z::new(12);
        let b = Z::new(18);
        assert_eq!(a.gcd(&b).abs(), Z::new(6));
        assert_eq!(a.lcm(&b).abs(), Z::new(36));
    }

    #[test]
    fn test_extended_gcd_bezout() {
        let a = Z::new(240);
        let b = Z::new(46);
        let (g, x, y) = a.extended_gcd(&b);
        assert_eq!(a * x + b * y, g);
    }

    #[test]
    fn test_pow() {
        assert_eq!(Z::new(3).pow(5), Z::new(243));
        assert_eq!(Z::new(7).pow(0), Z::new(1));
    }

    #[test]
    fn test_divisibility() {
        assert!(Z::new(12).is_divisible_by(&Z::new(4)));
        assert!(!Z::new(12).is_divisible_by(&Z::new(5)));
    }
}
