//! Finite prime fields F_p.

use std::fmt;

use crate::traits::{CommutativeRing, EuclideanDomain, Field, IntegralDomain, Ring};

/// A finite field F_p for prime p, with a compile-time modulus.
///
/// Optimized for primes that fit in a u64; all operations are performed
/// modulo P with u128 intermediates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fp<const P: u64>(u64);

impl<const P: u64> Fp<P> {
    /// Creates a new field element.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value % P)
    }

    /// Creates a field element from a signed value.
    #[must_use]
    pub fn from_signed(value: i64) -> Self {
        if value >= 0 {
            Self::new(value.unsigned_abs())
        } else {
            Self((P - (value.unsigned_abs() % P)) % P)
        }
    }

    /// Returns the value as a u64 in `0..P`.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the characteristic (the prime p).
    #[must_use]
    pub const fn characteristic() -> u64 {
        P
    }

    /// Computes the modular inverse using the extended Euclidean algorithm.
    ///
    /// Returns `None` if the inverse doesn't exist (for zero, or when the
    /// modulus is not prime and the value shares a factor with it).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn inv(self) -> Option<Self> {
        if self.0 == 0 {
            return None;
        }

        let mut t = 0i128;
        let mut new_t = 1i128;
        let mut r = i128::from(P);
        let mut new_r = i128::from(self.0);

        while new_r != 0 {
            let quotient = r / new_r;
            (t, new_t) = (new_t, t - quotient * new_t);
            (r, new_r) = (new_r, r - quotient * new_r);
        }

        if r > 1 {
            return None;
        }

        if t < 0 {
            t += i128::from(P);
        }
        Some(Self(t as u64))
    }
}

impl<const P: u64> Ring for Fp<P> {
    fn zero() -> Self {
        Self(0)
    }

    fn one() -> Self {
        Self(1 % P)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }

    fn is_one(&self) -> bool {
        self.0 == 1 % P
    }

    fn inverse(&self) -> Option<Self> {
        self.inv()
    }
}

impl<const P: u64> CommutativeRing for Fp<P> {}
impl<const P: u64> IntegralDomain for Fp<P> {}

impl<const P: u64> EuclideanDomain for Fp<P> {
    fn div_rem(&self, other: &Self) -> (Self, Self) {
        let inv = other.inv().expect("division by zero in finite field");
        (*self * inv, Self(0))
    }

    fn euclidean_degree(&self) -> usize {
        usize::from(self.0 != 0)
    }

    fn gcd(&self, other: &Self) -> Self {
        if self.0 == 0 && other.0 == 0 {
            Self(0)
        } else {
            Ring::one()
        }
    }
}

impl<const P: u64> Field for Fp<P> {}

impl<const P: u64> num_traits::Zero for Fp<P> {
    fn zero() -> Self {
        Ring::zero()
    }

    fn is_zero(&self) -> bool {
        Ring::is_zero(self)
    }
}

impl<const P: u64> num_traits::One for Fp<P> {
    fn one() -> Self {
        Ring::one()
    }

    fn is_one(&self) -> bool {
        Ring::is_one(self)
    }
}

impl<const P: u64> std::ops::Add for Fp<P> {
    type Output = Self;

    #[allow(clippy::cast_possible_truncation)]
    fn add(self, rhs: Self) -> Self::Output {
        let sum = u128::from(self.0) + u128::from(rhs.0);
        Self((sum % u128::from(P)) as u64)
    }
}

impl<const P: u64> std::ops::Sub for Fp<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl<const P: u64> std::ops::Mul for Fp<P> {
    type Output = Self;

    #[allow(clippy::cast_possible_truncation)]
    fn mul(self, rhs: Self) -> Self::Output {
        let prod = u128::from(self.0) * u128::from(rhs.0);
        Self((prod % u128::from(P)) as u64)
    }
}

impl<const P: u64> std::ops::Neg for Fp<P> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        if self.0 == 0 {
            self
        } else {
            Self(P - self.0)
        }
    }
}

impl<const P: u64> fmt::Debug for Fp<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (mod {})", self.0, P)
    }
}

impl<const P: u64> fmt::Display for Fp<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type F7 = Fp<7>;

    #[test]
    fn test_arithmetic() {
        let a = F7::new(5);
        let b = F7::new(4);
        assert_eq!(a + b, F7::new(2));
        assert_eq!(a * b, F7::new(6));
        assert_eq!(a - b, F7::new(1));
        assert_eq!(-a, F7::new(2));
    }

    #[test]
    fn test_inverse() {
        for v in 1..7 {
            let x = F7::new(v);
            let inv = x.inverse().unwrap();
            assert!(Ring::is_one(&(x * inv)));
        }
        assert_eq!(F7::new(0).inverse(), None);
    }

    #[test]
    fn test_from_signed() {
        assert_eq!(F7::from_signed(-1), F7::new(6));
        assert_eq!(F7::from_signed(-14), F7::new(0));
        assert_eq!(F7::from_signed(9), F7::new(2));
    }

    #[test]
    fn test_exact_division() {
        let a = F7::new(3);
        let b = F7::new(5);
        let (q, r) = a.div_rem(&b);
        assert!(Ring::is_zero(&r));
        assert_eq!(q * b, a);
    }
}
