//! # forma-rings
//!
//! Algebraic structures for the forma exact linear algebra library.
//!
//! This crate provides:
//! - Abstract traits: `Ring`, `EuclideanDomain`, `Field`
//! - Concrete implementations: Z, Q, F_p
//!
//! ## Trait Hierarchy
//!
//! ```text
//! Ring
//!  └── CommutativeRing
//!       └── IntegralDomain
//!            └── EuclideanDomain
//!                 └── Field
//! ```
//!
//! Every type in the hierarchy supports exact arithmetic; nothing in this
//! crate approximates.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod finite_field;
pub mod integers;
pub mod rationals;
pub mod traits;

mod proptests;

pub use finite_field::Fp;
pub use integers::Z;
pub use rationals::Q;
pub use traits::{CommutativeRing, EuclideanDomain, Field, IntegralDomain, OrderedRing, Ring};

/// Errors arising when parsing ring elements from text.
#[derive(Debug, thiserror::Error)]
pub enum ParseRingError {
    /// The literal is not a valid integer or rational in the expected base.
    #[error("invalid numeric literal: {0}")]
    Literal(#[from] dashu::base::error::ParseError),
}
