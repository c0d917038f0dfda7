//! Property-based tests for the concrete rings.
