//! Property-based tests for the elimination engine.
