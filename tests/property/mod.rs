//! Property-based tests for expansion and rendering guarantees

mod determinism;
