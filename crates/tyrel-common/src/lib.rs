//! Common types and utilities for the tyrel assignability engine.
//!
//! This crate provides the foundational pieces shared by the solver:
//! - String interning (`Atom`, `ShardedInterner`) for field names, brand tags
//!   and string literal values
//! - Centralized limits and thresholds

// String interning for field names and literal values
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;
