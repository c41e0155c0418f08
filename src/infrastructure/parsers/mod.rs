//! JSON parsing utilities for problem files
//!
//! This module converts JSON problem descriptions into domain types and writes
//! solve reports back out.

/// JSON parser for problem files
pub mod json_parser;

pub use json_parser::*;
