//! Quarry Common - Core types shared across all crates
//!
//! This crate provides the foundational types used throughout Quarry:
//! - `Literal`: Literal values as they were written in the query text
//! - `Error`: Unified error types

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::Literal;
