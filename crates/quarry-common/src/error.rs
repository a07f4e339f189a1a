//! Error types for Quarry

use thiserror::Error;

/// The main error type for Quarry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Parser errors
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    // Planner errors
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("Ambiguous alias: {0}")]
    AmbiguousAlias(String),

    #[error("Invalid table-valued function argument: {0}")]
    InvalidTableValuedFunctionArgument(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// A clause the parser accepts but the logical plan has no node for
    #[error("Unsupported clause: {0}")]
    UnsupportedClause(String),

    // Output errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using Quarry's Error
pub type Result<T> = std::result::Result<T, Error>;
