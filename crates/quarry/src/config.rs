//! Planner configuration

use quarry_common::Result;
use quarry_parser::{ParserOptions, SqlDialect};
use serde::Deserialize;

/// Environment variable that overrides the parser dialect
pub const DIALECT_ENV_VAR: &str = "QUARRY_SQL_DIALECT";

/// Configuration for a [`Planner`](crate::Planner).
///
/// Deserializable so it can be embedded in a host's own config file;
/// missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub parser: ParserOptions,
}

impl PlannerConfig {
    pub fn new(parser: ParserOptions) -> Self {
        PlannerConfig { parser }
    }

    /// Default configuration with the dialect taken from
    /// `QUARRY_SQL_DIALECT` when it is set
    pub fn from_env() -> Result<Self> {
        PlannerConfig::default().with_dialect_override(std::env::var(DIALECT_ENV_VAR).ok())
    }

    fn with_dialect_override(mut self, value: Option<String>) -> Result<Self> {
        if let Some(value) = value {
            self.parser.dialect = value.parse::<SqlDialect>()?;
        }
        Ok(self)
    }
}
