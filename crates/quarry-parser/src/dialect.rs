//! Dialect selection for the parser front-end

use quarry_common::{Error, Result};
use serde::Deserialize;
use sqlparser::dialect::{
    Dialect, DuckDbDialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};
use std::fmt;
use std::str::FromStr;

/// The SQL dialect used to tokenize and parse query text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Generic,
    Postgres,
    MySql,
    DuckDb,
    Sqlite,
}

impl SqlDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlDialect::Generic => "generic",
            SqlDialect::Postgres => "postgres",
            SqlDialect::MySql => "mysql",
            SqlDialect::DuckDb => "duckdb",
            SqlDialect::Sqlite => "sqlite",
        }
    }

    /// Instantiate the matching sqlparser dialect
    pub fn dialect(&self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::Generic => Box::new(GenericDialect {}),
            SqlDialect::Postgres => Box::new(PostgreSqlDialect {}),
            SqlDialect::MySql => Box::new(MySqlDialect {}),
            SqlDialect::DuckDb => Box::new(DuckDbDialect {}),
            SqlDialect::Sqlite => Box::new(SQLiteDialect {}),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlDialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "ansi" => Ok(SqlDialect::Generic),
            "postgres" | "postgresql" => Ok(SqlDialect::Postgres),
            "mysql" => Ok(SqlDialect::MySql),
            "duckdb" => Ok(SqlDialect::DuckDb),
            "sqlite" => Ok(SqlDialect::Sqlite),
            other => Err(Error::Parse(format!("Unknown SQL dialect: {}", other))),
        }
    }
}

/// Options for the parser front-end
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub dialect: SqlDialect,
}

impl ParserOptions {
    pub fn new(dialect: SqlDialect) -> Self {
        ParserOptions { dialect }
    }
}
