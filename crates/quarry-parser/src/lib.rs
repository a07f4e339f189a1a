//! Quarry Parser - SQL parsing front-end
//!
//! This crate wraps sqlparser-rs. It turns SQL text into statements and
//! hands the planner exactly one SELECT query; syntax errors are reported
//! here and never reach the planner.

use quarry_common::{Error, Result};
use sqlparser::ast::{Query, Statement};
use sqlparser::parser::Parser;

pub mod ast;
mod dialect;

pub use dialect::{ParserOptions, SqlDialect};

/// Parse a SQL string into a list of statements
pub fn parse_sql(sql: &str, options: &ParserOptions) -> Result<Vec<Statement>> {
    let dialect = options.dialect.dialect();
    Parser::parse_sql(dialect.as_ref(), sql).map_err(|e| Error::Parse(e.to_string()))
}

/// Parse a single SQL statement
pub fn parse_statement(sql: &str, options: &ParserOptions) -> Result<Statement> {
    let mut statements = parse_sql(sql, options)?;
    if statements.len() != 1 {
        return Err(Error::Parse(format!(
            "Expected 1 statement, got {}",
            statements.len()
        )));
    }
    statements
        .pop()
        .ok_or_else(|| Error::Parse("Expected 1 statement, got 0".to_string()))
}

/// Parse a single SELECT query
pub fn parse_select(sql: &str, options: &ParserOptions) -> Result<Box<Query>> {
    match parse_statement(sql, options)? {
        Statement::Query(query) => Ok(query),
        other => Err(Error::UnsupportedStatement(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic() -> ParserOptions {
        ParserOptions::default()
    }

    #[test]
    fn test_parse_select() {
        let result = parse_sql("SELECT 1", &generic());
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_select_from() {
        let query = parse_select("SELECT * FROM users WHERE id = 1", &generic()).unwrap();
        assert!(matches!(*query.body, ast::SetExpr::Select(_)));
    }

    #[test]
    fn test_parse_multiple_statements() {
        let result = parse_sql("SELECT 1; SELECT 2", &generic());
        assert_eq!(result.unwrap().len(), 2);

        let result = parse_statement("SELECT 1; SELECT 2", &generic());
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = parse_sql("SELECT * FORM users", &generic());
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_select_rejects_other_statements() {
        let result = parse_select("CREATE TABLE t (a INT)", &generic());
        assert!(matches!(result, Err(Error::UnsupportedStatement(_))));
    }

    #[test]
    fn test_parse_with_dialect() {
        let options = ParserOptions::new(SqlDialect::Postgres);
        assert!(parse_select("SELECT a FROM s.t ORDER BY a DESC", &options).is_ok());
    }
}
