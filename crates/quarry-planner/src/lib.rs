//! Quarry Planner - Logical planning for SELECT statements
//!
//! Converts parsed SELECT statements into trees of [`Plan`] nodes and
//! renders them in the canonical JSON form.

pub mod alias_resolver;
pub mod expression_builder;
pub mod json;
pub mod plan;
mod plan_builder;
pub mod table_function;

pub use alias_resolver::AliasResolver;
pub use expression_builder::build_expression;
pub use plan::*;
pub use plan_builder::*;
pub use table_function::build_table_function;

use quarry_common::Result;
use sqlparser::ast::Statement;

/// Create a logical plan from a parsed statement
pub fn create_logical_plan(statement: &Statement) -> Result<Plan> {
    plan_builder::build_plan(statement)
}
