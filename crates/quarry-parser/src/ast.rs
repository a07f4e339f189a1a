//! Re-export of the sqlparser AST the planner consumes.

pub use sqlparser::ast::*;
