//! Quarry - Logical plans for SQL SELECT statements
//!
//! Quarry turns SQL text into a tree of logical plan nodes:
//! - Scan or table-valued function source
//! - Projection, with SELECT-list aliases resolved in later clauses
//! - Filter and ORDER BY stages
//! - A canonical JSON rendering for inspection and golden tests
//!
//! # Example
//!
//! ```rust
//! use quarry::Planner;
//!
//! let planner = Planner::default();
//!
//! let plan = planner.plan("SELECT max(a) FROM t1 WHERE a > 1").unwrap();
//! assert_eq!(plan.stages().unwrap().len(), 4);
//!
//! let json = planner.explain("SELECT * FROM t1").unwrap();
//! assert!(json.starts_with("{\n    \"Name\": \"SelectPlan\""));
//! ```

pub use quarry_common as common;
pub use quarry_parser as parser;
pub use quarry_planner as planner;

mod config;

pub use config::{PlannerConfig, DIALECT_ENV_VAR};
pub use quarry_common::{Error, Result};
pub use quarry_planner::Plan;

use tracing::debug;

/// Parses SQL text and builds its logical plan
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Planner { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Build the logical plan for a single SELECT statement
    pub fn plan(&self, sql: &str) -> Result<Plan> {
        debug!(dialect = %self.config.parser.dialect, "planning query");

        // Parse
        let statement = parser::parse_statement(sql, &self.config.parser)?;

        // Plan
        planner::create_logical_plan(&statement)
    }

    /// Build the plan and render it in canonical JSON
    pub fn explain(&self, sql: &str) -> Result<String> {
        self.plan(sql)?.to_json()
    }
}
