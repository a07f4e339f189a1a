//! SELECT-list alias resolution
//!
//! Aliases declared in the projection can be referenced by later clauses.
//! A bare reference to an alias is replaced with a copy of the aliased
//! expression, so `WHERE b > 5` over `(id+1) AS b` plans as `(id+1) > 5`.
//!
//! Resolution is single-level: the substituted expression is not itself
//! checked against the alias table again.

use super::{MapPlan, Plan};
use hashbrown::HashMap;
use quarry_common::{Error, Result};

/// Table of alias name to aliased expression for one SELECT
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    aliases: HashMap<String, Plan>,
}

impl AliasResolver {
    pub fn new() -> Self {
        AliasResolver::default()
    }

    /// Collect the aliases declared by the top-level projection list.
    ///
    /// Declaring the same alias twice is an error.
    pub fn from_projection(projection: &MapPlan) -> Result<Self> {
        let mut resolver = AliasResolver::new();
        for plan in projection.iter() {
            if let Plan::AliasedExpression { alias, expr } = plan {
                resolver.declare(alias, expr.as_ref().clone())?;
            }
        }
        Ok(resolver)
    }

    /// Record an alias
    pub fn declare(&mut self, alias: &str, expr: Plan) -> Result<()> {
        if self.aliases.contains_key(alias) {
            return Err(Error::AmbiguousAlias(alias.to_string()));
        }
        self.aliases.insert(alias.to_string(), expr);
        Ok(())
    }

    pub fn get(&self, alias: &str) -> Option<&Plan> {
        self.aliases.get(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Replace every variable that names an alias with the aliased expression
    pub fn resolve(&self, plan: Plan) -> Plan {
        if self.aliases.is_empty() {
            return plan;
        }
        plan.transform_up(&mut |node| match node {
            Plan::Variable { value } => match self.aliases.get(&value) {
                Some(expr) => expr.clone(),
                None => Plan::Variable { value },
            },
            other => other,
        })
    }
}
