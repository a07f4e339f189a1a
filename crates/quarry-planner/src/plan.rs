//! Plan nodes for SELECT queries
//!
//! Every node is a variant of the closed [`Plan`] enum. Serialization writes
//! the variant tag as a leading `Name` field followed by the variant's fields
//! in declaration order; that layout is what golden tests compare against.

use super::json;
use quarry_common::{Literal, Result};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// An ordered list of plans.
///
/// Used both as the top-level pipeline of a SELECT and as the list of
/// projected expressions or function arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapPlan {
    pub sub_plans: Vec<Plan>,
}

impl MapPlan {
    pub fn new(sub_plans: Vec<Plan>) -> Self {
        MapPlan { sub_plans }
    }

    pub fn is_empty(&self) -> bool {
        self.sub_plans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sub_plans.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Plan> {
        self.sub_plans.iter()
    }

    fn transform_up<F: FnMut(Plan) -> Plan>(self, f: &mut F) -> MapPlan {
        MapPlan {
            sub_plans: self
                .sub_plans
                .into_iter()
                .map(|plan| plan.transform_up(f))
                .collect(),
        }
    }
}

impl From<Vec<Plan>> for MapPlan {
    fn from(sub_plans: Vec<Plan>) -> Self {
        MapPlan { sub_plans }
    }
}

/// Sort direction of an ORDER BY key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: Plan,
    pub direction: Direction,
}

/// A node in a logical plan tree
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Root of a SELECT statement
    Select { sub_plan: Box<Plan> },

    /// Ordered container of plans
    Map(MapPlan),

    /// Read from a base table. `schema` is empty when unqualified.
    Scan { table: String, schema: String },

    /// Projection stage. An empty list means all columns, unexpanded.
    Project { sub_plan: MapPlan },

    /// Selection predicate stage
    Filter { sub_plan: Box<Plan> },

    /// Sort stage
    OrderBy { orders: Vec<SortKey> },

    /// A function used as the source relation
    TableValuedFunction {
        alias: String,
        func_name: String,
        sub_plan: MapPlan,
    },

    /// One argument of a table-valued function
    TableValuedFunctionExpression {
        func_name: String,
        sub_plan: Box<Plan>,
    },

    /// A projected expression with an output name
    AliasedExpression { alias: String, expr: Box<Plan> },

    /// Binary operator application
    BinaryExpression {
        func_name: String,
        left: Box<Plan>,
        right: Box<Plan>,
    },

    /// Aggregate or single-argument function application
    UnaryExpression { func_name: String, expr: Box<Plan> },

    /// Column reference
    Variable { value: String },

    /// Literal value
    Constant { value: Literal },

    /// End of the output pipeline
    Sink,
}

impl Plan {
    pub fn variable(value: impl Into<String>) -> Self {
        Plan::Variable {
            value: value.into(),
        }
    }

    pub fn constant(value: Literal) -> Self {
        Plan::Constant { value }
    }

    pub fn binary(func_name: impl Into<String>, left: Plan, right: Plan) -> Self {
        Plan::BinaryExpression {
            func_name: func_name.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(func_name: impl Into<String>, expr: Plan) -> Self {
        Plan::UnaryExpression {
            func_name: func_name.into(),
            expr: Box::new(expr),
        }
    }

    pub fn aliased(alias: impl Into<String>, expr: Plan) -> Self {
        Plan::AliasedExpression {
            alias: alias.into(),
            expr: Box::new(expr),
        }
    }

    /// The variant tag written as the `Name` field
    pub fn name(&self) -> &'static str {
        match self {
            Plan::Select { .. } => "SelectPlan",
            Plan::Map(_) => "MapPlan",
            Plan::Scan { .. } => "ScanPlan",
            Plan::Project { .. } => "ProjectPlan",
            Plan::Filter { .. } => "FilterPlan",
            Plan::OrderBy { .. } => "OrderByPlan",
            Plan::TableValuedFunction { .. } => "TableValuedFunctionPlan",
            Plan::TableValuedFunctionExpression { .. } => "TableValuedFunctionExpressionPlan",
            Plan::AliasedExpression { .. } => "AliasedExpressionPlan",
            Plan::BinaryExpression { .. } => "BinaryExpressionPlan",
            Plan::UnaryExpression { .. } => "UnaryExpressionPlan",
            Plan::Variable { .. } => "VariablePlan",
            Plan::Constant { .. } => "ConstantPlan",
            Plan::Sink => "SinkPlan",
        }
    }

    /// Direct children, in serialization order
    pub fn children(&self) -> Vec<&Plan> {
        match self {
            Plan::Select { sub_plan }
            | Plan::Filter { sub_plan }
            | Plan::TableValuedFunctionExpression { sub_plan, .. } => vec![sub_plan.as_ref()],
            Plan::Map(map)
            | Plan::Project { sub_plan: map }
            | Plan::TableValuedFunction { sub_plan: map, .. } => map.iter().collect(),
            Plan::OrderBy { orders } => orders.iter().map(|key| &key.expr).collect(),
            Plan::AliasedExpression { expr, .. } | Plan::UnaryExpression { expr, .. } => {
                vec![expr.as_ref()]
            }
            Plan::BinaryExpression { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Plan::Scan { .. } | Plan::Variable { .. } | Plan::Constant { .. } | Plan::Sink => {
                vec![]
            }
        }
    }

    /// Visit every node of the tree in pre-order
    pub fn walk<F: FnMut(&Plan)>(&self, f: &mut F) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Rebuild the tree bottom-up, applying `f` to every node after its
    /// children have been rebuilt. A node returned by `f` is not revisited.
    pub fn transform_up<F: FnMut(Plan) -> Plan>(self, f: &mut F) -> Plan {
        let rebuilt = match self {
            Plan::Select { sub_plan } => Plan::Select {
                sub_plan: Box::new(sub_plan.transform_up(f)),
            },
            Plan::Map(map) => Plan::Map(map.transform_up(f)),
            Plan::Project { sub_plan } => Plan::Project {
                sub_plan: sub_plan.transform_up(f),
            },
            Plan::Filter { sub_plan } => Plan::Filter {
                sub_plan: Box::new(sub_plan.transform_up(f)),
            },
            Plan::OrderBy { orders } => Plan::OrderBy {
                orders: orders
                    .into_iter()
                    .map(|key| SortKey {
                        expr: key.expr.transform_up(f),
                        direction: key.direction,
                    })
                    .collect(),
            },
            Plan::TableValuedFunction {
                alias,
                func_name,
                sub_plan,
            } => Plan::TableValuedFunction {
                alias,
                func_name,
                sub_plan: sub_plan.transform_up(f),
            },
            Plan::TableValuedFunctionExpression {
                func_name,
                sub_plan,
            } => Plan::TableValuedFunctionExpression {
                func_name,
                sub_plan: Box::new(sub_plan.transform_up(f)),
            },
            Plan::AliasedExpression { alias, expr } => Plan::AliasedExpression {
                alias,
                expr: Box::new(expr.transform_up(f)),
            },
            Plan::BinaryExpression {
                func_name,
                left,
                right,
            } => Plan::BinaryExpression {
                func_name,
                left: Box::new(left.transform_up(f)),
                right: Box::new(right.transform_up(f)),
            },
            Plan::UnaryExpression { func_name, expr } => Plan::UnaryExpression {
                func_name,
                expr: Box::new(expr.transform_up(f)),
            },
            leaf @ (Plan::Scan { .. } | Plan::Variable { .. } | Plan::Constant { .. } | Plan::Sink) => {
                leaf
            }
        };
        f(rebuilt)
    }

    /// The top-level pipeline stages of a SELECT plan
    pub fn stages(&self) -> Option<&[Plan]> {
        match self {
            Plan::Select { sub_plan } => match sub_plan.as_ref() {
                Plan::Map(map) => Some(&map.sub_plans),
                _ => None,
            },
            _ => None,
        }
    }

    /// Render the canonical serialization
    pub fn to_json(&self) -> Result<String> {
        json::to_string(self)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl Serialize for MapPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.sub_plans.is_empty() { 1 } else { 2 };
        let mut state = serializer.serialize_struct("MapPlan", len)?;
        state.serialize_field("Name", "MapPlan")?;
        if self.sub_plans.is_empty() {
            state.skip_field("SubPlans")?;
        } else {
            state.serialize_field("SubPlans", &self.sub_plans)?;
        }
        state.end()
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Order", 2)?;
        state.serialize_field("Expression", &self.expr)?;
        state.serialize_field("Direction", self.direction.as_str())?;
        state.end()
    }
}

impl Serialize for Plan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let name = self.name();
        match self {
            Plan::Map(map) => map.serialize(serializer),
            Plan::Select { sub_plan } | Plan::Filter { sub_plan } => {
                let mut state = serializer.serialize_struct(name, 2)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("SubPlan", sub_plan)?;
                state.end()
            }
            Plan::Scan { table, schema } => {
                let mut state = serializer.serialize_struct(name, 3)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("Table", table)?;
                state.serialize_field("Schema", schema)?;
                state.end()
            }
            Plan::Project { sub_plan } => {
                let mut state = serializer.serialize_struct(name, 2)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("SubPlan", sub_plan)?;
                state.end()
            }
            Plan::OrderBy { orders } => {
                let mut state = serializer.serialize_struct(name, 2)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("Orders", orders)?;
                state.end()
            }
            Plan::TableValuedFunction {
                alias,
                func_name,
                sub_plan,
            } => {
                let mut state = serializer.serialize_struct(name, 4)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("As", alias)?;
                state.serialize_field("FuncName", func_name)?;
                state.serialize_field("SubPlan", sub_plan)?;
                state.end()
            }
            Plan::TableValuedFunctionExpression {
                func_name,
                sub_plan,
            } => {
                let mut state = serializer.serialize_struct(name, 3)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("FuncName", func_name)?;
                state.serialize_field("SubPlan", sub_plan)?;
                state.end()
            }
            Plan::AliasedExpression { alias, expr } => {
                let mut state = serializer.serialize_struct(name, 3)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("As", alias)?;
                state.serialize_field("Expr", expr)?;
                state.end()
            }
            Plan::BinaryExpression {
                func_name,
                left,
                right,
            } => {
                let mut state = serializer.serialize_struct(name, 4)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("FuncName", func_name)?;
                state.serialize_field("Left", left)?;
                state.serialize_field("Right", right)?;
                state.end()
            }
            Plan::UnaryExpression { func_name, expr } => {
                let mut state = serializer.serialize_struct(name, 3)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("FuncName", func_name)?;
                state.serialize_field("Expr", expr)?;
                state.end()
            }
            Plan::Variable { value } => {
                let mut state = serializer.serialize_struct(name, 2)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("Value", value)?;
                state.end()
            }
            Plan::Constant { value } => {
                let mut state = serializer.serialize_struct(name, 2)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("Value", value)?;
                state.end()
            }
            Plan::Sink => {
                let mut state = serializer.serialize_struct(name, 1)?;
                state.serialize_field("Name", name)?;
                state.end()
            }
        }
    }
}
