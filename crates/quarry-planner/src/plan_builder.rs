//! Plan builder - converts SELECT statements to logical plans
//!
//! The output is always a `SelectPlan` wrapping one pipeline:
//!
//! ```text
//! [Scan | TableValuedFunction, Project, Filter?, OrderBy?, Sink]
//! ```
//!
//! Optional stages appear only when their clause is present. GROUP BY is
//! accepted but has no stage; aggregates show up as `UnaryExpressionPlan`
//! nodes in the projection.

use super::alias_resolver::AliasResolver;
use super::expression_builder::build_expression;
use super::table_function::build_table_function;
use super::{Direction, MapPlan, Plan, SortKey};
use quarry_common::{Error, Result};
use sqlparser::ast as sql;
use tracing::{debug, debug_span, trace};

/// Build a logical plan from a statement
pub fn build_plan(statement: &sql::Statement) -> Result<Plan> {
    match statement {
        sql::Statement::Query(query) => build_select(query),
        other => Err(Error::UnsupportedStatement(other.to_string())),
    }
}

/// Build a plan for SELECT
pub fn build_select(query: &sql::Query) -> Result<Plan> {
    let span = debug_span!("build_select");
    let _guard = span.enter();

    check_query_clauses(query)?;
    let select = match query.body.as_ref() {
        sql::SetExpr::Select(select) => select.as_ref(),
        sql::SetExpr::SetOperation { op, .. } => {
            return Err(Error::UnsupportedClause(op.to_string()));
        }
        other => return Err(Error::UnsupportedStatement(other.to_string())),
    };
    check_select_clauses(select)?;

    let mut stages = Vec::with_capacity(5);

    // Source (FROM clause)
    let source = build_source(&select.from)?;
    trace!(stage = source.name(), "source");
    stages.push(source);

    // Projection; aliases declared here are visible to WHERE and ORDER BY
    let projection = build_projection(&select.projection)?;
    let aliases = AliasResolver::from_projection(&projection)?;
    trace!(items = projection.len(), aliases = aliases.len(), "projection");
    stages.push(Plan::Project {
        sub_plan: projection,
    });

    // WHERE
    if let Some(selection) = &select.selection {
        let predicate = aliases.resolve(build_expression(selection)?);
        trace!("filter");
        stages.push(Plan::Filter {
            sub_plan: Box::new(predicate),
        });
    }

    // ORDER BY
    if let Some(order_by) = &query.order_by {
        let orders = build_order_by(order_by, &aliases)?;
        if !orders.is_empty() {
            trace!(keys = orders.len(), "order by");
            stages.push(Plan::OrderBy { orders });
        }
    }

    stages.push(Plan::Sink);
    debug!(stages = stages.len(), "built select plan");

    Ok(Plan::Select {
        sub_plan: Box::new(Plan::Map(stages.into())),
    })
}

/// Reject query-level clauses that have no stage in the pipeline
fn check_query_clauses(query: &sql::Query) -> Result<()> {
    if query.with.is_some() {
        return Err(Error::UnsupportedClause("WITH".to_string()));
    }
    if query.limit.is_some() || !query.limit_by.is_empty() {
        return Err(Error::UnsupportedClause("LIMIT".to_string()));
    }
    if query.offset.is_some() {
        return Err(Error::UnsupportedClause("OFFSET".to_string()));
    }
    if query.fetch.is_some() {
        return Err(Error::UnsupportedClause("FETCH".to_string()));
    }
    if !query.locks.is_empty() {
        let locks: Vec<_> = query.locks.iter().map(|l| l.to_string()).collect();
        return Err(Error::UnsupportedClause(locks.join(" ")));
    }
    if query.for_clause.is_some() {
        return Err(Error::UnsupportedClause("FOR".to_string()));
    }
    if query.settings.is_some() {
        return Err(Error::UnsupportedClause("SETTINGS".to_string()));
    }
    if query.format_clause.is_some() {
        return Err(Error::UnsupportedClause("FORMAT".to_string()));
    }
    Ok(())
}

/// Reject SELECT-level clauses that have no stage in the pipeline.
///
/// GROUP BY is deliberately not checked: it is accepted and ignored.
fn check_select_clauses(select: &sql::Select) -> Result<()> {
    if select.distinct.is_some() {
        return Err(Error::UnsupportedClause("DISTINCT".to_string()));
    }
    if select.top.is_some() {
        return Err(Error::UnsupportedClause("TOP".to_string()));
    }
    if select.into.is_some() {
        return Err(Error::UnsupportedClause("INTO".to_string()));
    }
    if select.having.is_some() {
        return Err(Error::UnsupportedClause("HAVING".to_string()));
    }
    if select.qualify.is_some() {
        return Err(Error::UnsupportedClause("QUALIFY".to_string()));
    }
    if !select.named_window.is_empty() {
        return Err(Error::UnsupportedClause("WINDOW".to_string()));
    }
    if !select.lateral_views.is_empty() {
        return Err(Error::UnsupportedClause("LATERAL VIEW".to_string()));
    }
    if select.prewhere.is_some() {
        return Err(Error::UnsupportedClause("PREWHERE".to_string()));
    }
    if !select.cluster_by.is_empty() {
        return Err(Error::UnsupportedClause("CLUSTER BY".to_string()));
    }
    if !select.distribute_by.is_empty() {
        return Err(Error::UnsupportedClause("DISTRIBUTE BY".to_string()));
    }
    if !select.sort_by.is_empty() {
        return Err(Error::UnsupportedClause("SORT BY".to_string()));
    }
    if select.connect_by.is_some() {
        return Err(Error::UnsupportedClause("CONNECT BY".to_string()));
    }
    if select.value_table_mode.is_some() {
        return Err(Error::UnsupportedClause("AS STRUCT/VALUE".to_string()));
    }
    Ok(())
}

/// Build the source stage from the FROM clause
fn build_source(from: &[sql::TableWithJoins]) -> Result<Plan> {
    let table = match from {
        [table] => table,
        [] => return Err(Error::UnknownSource("missing FROM clause".to_string())),
        _ => {
            let names: Vec<_> = from.iter().map(|t| t.to_string()).collect();
            return Err(Error::UnknownSource(names.join(", ")));
        }
    };
    if !table.joins.is_empty() {
        return Err(Error::UnsupportedClause("JOIN".to_string()));
    }

    match &table.relation {
        sql::TableFactor::Table {
            name, alias, args, ..
        } => match args {
            Some(table_args) => {
                if table_args.settings.is_some() {
                    return Err(Error::UnsupportedClause(format!("SETTINGS in {}", name)));
                }
                build_table_function(name, &table_args.args, alias.as_ref())
            }
            None => build_scan(name),
        },

        sql::TableFactor::Function {
            name, args, alias, ..
        } => build_table_function(name, args, alias.as_ref()),

        other => Err(Error::UnknownSource(other.to_string())),
    }
}

/// Build a scan of a base table, splitting off an optional schema
fn build_scan(name: &sql::ObjectName) -> Result<Plan> {
    let parts: Vec<_> = name.0.iter().map(|i| i.value.clone()).collect();
    let (schema, table) = match parts.as_slice() {
        [table] => (String::new(), table.clone()),
        [schema, table] => (schema.clone(), table.clone()),
        _ => return Err(Error::UnknownSource(name.to_string())),
    };
    Ok(Plan::Scan { table, schema })
}

/// Build the projected expressions. Wildcards contribute nothing, so a
/// lone `*` gives an empty list; wildcard modifiers such as `EXCLUDE` are
/// rejected.
fn build_projection(items: &[sql::SelectItem]) -> Result<MapPlan> {
    let mut expressions = Vec::with_capacity(items.len());
    for item in items {
        match item {
            sql::SelectItem::UnnamedExpr(expr) => expressions.push(build_expression(expr)?),
            sql::SelectItem::ExprWithAlias { expr, alias } => {
                expressions.push(Plan::aliased(alias.value.clone(), build_expression(expr)?));
            }
            sql::SelectItem::Wildcard(options) | sql::SelectItem::QualifiedWildcard(_, options) => {
                check_wildcard_options(options)?;
            }
        }
    }
    Ok(expressions.into())
}

fn check_wildcard_options(options: &sql::WildcardAdditionalOptions) -> Result<()> {
    let modified = options.opt_ilike.is_some()
        || options.opt_exclude.is_some()
        || options.opt_except.is_some()
        || options.opt_replace.is_some()
        || options.opt_rename.is_some();
    if modified {
        return Err(Error::UnsupportedClause(format!("*{}", options)));
    }
    Ok(())
}

/// Build ORDER BY keys, resolving projection aliases
fn build_order_by(order_by: &sql::OrderBy, aliases: &AliasResolver) -> Result<Vec<SortKey>> {
    if order_by.interpolate.is_some() {
        return Err(Error::UnsupportedClause("INTERPOLATE".to_string()));
    }

    order_by
        .exprs
        .iter()
        .map(|order| {
            if order.nulls_first.is_some() {
                return Err(Error::UnsupportedClause(format!("NULLS FIRST/LAST in {}", order)));
            }
            if order.with_fill.is_some() {
                return Err(Error::UnsupportedClause(format!("WITH FILL in {}", order)));
            }
            let direction = match order.asc {
                Some(false) => Direction::Desc,
                _ => Direction::Asc,
            };
            Ok(SortKey {
                expr: aliases.resolve(build_expression(&order.expr)?),
                direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_common::Literal;
    use quarry_parser::{parse_select, parse_statement, ParserOptions};

    fn build(sql: &str) -> Result<Plan> {
        let query = parse_select(sql, &ParserOptions::default()).unwrap();
        build_select(&query)
    }

    fn stage_names(plan: &Plan) -> Vec<&'static str> {
        plan.stages().unwrap().iter().map(|s| s.name()).collect()
    }

    fn num(text: &str) -> Plan {
        Plan::constant(Literal::number(text).unwrap())
    }

    #[test]
    fn test_minimal_pipeline() {
        let plan = build("SELECT * FROM t1").unwrap();
        assert_eq!(stage_names(&plan), vec!["ScanPlan", "ProjectPlan", "SinkPlan"]);
        assert_eq!(
            plan.stages().unwrap()[1],
            Plan::Project {
                sub_plan: MapPlan::default()
            }
        );
    }

    #[test]
    fn test_full_pipeline_order() {
        let plan = build("SELECT a FROM t1 WHERE a > 1 ORDER BY a").unwrap();
        assert_eq!(
            stage_names(&plan),
            vec!["ScanPlan", "ProjectPlan", "FilterPlan", "OrderByPlan", "SinkPlan"]
        );

        let plan = build("SELECT a FROM t1 ORDER BY a").unwrap();
        assert_eq!(
            stage_names(&plan),
            vec!["ScanPlan", "ProjectPlan", "OrderByPlan", "SinkPlan"]
        );
    }

    #[test]
    fn test_schema_qualified_scan() {
        let plan = build("SELECT * FROM s1.t1").unwrap();
        assert_eq!(
            plan.stages().unwrap()[0],
            Plan::Scan {
                table: "t1".to_string(),
                schema: "s1".to_string()
            }
        );
        assert!(matches!(
            build("SELECT * FROM db.s1.t1"),
            Err(Error::UnknownSource(_))
        ));
    }

    #[test]
    fn test_table_alias_is_not_recorded() {
        let plan = build("SELECT * FROM t1 AS x").unwrap();
        assert_eq!(
            plan.stages().unwrap()[0],
            Plan::Scan {
                table: "t1".to_string(),
                schema: String::new()
            }
        );
    }

    #[test]
    fn test_table_function_source() {
        let plan = build("SELECT * FROM range(range_start -> 1) r WHERE x > 1").unwrap();
        assert_eq!(
            stage_names(&plan),
            vec!["TableValuedFunctionPlan", "ProjectPlan", "FilterPlan", "SinkPlan"]
        );
    }

    #[test]
    fn test_wildcard_mixed_with_columns() {
        let plan = build("SELECT *, a FROM t1").unwrap();
        assert_eq!(
            plan.stages().unwrap()[1],
            Plan::Project {
                sub_plan: MapPlan::new(vec![Plan::variable("a")])
            }
        );
    }

    #[test]
    fn test_alias_resolution_in_order_by() {
        let plan = build("SELECT a + 1 AS b FROM t1 ORDER BY b DESC").unwrap();
        assert_eq!(
            plan.stages().unwrap()[2],
            Plan::OrderBy {
                orders: vec![SortKey {
                    expr: Plan::binary("+", Plan::variable("a"), num("1")),
                    direction: Direction::Desc,
                }]
            }
        );
    }

    #[test]
    fn test_default_direction_is_asc() {
        let plan = build("SELECT * FROM t1 ORDER BY a").unwrap();
        match &plan.stages().unwrap()[2] {
            Plan::OrderBy { orders } => assert_eq!(orders[0].direction, Direction::Asc),
            other => panic!("unexpected stage: {:?}", other),
        }
    }

    #[test]
    fn test_group_by_is_ignored() {
        let with_group = build("SELECT max(a), b FROM t1 GROUP BY b").unwrap();
        let without_group = build("SELECT max(a), b FROM t1").unwrap();
        assert_eq!(with_group, without_group);
    }

    #[test]
    fn test_alias_lookup_is_case_sensitive() {
        let plan = build("SELECT (id+1) AS B FROM t1 WHERE b > 5").unwrap();
        assert_eq!(
            plan.stages().unwrap()[2],
            Plan::Filter {
                sub_plan: Box::new(Plan::binary(">", Plan::variable("b"), num("5")))
            }
        );

        let plan = build("SELECT (id+1) AS B FROM t1 WHERE B > 5").unwrap();
        assert_eq!(
            plan.stages().unwrap()[2],
            Plan::Filter {
                sub_plan: Box::new(Plan::binary(
                    ">",
                    Plan::binary("+", Plan::variable("id"), num("1")),
                    num("5")
                ))
            }
        );
    }

    #[test]
    fn test_duplicate_alias() {
        assert_eq!(
            build("SELECT a AS x, b AS x FROM t1").unwrap_err(),
            Error::AmbiguousAlias("x".to_string())
        );
    }

    #[test]
    fn test_unsupported_projection() {
        assert!(matches!(
            build("SELECT CASE WHEN a THEN 1 END FROM t1"),
            Err(Error::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn test_unknown_sources() {
        assert!(matches!(build("SELECT 1"), Err(Error::UnknownSource(_))));
        assert!(matches!(
            build("SELECT * FROM t1, t2"),
            Err(Error::UnknownSource(_))
        ));
        assert!(matches!(
            build("SELECT * FROM (SELECT * FROM t1) sub"),
            Err(Error::UnknownSource(_))
        ));
    }

    #[test]
    fn test_unsupported_clauses() {
        for sql in [
            "SELECT * FROM t1 JOIN t2 ON t1.a = t2.a",
            "SELECT DISTINCT a FROM t1",
            "SELECT a FROM t1 GROUP BY a HAVING a > 1",
            "SELECT * FROM t1 LIMIT 10",
            "SELECT * FROM t1 ORDER BY a NULLS FIRST",
            "SELECT * FROM t1 UNION SELECT * FROM t2",
            "WITH c AS (SELECT * FROM t1) SELECT * FROM c",
            "SELECT a FROM t1 WINDOW w AS (PARTITION BY a)",
            "SELECT * FROM t1 FOR UPDATE",
            "SELECT * EXCLUDE (a) FROM t1",
            "SELECT t1.* EXCLUDE (a) FROM t1",
        ] {
            assert!(
                matches!(build(sql), Err(Error::UnsupportedClause(_))),
                "{} should be rejected",
                sql
            );
        }
    }

    #[test]
    fn test_build_plan_rejects_non_select() {
        let stmt = parse_statement("DELETE FROM t1", &ParserOptions::default()).unwrap();
        assert!(matches!(
            build_plan(&stmt),
            Err(Error::UnsupportedStatement(_))
        ));
    }
}
