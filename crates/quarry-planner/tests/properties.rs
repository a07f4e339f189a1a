//! Property-based tests for expression translation and plan rendering.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use quarry_common::Literal;
use quarry_parser::{parse_select, ParserOptions};
use quarry_planner::{build_select, Direction, Plan, SortKey};

const OPERATORS: &[&str] = &[">", "<", "=", "!=", "+", "AND", "OR"];

fn plan(sql: &str) -> Plan {
    let query = parse_select(sql, &ParserOptions::default()).unwrap();
    build_select(&query).unwrap()
}

/// Column names that can never collide with a keyword
fn arb_column() -> impl Strategy<Value = String> {
    "c_[a-z0-9_]{0,8}"
}

/// Strategy for an expression as SQL text paired with the plan it must
/// translate to. Every operand is parenthesized so the tree shape is
/// fixed by the text.
fn arb_expression() -> impl Strategy<Value = (String, Plan)> {
    let leaf = prop_oneof![
        arb_column().prop_map(|name| (name.clone(), Plan::variable(name))),
        (0u32..100_000).prop_map(|n| {
            let text = n.to_string();
            let plan = Plan::constant(Literal::number(&text).unwrap());
            (text, plan)
        }),
    ];

    leaf.prop_recursive(
        4,  // depth
        32, // size
        2,  // items per collection
        |inner| {
            (inner.clone(), prop::sample::select(OPERATORS), inner).prop_map(
                |((left_sql, left), op, (right_sql, right))| {
                    (
                        format!("({}) {} ({})", left_sql, op, right_sql),
                        Plan::binary(op, left, right),
                    )
                },
            )
        },
    )
}

fn filter_of(plan: &Plan) -> &Plan {
    match &plan.stages().unwrap()[2] {
        Plan::Filter { sub_plan } => sub_plan,
        other => panic!("expected a filter stage, got {:?}", other),
    }
}

proptest! {
    #[test]
    fn prop_operator_fidelity((sql, expected) in arb_expression()) {
        let plan = plan(&format!("SELECT * FROM t1 WHERE {}", sql));
        prop_assert_eq!(filter_of(&plan), &expected);
    }

    #[test]
    fn prop_serialization_is_deterministic((sql, _) in arb_expression()) {
        let sql = format!("SELECT {} FROM t1 WHERE {}", sql, sql);
        let first = plan(&sql).to_json().unwrap();
        let second = plan(&sql).to_json().unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_order_by_keeps_keys_in_order(
        keys in prop::collection::vec((arb_column(), any::<bool>()), 1..6)
    ) {
        let clause = keys
            .iter()
            .map(|(name, desc)| format!("{} {}", name, if *desc { "DESC" } else { "ASC" }))
            .collect::<Vec<_>>()
            .join(", ");
        let plan = plan(&format!("SELECT * FROM t1 ORDER BY {}", clause));

        let expected: Vec<SortKey> = keys
            .iter()
            .map(|(name, desc)| SortKey {
                expr: Plan::variable(name.clone()),
                direction: if *desc { Direction::Desc } else { Direction::Asc },
            })
            .collect();
        prop_assert_eq!(&plan.stages().unwrap()[2], &Plan::OrderBy { orders: expected });
    }

    #[test]
    fn prop_binder_arguments(
        args in prop::collection::vec((arb_column(), 0u32..1000), 1..5)
    ) {
        let list = args
            .iter()
            .map(|(name, n)| format!("{} -> {}", name, n))
            .collect::<Vec<_>>()
            .join(", ");
        let plan = plan(&format!("SELECT * FROM range({}) r", list));

        match &plan.stages().unwrap()[0] {
            Plan::TableValuedFunction { sub_plan, .. } => {
                prop_assert_eq!(sub_plan.len(), args.len());
                for (arg, (name, n)) in sub_plan.iter().zip(&args) {
                    let binder = Plan::binary(
                        "->",
                        Plan::variable(name.clone()),
                        Plan::constant(Literal::number(&n.to_string()).unwrap()),
                    );
                    prop_assert_eq!(
                        arg,
                        &Plan::TableValuedFunctionExpression {
                            func_name: String::new(),
                            sub_plan: Box::new(binder),
                        }
                    );
                }
            }
            other => prop_assert!(false, "expected a table function, got {:?}", other),
        }
    }
}
