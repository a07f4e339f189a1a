//! Table-valued function sources, e.g. `FROM range(range_start -> 1, range_end -> 5)`

use super::expression_builder::{build_expression, object_name, BINDER_OPERATOR};
use super::{MapPlan, Plan};
use quarry_common::{Error, Result};
use sqlparser::ast as sql;

/// Build the source plan for a function used as a table.
///
/// Every argument becomes one `TableValuedFunctionExpressionPlan`, in
/// argument order. `As` is the column alias the function output is exposed
/// under (`range(...) AS r(n)` gives `n`), empty when none is given.
pub fn build_table_function(
    name: &sql::ObjectName,
    args: &[sql::FunctionArg],
    alias: Option<&sql::TableAlias>,
) -> Result<Plan> {
    let arguments = args
        .iter()
        .map(build_argument)
        .collect::<Result<Vec<_>>>()?;

    let column_alias = alias
        .and_then(|a| a.columns.first())
        .map(|c| c.name.value.clone())
        .unwrap_or_default();

    Ok(Plan::TableValuedFunction {
        alias: column_alias,
        func_name: object_name(name),
        sub_plan: MapPlan::new(arguments),
    })
}

/// Build one argument entry
fn build_argument(arg: &sql::FunctionArg) -> Result<Plan> {
    match arg {
        sql::FunctionArg::Named {
            name,
            arg: sql::FunctionArgExpr::Expr(value),
            ..
        } => Ok(argument(
            String::new(),
            binder(name.value.clone(), build_expression(value)?),
        )),
        sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Expr(expr)) => build_argument_expr(expr),
        _ => Err(invalid(arg)),
    }
}

fn build_argument_expr(expr: &sql::Expr) -> Result<Plan> {
    match expr {
        sql::Expr::BinaryOp {
            left,
            op: sql::BinaryOperator::Arrow,
            right,
        } => match left.as_ref() {
            sql::Expr::Identifier(ident) => Ok(argument(
                String::new(),
                binder(ident.value.clone(), build_expression(right)?),
            )),
            _ => Err(invalid(expr)),
        },

        sql::Expr::Lambda(lambda) => match &lambda.params {
            sql::OneOrManyWithParens::One(param) => Ok(argument(
                String::new(),
                binder(param.value.clone(), build_expression(&lambda.body)?),
            )),
            _ => Err(invalid(expr)),
        },

        // A nested invocation keeps its name; its own arguments follow the
        // same rules, so multi-argument calls are legal here.
        sql::Expr::Function(func) => {
            if func.over.is_some() || func.filter.is_some() {
                return Err(invalid(expr));
            }
            let nested = match &func.args {
                sql::FunctionArguments::None => Vec::new(),
                sql::FunctionArguments::List(arg_list) if arg_list.duplicate_treatment.is_none() => {
                    arg_list
                        .args
                        .iter()
                        .map(build_argument)
                        .collect::<Result<Vec<_>>>()?
                }
                _ => return Err(invalid(expr)),
            };
            Ok(argument(object_name(&func.name), Plan::Map(MapPlan::new(nested))))
        }

        _ => Ok(argument(String::new(), build_expression(expr)?)),
    }
}

fn argument(func_name: String, sub_plan: Plan) -> Plan {
    Plan::TableValuedFunctionExpression {
        func_name,
        sub_plan: Box::new(sub_plan),
    }
}

fn binder(name: String, value: Plan) -> Plan {
    Plan::binary(BINDER_OPERATOR, Plan::variable(name), value)
}

fn invalid(node: &impl std::fmt::Display) -> Error {
    Error::InvalidTableValuedFunctionArgument(node.to_string())
}
