//! Expression translation - converts AST expressions to expression plans

use super::Plan;
use quarry_common::{Error, Literal, Result};
use sqlparser::ast as sql;

/// Operator name of the named-argument binder `name -> value`
pub const BINDER_OPERATOR: &str = "->";

/// Build an expression plan from an AST expression
pub fn build_expression(expr: &sql::Expr) -> Result<Plan> {
    match expr {
        // Column references
        sql::Expr::Identifier(ident) => Ok(Plan::variable(ident.value.clone())),

        sql::Expr::CompoundIdentifier(idents) => Ok(Plan::variable(
            idents
                .iter()
                .map(|i| i.value.as_str())
                .collect::<Vec<_>>()
                .join("."),
        )),

        // Literals
        sql::Expr::Value(value) => build_literal(value).map(Plan::constant),

        // Parentheses only group; the AST already encodes precedence
        sql::Expr::Nested(inner) => build_expression(inner),

        sql::Expr::BinaryOp { left, op, right } => {
            let func_name = binary_operator_name(op).ok_or_else(|| unsupported(expr))?;
            Ok(Plan::binary(
                func_name,
                build_expression(left)?,
                build_expression(right)?,
            ))
        }

        // Signed numeric literals: fold the sign into the written form
        sql::Expr::UnaryOp { op, expr: operand } => match (op, operand.as_ref()) {
            (sql::UnaryOperator::Minus, sql::Expr::Value(sql::Value::Number(n, _))) => {
                Literal::number(n)?.negate().map(Plan::constant)
            }
            (sql::UnaryOperator::Plus, sql::Expr::Value(sql::Value::Number(n, _))) => {
                Literal::number(n).map(Plan::constant)
            }
            _ => Err(unsupported(expr)),
        },

        sql::Expr::Function(func) => build_function(func),

        // `name -> value` parsed as a lambda by dialects that have them
        sql::Expr::Lambda(lambda) => match &lambda.params {
            sql::OneOrManyWithParens::One(param) => Ok(Plan::binary(
                BINDER_OPERATOR,
                Plan::variable(param.value.clone()),
                build_expression(&lambda.body)?,
            )),
            _ => Err(unsupported(expr)),
        },

        _ => Err(unsupported(expr)),
    }
}

/// Build a literal from an AST value
pub fn build_literal(value: &sql::Value) -> Result<Literal> {
    match value {
        sql::Value::Number(n, _) => Literal::number(n),
        sql::Value::SingleQuotedString(s)
        | sql::Value::DoubleQuotedString(s)
        | sql::Value::NationalStringLiteral(s)
        | sql::Value::EscapedStringLiteral(s) => Ok(Literal::string(s.clone())),
        _ => Err(Error::UnsupportedExpression(format!("literal {}", value))),
    }
}

/// Map an AST binary operator to the name recorded on the plan.
///
/// Logical operators are uppercased words; everything else keeps its symbol.
pub fn binary_operator_name(op: &sql::BinaryOperator) -> Option<&'static str> {
    let name = match op {
        sql::BinaryOperator::And => "AND",
        sql::BinaryOperator::Or => "OR",
        sql::BinaryOperator::Plus => "+",
        sql::BinaryOperator::Minus => "-",
        sql::BinaryOperator::Multiply => "*",
        sql::BinaryOperator::Divide => "/",
        sql::BinaryOperator::Modulo => "%",
        sql::BinaryOperator::Gt => ">",
        sql::BinaryOperator::Lt => "<",
        sql::BinaryOperator::GtEq => ">=",
        sql::BinaryOperator::LtEq => "<=",
        sql::BinaryOperator::Eq => "=",
        // `<>` and `!=` tokenize the same way
        sql::BinaryOperator::NotEq => "!=",
        sql::BinaryOperator::Arrow => BINDER_OPERATOR,
        _ => return None,
    };
    Some(name)
}

/// Build a plan for a scalar or aggregate function call.
///
/// Only single-argument calls have a plan node outside of a table-valued
/// function; they become `UnaryExpressionPlan` with the uppercased name.
fn build_function(func: &sql::Function) -> Result<Plan> {
    let unsupported = || Error::UnsupportedExpression(func.to_string());

    if func.over.is_some() || func.filter.is_some() || !func.within_group.is_empty() {
        return Err(unsupported());
    }
    if !matches!(func.parameters, sql::FunctionArguments::None) {
        return Err(unsupported());
    }

    let arg_list = match &func.args {
        sql::FunctionArguments::List(arg_list) => arg_list,
        _ => return Err(unsupported()),
    };
    if arg_list.duplicate_treatment.is_some() || !arg_list.clauses.is_empty() {
        return Err(unsupported());
    }

    match arg_list.args.as_slice() {
        [sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Expr(arg))] => Ok(Plan::unary(
            object_name(&func.name).to_uppercase(),
            build_expression(arg)?,
        )),
        _ => Err(unsupported()),
    }
}

/// The unquoted text of a possibly qualified name, parts joined with `.`
pub fn object_name(name: &sql::ObjectName) -> String {
    name.0
        .iter()
        .map(|ident| ident.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

fn unsupported(expr: &sql::Expr) -> Error {
    Error::UnsupportedExpression(expr.to_string())
}
