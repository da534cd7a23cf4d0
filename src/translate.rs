use crate::{
    ast::{BinaryOp, CONTAINS, Expression, UnaryOp},
    to_sql::{Printer, RenderConfig, SqlWriter, Statement, ToSQL},
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A literal has no SQL form (null, an empty or nested collection).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A node kind or operator outside the translatable set.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
    #[error("no predicate was supplied")]
    MissingPredicate,
    /// A selector that doesn't reduce to a single column reference.
    #[error("selector must name a single column, got `{0}`")]
    InvalidSelector(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl ToSQL for BinaryOp {
    fn to_sql(&self, out: &mut SqlWriter) -> Result<()> {
        out.push_str(match self {
            BinaryOp::And => " AND ",
            BinaryOp::Or => " OR ",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            op @ (BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div) => {
                return Err(Error::UnsupportedExpression(format!(
                    "binary operator `{op}`"
                )));
            }
        });
        Ok(())
    }
}

impl ToSQL for Expression {
    fn to_sql(&self, out: &mut SqlWriter) -> Result<()> {
        match self {
            Expression::Constant(v) => out.push_literal(v),
            // Column references are emitted verbatim: no quoting, no qualification
            Expression::Member { name, .. } => {
                out.push_str(name);
                Ok(())
            }
            Expression::Unary(UnaryOp::Convert, operand) => operand.to_sql(out),
            Expression::Unary(op @ (UnaryOp::Not | UnaryOp::Neg), operand) => Err(
                Error::UnsupportedExpression(format!("unary operator `{op}` in `{operand}`")),
            ),
            // Every binary node is parenthesized so nesting never depends on
            //  operator precedence.
            Expression::Binary(l, op, r) => {
                out.push('(');
                l.to_sql(out)?;
                op.to_sql(out)?;
                r.to_sql(out)?;
                out.push(')');
                Ok(())
            }
            Expression::MethodCall {
                receiver,
                method,
                args,
            } => match args.as_slice() {
                [needle] if method == CONTAINS => {
                    out.push('(');
                    needle.to_sql(out)?;
                    out.push_str(" IN (");
                    receiver.to_sql(out)?;
                    out.push_str("))");
                    Ok(())
                }
                _ => Err(Error::UnsupportedExpression(format!(
                    "method call `{self}`"
                ))),
            },
            Expression::Lambda { body, .. } => body.to_sql(out),
        }
    }
}

/// Translates an expression with literals formatted inline.
pub fn translate(expr: &Expression) -> Result<String> {
    translate_with(expr, &RenderConfig::default()).map(|stmt| stmt.sql)
}

pub fn translate_with(expr: &Expression, config: &RenderConfig) -> Result<Statement> {
    Printer::new(expr, config.clone()).render()
}

/// Reduces a selector to its column name.
pub fn column_name(selector: &Expression) -> Result<&str> {
    selector
        .column_name()
        .ok_or_else(|| Error::InvalidSelector(selector.to_string()))
}
