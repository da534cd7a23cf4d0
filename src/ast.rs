use std::fmt::{Display, Formatter};

use crate::value::Value;

/// Parameter name used when a tree is built with the combinator functions
///  rather than parsed from closure text.
pub const ROW: &str = "row";

/// Name of the method that expresses a membership test.
pub const CONTAINS: &str = "contains";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    // Arithmetic can be written in closure text but has no translation
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// A type conversion (`x as f64`); transparent to translation.
    Convert,
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal known when the tree was built, including values captured
    ///  from the caller's scope.
    Constant(Value),
    /// `target.name` where `target` is the closure parameter: a column reference.
    Member {
        target: String,
        name: String,
    },
    Unary(UnaryOp, Box<Expression>),
    Binary(Box<Expression>, BinaryOp, Box<Expression>),
    /// `receiver.method(args)`. Only `contains` with one argument translates.
    MethodCall {
        receiver: Box<Expression>,
        method: String,
        args: Vec<Expression>,
    },
    Lambda {
        param: String,
        body: Box<Expression>,
    },
}

/// A column reference on the row under scan.
pub fn col(name: impl Into<String>) -> Expression {
    Expression::Member {
        target: ROW.to_string(),
        name: name.into(),
    }
}

pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Constant(value.into())
}

pub fn lambda(param: impl Into<String>, body: Expression) -> Expression {
    Expression::Lambda {
        param: param.into(),
        body: Box::new(body),
    }
}

pub fn binary(l: Expression, op: BinaryOp, r: Expression) -> Expression {
    Expression::Binary(Box::new(l), op, Box::new(r))
}

pub fn and(l: Expression, r: Expression) -> Expression {
    binary(l, BinaryOp::And, r)
}

pub fn or(l: Expression, r: Expression) -> Expression {
    binary(l, BinaryOp::Or, r)
}

pub fn cast(expr: Expression) -> Expression {
    Expression::Unary(UnaryOp::Convert, Box::new(expr))
}

/// `values.contains(needle)`, rendered as `needle IN (values)`.
pub fn is_in(needle: Expression, values: impl Into<Value>) -> Expression {
    Expression::MethodCall {
        receiver: Box::new(Expression::Constant(values.into())),
        method: CONTAINS.to_string(),
        args: vec![needle],
    }
}

impl Expression {
    pub fn and(self, other: Expression) -> Expression {
        and(self, other)
    }

    pub fn or(self, other: Expression) -> Expression {
        or(self, other)
    }

    pub fn eq(self, value: impl Into<Value>) -> Expression {
        binary(self, BinaryOp::Eq, lit(value))
    }

    pub fn ne(self, value: impl Into<Value>) -> Expression {
        binary(self, BinaryOp::Ne, lit(value))
    }

    pub fn gt(self, value: impl Into<Value>) -> Expression {
        binary(self, BinaryOp::Gt, lit(value))
    }

    pub fn ge(self, value: impl Into<Value>) -> Expression {
        binary(self, BinaryOp::Ge, lit(value))
    }

    pub fn lt(self, value: impl Into<Value>) -> Expression {
        binary(self, BinaryOp::Lt, lit(value))
    }

    pub fn le(self, value: impl Into<Value>) -> Expression {
        binary(self, BinaryOp::Le, lit(value))
    }

    pub fn is_in(self, values: impl Into<Value>) -> Expression {
        is_in(self, values)
    }

    /// Strips a `Lambda` wrapper, if any.
    pub fn into_body(self) -> Expression {
        match self {
            Expression::Lambda { body, .. } => *body,
            other => other,
        }
    }

    /// Reduces a selector to the column it names, looking through `Lambda`
    ///  and `Convert` wrappers. Returns `None` for anything else.
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Expression::Member { name, .. } => Some(name),
            Expression::Lambda { body, .. } | Expression::Unary(UnaryOp::Convert, body) => {
                body.column_name()
            }
            _ => None,
        }
    }
}

impl From<Value> for Expression {
    fn from(v: Value) -> Self {
        Expression::Constant(v)
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        })
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnaryOp::Convert => "as",
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        })
    }
}

/// Prints the tree back in closure syntax; used in error messages and by the
///  `render_check` tool. The output parses back to the same tree unless it
///  holds a date, a timestamp or a non-finite float, none of which have a
///  closure literal.
impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Constant(v) => write_value(f, v),
            Expression::Member { target, name } => write!(f, "{target}.{name}"),
            Expression::Unary(UnaryOp::Convert, e) => write!(f, "({e} as _)"),
            Expression::Unary(op, e) => write!(f, "({op}{e})"),
            Expression::Binary(l, op, r) => write!(f, "({l} {op} {r})"),
            Expression::MethodCall {
                receiver,
                method,
                args,
            } => {
                write!(f, "{receiver}.{method}(")?;
                let mut first = true;
                for arg in args {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expression::Lambda { param, body } => write!(f, "|{param}| {body}"),
        }
    }
}

fn write_value(f: &mut Formatter<'_>, v: &Value) -> std::fmt::Result {
    match v {
        Value::Null => write!(f, "null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(i) => write!(f, "{i}"),
        // Always with a fraction and never in exponent form, so it reads
        //  back as a float
        Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x}.0"),
        Value::Float(x) => write!(f, "{x}"),
        Value::Text(s) => write!(f, "{s:?}"),
        Value::Date(d) => write!(f, "{d}"),
        Value::DateTime(dt) => write!(f, "{dt}"),
        Value::List(items) => {
            write!(f, "[")?;
            let mut first = true;
            for item in items {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write_value(f, item)?;
            }
            write!(f, "]")
        }
    }
}
