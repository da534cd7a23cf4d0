//! Parses predicate and selector text written as a Rust-like closure:
//!
//! `|o| o.amount > 100 && (o.status == "open" || ids.contains(o.id))`
//!
//! `o.field` names a column. Any other bare identifier is looked up in the
//!  caller's [Bindings] and replaced by its value, so the resulting tree only
//!  ever holds constants and column references.

use std::collections::HashMap;

use crate::{
    ast::{BinaryOp, Expression, UnaryOp},
    lex::{Error as LexerError, Lexer, Token, TokenType},
    value::Value,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Returned when the input is empty (or just whitespace)
    #[error("Empty input")]
    NoExpression,
    #[error("Lexical error: {0}")]
    Lexical(#[from] LexerError),
    #[error("Missing closing parenthesis")]
    MissingCloseParen,
    #[error("Missing closing bracket")]
    MissingCloseBracket,
    #[error("Unexpected token, got {0:?}")]
    UnexpectedToken(Token),
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Expected a closure parameter list like `|row|`")]
    MissingParameter,
    #[error("Unknown name '{0}'")]
    UnknownBinding(String),
    #[error("List elements must be literals or bound values")]
    NonConstantListElement,
    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),
    /// Parentheses, brackets, prefix operators or call arguments nested
    ///  deeper than [MAX_DEPTH]
    #[error("Expression is nested too deeply")]
    TooDeep,
}

/// How deeply sub-expressions may nest. Parsing and translation both recurse
///  once per level.
pub const MAX_DEPTH: usize = 128;

/// Values visible to closure text by name.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

struct Scope<'a, 'input> {
    param: &'input str,
    bindings: &'a Bindings,
}

/// Parses closure text into a [Expression::Lambda].
pub fn parse(input: &str, bindings: &Bindings) -> Result<Expression, Error> {
    let mut lexer = Lexer::new(input.as_bytes());

    // |param|
    let Some(open) = lexer.next_token()? else {
        return Err(Error::NoExpression);
    };
    if open.ty != TokenType::Pipe {
        return Err(Error::MissingParameter);
    }
    let param = match lexer.next_token()? {
        Some(tok) if tok.ty == TokenType::Identifier => text(&lexer, &tok)?,
        _ => return Err(Error::MissingParameter),
    };
    if !lexer.consume(TokenType::Pipe)? {
        return Err(Error::MissingParameter);
    }

    let scope = Scope { param, bindings };
    let body = parse_binary_op(&mut lexer, &scope, 0, 0)?;

    // Make sure we've completely parsed the input
    if let Some(tok) = lexer.next_token()? {
        return Err(Error::UnexpectedToken(tok));
    }

    tracing::trace!(input, "parsed closure");
    Ok(Expression::Lambda {
        param: param.to_string(),
        body: Box::new(body),
    })
}

fn parse_binary_op<'input>(
    lexer: &mut Lexer<'input>,
    scope: &Scope<'_, 'input>,
    min_binding_power: u8,
    depth: usize,
) -> Result<Expression, Error> {
    if depth > MAX_DEPTH {
        return Err(Error::TooDeep);
    }
    let lhs = lexer.next_token()?.ok_or(Error::UnexpectedEof)?;
    let mut lhs = match lhs.ty {
        // Open paren: parse the internal expression and expect a closing paren
        TokenType::ParenLeft => {
            let inner = parse_binary_op(lexer, scope, 0, depth + 1)?;
            if !lexer.consume(TokenType::ParenRight)? {
                return Err(Error::MissingCloseParen);
            }
            inner
        }
        TokenType::BracketLeft => parse_list(lexer, scope, depth + 1)?,

        // Prefix '!' or '-'
        TokenType::Bang | TokenType::Minus => {
            let ((), pow) = prefix_binding();
            let operand = parse_binary_op(lexer, scope, pow, depth + 1)?;
            match (lhs.ty, operand) {
                // Negative numbers are literals, not operations
                (TokenType::Minus, Expression::Constant(Value::Int(i))) => match i.checked_neg() {
                    Some(negated) => Expression::Constant(Value::Int(negated)),
                    // i64::MIN has no positive counterpart
                    None => Expression::Unary(
                        UnaryOp::Neg,
                        Box::new(Expression::Constant(Value::Int(i))),
                    ),
                },
                (TokenType::Minus, Expression::Constant(Value::Float(f))) => {
                    Expression::Constant(Value::Float(-f))
                }
                (TokenType::Minus, operand) => Expression::Unary(UnaryOp::Neg, Box::new(operand)),
                (_, operand) => Expression::Unary(UnaryOp::Not, Box::new(operand)),
            }
        }

        // Numbers, strings, booleans and null
        _ if is_literal(&lhs) => Expression::Constant(parse_literal(lexer, &lhs)?),

        // Either `param.field` or a bound name
        TokenType::Identifier => parse_name(lexer, scope, &lhs)?,

        _ => return Err(Error::UnexpectedToken(lhs)),
    };

    // now that we have our left side, expect a series of operators or EOF
    loop {
        let op_tok = match lexer.peek_token()? {
            None => break,
            Some(op) => op,
        };

        match op_tok.ty {
            // `.method(args)` binds tighter than anything else
            TokenType::Dot => {
                if POSTFIX_BINDING < min_binding_power {
                    break;
                }
                _ = lexer.next_token()?;
                lhs = parse_method_call(lexer, scope, lhs, depth)?;
            }
            // `expr as Type`, the type itself is irrelevant to translation
            TokenType::As => {
                if CAST_BINDING < min_binding_power {
                    break;
                }
                _ = lexer.next_token()?;
                let ty = lexer.next_token()?.ok_or(Error::UnexpectedEof)?;
                if ty.ty != TokenType::Identifier {
                    return Err(Error::UnexpectedToken(ty));
                }
                lhs = Expression::Unary(UnaryOp::Convert, Box::new(lhs));
            }
            _ => {
                let Some((l_pow, r_pow)) = infix_binding(op_tok.ty) else {
                    break;
                };
                if l_pow < min_binding_power {
                    break;
                }
                let op = binary_op(&op_tok)?;

                // Consume the operator token
                _ = lexer.next_token()?;

                let rhs = parse_binary_op(lexer, scope, r_pow, depth + 1)?;
                lhs = Expression::Binary(Box::new(lhs), op, Box::new(rhs));
            }
        }
    }

    Ok(lhs)
}

fn is_literal(token: &Token) -> bool {
    matches!(
        token.ty,
        TokenType::Number
            | TokenType::StringSingleQuote
            | TokenType::StringDoubleQuote
            | TokenType::True
            | TokenType::False
            | TokenType::Null
    )
}

fn parse_literal(lexer: &Lexer<'_>, token: &Token) -> Result<Value, Error> {
    match token.ty {
        TokenType::True => Ok(Value::Bool(true)),
        TokenType::False => Ok(Value::Bool(false)),
        TokenType::Null => Ok(Value::Null),
        TokenType::Number => {
            let digits = text(lexer, token)?.replace('_', "");
            let parsed = if digits.contains('.') {
                digits.parse().map(Value::Float).ok()
            } else {
                digits.parse().map(Value::Int).ok()
            };
            parsed.ok_or(Error::InvalidNumber(digits))
        }
        TokenType::StringSingleQuote | TokenType::StringDoubleQuote => {
            Ok(Value::Text(unescape(text(lexer, token)?)))
        }
        _ => Err(Error::UnexpectedToken(token.clone())),
    }
}

// Handles `param.field` and bound names
fn parse_name<'input>(
    lexer: &mut Lexer<'input>,
    scope: &Scope<'_, 'input>,
    token: &Token,
) -> Result<Expression, Error> {
    let name = text(lexer, token)?;
    if name != scope.param {
        return scope
            .bindings
            .get(name)
            .map(|v| Expression::Constant(v.clone()))
            .ok_or_else(|| Error::UnknownBinding(name.to_string()));
    }

    // The parameter itself is only meaningful as the target of a field access
    let dot = lexer.next_token()?.ok_or(Error::UnexpectedEof)?;
    if dot.ty != TokenType::Dot {
        return Err(Error::UnexpectedToken(dot));
    }
    let field = lexer.next_token()?.ok_or(Error::UnexpectedEof)?;
    if field.ty != TokenType::Identifier {
        return Err(Error::UnexpectedToken(field));
    }
    Ok(Expression::Member {
        target: name.to_string(),
        name: text(lexer, &field)?.to_string(),
    })
}

// The leading `.` has already been consumed
fn parse_method_call<'input>(
    lexer: &mut Lexer<'input>,
    scope: &Scope<'_, 'input>,
    receiver: Expression,
    depth: usize,
) -> Result<Expression, Error> {
    let name = lexer.next_token()?.ok_or(Error::UnexpectedEof)?;
    if name.ty != TokenType::Identifier {
        return Err(Error::UnexpectedToken(name));
    }
    if !lexer.consume(TokenType::ParenLeft)? {
        return match lexer.peek_token()? {
            Some(tok) => Err(Error::UnexpectedToken(tok)),
            None => Err(Error::UnexpectedEof),
        };
    }

    // Zero or more arguments, trailing comma allowed
    let mut args = Vec::new();
    loop {
        if lexer.consume(TokenType::ParenRight)? {
            break;
        }
        args.push(parse_binary_op(lexer, scope, 0, depth + 1)?);
        if lexer.consume(TokenType::Comma)? {
            continue;
        }
        if lexer.consume(TokenType::ParenRight)? {
            break;
        }
        return Err(Error::MissingCloseParen);
    }

    Ok(Expression::MethodCall {
        receiver: Box::new(receiver),
        method: text(lexer, &name)?.to_string(),
        args,
    })
}

// The leading `[` has already been consumed
fn parse_list<'input>(
    lexer: &mut Lexer<'input>,
    scope: &Scope<'_, 'input>,
    depth: usize,
) -> Result<Expression, Error> {
    let mut items = Vec::new();
    loop {
        if lexer.consume(TokenType::BracketRight)? {
            break;
        }
        if lexer.peek_token()?.is_none() {
            return Err(Error::MissingCloseBracket);
        }
        match parse_binary_op(lexer, scope, 0, depth)? {
            Expression::Constant(v) => items.push(v),
            _ => return Err(Error::NonConstantListElement),
        }
        if lexer.consume(TokenType::Comma)? {
            continue;
        }
        if lexer.consume(TokenType::BracketRight)? {
            break;
        }
        return Err(Error::MissingCloseBracket);
    }
    Ok(Expression::Constant(Value::List(items)))
}

fn binary_op(token: &Token) -> Result<BinaryOp, Error> {
    Ok(match token.ty {
        TokenType::OrOr => BinaryOp::Or,
        TokenType::AndAnd => BinaryOp::And,
        TokenType::EqEq => BinaryOp::Eq,
        TokenType::BangEq => BinaryOp::Ne,
        TokenType::LT => BinaryOp::Lt,
        TokenType::LTE => BinaryOp::Le,
        TokenType::GT => BinaryOp::Gt,
        TokenType::GTE => BinaryOp::Ge,
        TokenType::Plus => BinaryOp::Add,
        TokenType::Minus => BinaryOp::Sub,
        TokenType::Asterisk => BinaryOp::Mul,
        TokenType::ForwardSlash => BinaryOp::Div,
        _ => return Err(Error::UnexpectedToken(token.clone())),
    })
}

fn text<'input>(lexer: &Lexer<'input>, token: &Token) -> Result<&'input str, Error> {
    std::str::from_utf8(lexer.contents(token)).map_err(|_| Error::UnexpectedToken(token.clone()))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

// NOTE prefix_binding and infix_binding specify the "binding power" of the
//  various prefix and infix operators. Higher binding power means the
//  operator binds more tightly, so `*` is above `+` and `&&` is above `||`.
fn prefix_binding() -> ((), u8) {
    ((), 80)
}

const CAST_BINDING: u8 = 90;
const POSTFIX_BINDING: u8 = 100;

// NOTE for infix bindings we specify a left and right side of the operator,
//  the slightly higher right side makes every operator left-associative.
fn infix_binding(ty: TokenType) -> Option<(u8, u8)> {
    match ty {
        TokenType::OrOr => Some((10, 11)),
        TokenType::AndAnd => Some((20, 21)),
        TokenType::EqEq
        | TokenType::BangEq
        | TokenType::LT
        | TokenType::LTE
        | TokenType::GT
        | TokenType::GTE => Some((40, 41)),
        TokenType::Plus | TokenType::Minus => Some((50, 51)),
        TokenType::Asterisk | TokenType::ForwardSlash => Some((60, 61)),
        _ => None,
    }
}
