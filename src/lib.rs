//! Translates predicate and selector expressions over a domain type into SQL
//!  text, and assembles them into `SELECT` statements with [query::QueryBuilder].

pub mod ast;
pub mod columns;
pub mod fuzz_helper;
pub mod lex;
pub mod parser;
pub mod query;
pub mod to_sql;
pub mod translate;
pub mod value;

#[cfg(test)]
mod tests;

pub use ast::Expression;
pub use columns::{Column, Table};
pub use parser::{Bindings, parse};
pub use query::QueryBuilder;
pub use to_sql::{LiteralMode, RenderConfig, Statement};
pub use value::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Translate(#[from] translate::Error),
    #[error(transparent)]
    Parse(#[from] parser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
