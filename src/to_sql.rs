use crate::{
    translate::Result,
    value::{self, Value},
};

/// How literal values reach the statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiteralMode {
    /// Literals are formatted straight into the SQL text.
    #[default]
    Inline,
    /// Each literal becomes a `?` placeholder and is collected, in order, into
    ///  [Statement::params].
    Bind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderConfig {
    pub literals: LiteralMode,
    /// Fail with [crate::translate::Error::MissingPredicate] instead of rendering a statement
    ///  without a WHERE clause.
    #[cfg_attr(feature = "serde", serde(default))]
    pub require_predicate: bool,
}

impl RenderConfig {
    pub fn inline() -> Self {
        Self::default()
    }

    pub fn bind() -> Self {
        Self {
            literals: LiteralMode::Bind,
            ..Self::default()
        }
    }
}

/// Rendered SQL text plus the values for its placeholders (always empty in
///  [LiteralMode::Inline]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Output sink for translation. Text goes to `sql`; literals are either
///  formatted inline or replaced by placeholders depending on the mode.
#[derive(Debug)]
pub struct SqlWriter {
    sql: String,
    params: Vec<Value>,
    mode: LiteralMode,
}

impl SqlWriter {
    pub fn new(mode: LiteralMode) -> Self {
        Self {
            sql: String::with_capacity(64),
            params: Vec::new(),
            mode,
        }
    }

    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    #[inline]
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    pub fn push_literal(&mut self, v: &Value) -> Result<()> {
        match self.mode {
            LiteralMode::Inline => value::write_literal(&mut self.sql, v),
            LiteralMode::Bind => {
                // Validate first so a bad value doesn't leave placeholders behind
                value::format(v)?;
                match v {
                    Value::List(items) => {
                        let mut first = true;
                        for item in items {
                            if !first {
                                self.sql.push(',');
                            }
                            first = false;
                            self.sql.push('?');
                            self.params.push(item.clone());
                        }
                    }
                    scalar => {
                        self.sql.push('?');
                        self.params.push(scalar.clone());
                    }
                }
                Ok(())
            }
        }
    }

    pub fn mode(&self) -> LiteralMode {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Appends another writer's text and parameters.
    pub fn append(&mut self, other: SqlWriter) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    pub fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

impl std::fmt::Write for SqlWriter {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.sql.push_str(s);
        Ok(())
    }
}

pub trait ToSQL {
    fn to_sql(&self, out: &mut SqlWriter) -> Result<()>;
}

impl<T> ToSQL for Box<T>
where
    T: ToSQL,
{
    fn to_sql(&self, out: &mut SqlWriter) -> Result<()> {
        self.as_ref().to_sql(out)
    }
}

impl<T> ToSQL for &T
where
    T: ToSQL + ?Sized,
{
    fn to_sql(&self, out: &mut SqlWriter) -> Result<()> {
        (**self).to_sql(out)
    }
}

pub struct Printer<T> {
    tree: T,
    config: RenderConfig,
}

impl<T> Printer<T> {
    pub fn new(tree: T, config: RenderConfig) -> Self {
        Self { tree, config }
    }
}

impl<T> Printer<T>
where
    T: ToSQL,
{
    pub fn render(&self) -> Result<Statement> {
        let mut out = SqlWriter::new(self.config.literals);
        self.tree.to_sql(&mut out)?;
        Ok(out.finish())
    }
}
