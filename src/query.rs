//! The statement builder.
//!
//! [QueryBuilder] accumulates clause inputs in a [QueryState] and only
//!  translates them when the statement is rendered:
//!
//! ```
//! use lambda_sql::{define_table, query::QueryBuilder};
//!
//! define_table! {
//!     pub struct Order {
//!         #[select] ID => "id",
//!         #[select] AMOUNT => "amount",
//!         #[select] STATUS => "status",
//!         #[select] CREATED_AT => "createdAt",
//!     }
//! }
//!
//! let mut query = QueryBuilder::<Order>::new();
//! query
//!     .filter(Order::AMOUNT.gt(100).and(Order::STATUS.eq("open")))
//!     .order_by([Order::CREATED_AT])
//!     .limit(10)
//!     .offset(0);
//!
//! assert_eq!(
//!     query.to_sql().unwrap(),
//!     "SELECT id,amount,status,createdAt FROM Order  WHERE ((amount>100) AND (status='open'))  ORDER BY createdAt OFFSET 0 LIMIT 10"
//! );
//! ```

use std::{fmt::Write, marker::PhantomData};

use crate::{
    ast::Expression,
    columns::{Selector, Table, default_columns, resolve_projection},
    to_sql::{LiteralMode, RenderConfig, SqlWriter, Statement, ToSQL},
    translate::{Error, Result, column_name},
};

/// A join against another table on `this.left = other.right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: &'static str,
    pub left: Expression,
    pub right: Expression,
}

/// Everything a [QueryBuilder] has been told so far. Column lists hold the
///  selector expressions as given; they are reduced to names at render time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub predicate: Option<Expression>,
    pub joins: Vec<Join>,
    pub group_by: Vec<Expression>,
    pub order_by: Vec<Expression>,
    pub projection: Vec<Expression>,
    pub sum_columns: Vec<Expression>,
    pub count_columns: Vec<Expression>,
    pub limit: u64,
    pub offset: u64,
}

impl QueryState {
    /// Conjoins `predicate` with the current one. Existing trees are moved
    ///  into the new root, never modified.
    fn conjoin(&mut self, predicate: Expression) {
        let predicate = predicate.into_body();
        self.predicate = Some(match self.predicate.take() {
            None => predicate,
            Some(existing) => existing.and(predicate),
        });
    }
}

/// Builds one `SELECT` over table `T`.
///
/// Every mutation returns the same builder so calls chain. The builder may be
///  rendered any number of times and mutated again in between.
#[derive(Debug, Clone)]
pub struct QueryBuilder<T: Table> {
    state: QueryState,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table> Default for QueryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Table> QueryBuilder<T> {
    pub fn new() -> Self {
        Self {
            state: QueryState::default(),
            _table: PhantomData,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Adds a predicate; repeated calls are combined with AND.
    pub fn filter(&mut self, predicate: impl Into<Expression>) -> &mut Self {
        self.state.conjoin(predicate.into());
        self
    }

    /// Joins table `J` on `T.left = J.right`.
    pub fn join<J: Table>(
        &mut self,
        left: impl Selector<T>,
        right: impl Selector<J>,
    ) -> &mut Self {
        self.state.joins.push(Join {
            table: J::NAME,
            left: left.into_selector(),
            right: right.into_selector(),
        });
        self
    }

    pub fn group_by<S: Selector<T>>(
        &mut self,
        selectors: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        extend::<T, S, _>(&mut self.state.group_by, selectors);
        self
    }

    pub fn order_by<S: Selector<T>>(
        &mut self,
        selectors: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        extend::<T, S, _>(&mut self.state.order_by, selectors);
        self
    }

    /// Requests an explicit projection. Only columns also present in the
    ///  default set (or the GROUP BY list, when grouping) are kept.
    pub fn select<S: Selector<T>>(
        &mut self,
        selectors: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        extend::<T, S, _>(&mut self.state.projection, selectors);
        self
    }

    /// Adds `SUM(col) AS col` for each selector.
    pub fn sum<S: Selector<T>>(
        &mut self,
        selectors: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        extend::<T, S, _>(&mut self.state.sum_columns, selectors);
        self
    }

    /// Adds `COUNT(col) AS col` for each selector.
    pub fn count<S: Selector<T>>(
        &mut self,
        selectors: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        extend::<T, S, _>(&mut self.state.count_columns, selectors);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.state.limit = limit;
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.state.offset = offset;
        self
    }

    /// The columns the statement will select, before aggregates.
    pub fn projections(&self) -> Result<Vec<String>> {
        let group_by = names(&self.state.group_by)?;
        let explicit = names(&self.state.projection)?;
        Ok(resolve_projection(
            &explicit,
            &group_by,
            &default_columns::<T>(),
        ))
    }

    /// Renders with literals inline.
    pub fn to_sql(&self) -> Result<String> {
        self.render(&RenderConfig::inline()).map(|stmt| stmt.sql)
    }

    /// Renders with `?` placeholders and an ordered parameter list.
    pub fn build(&self) -> Result<Statement> {
        self.render(&RenderConfig::bind())
    }

    pub fn render(&self, config: &RenderConfig) -> Result<Statement> {
        let state = &self.state;
        if state.predicate.is_none() && config.require_predicate {
            return Err(Error::MissingPredicate);
        }

        let mut out = SqlWriter::new(config.literals);

        // SELECT {projection}{sums}{counts}
        let projection = self.projections()?;
        tracing::trace!(?projection, "resolved projection");
        out.push_str("SELECT ");
        out.push_str(&projection.join(","));
        for name in names(&state.sum_columns)? {
            push_fmt(&mut out, format_args!(",SUM({name}) AS {name}"));
        }
        for name in names(&state.count_columns)? {
            push_fmt(&mut out, format_args!(",COUNT({name}) AS {name}"));
        }

        // FROM {table} {joins}
        push_fmt(&mut out, format_args!(" FROM {} ", T::NAME));
        let mut first = true;
        for join in &state.joins {
            if !first {
                out.push(' ');
            }
            first = false;
            push_fmt(
                &mut out,
                format_args!(
                    "JOIN {joined} ON {this}.{left}={joined}.{right}",
                    joined = join.table,
                    this = T::NAME,
                    left = column_name(&join.left)?,
                    right = column_name(&join.right)?,
                ),
            );
        }

        // {where}
        out.push(' ');
        if let Some(predicate) = &state.predicate {
            let mut clause = SqlWriter::new(config.literals);
            predicate.to_sql(&mut clause)?;
            if !clause.is_empty() {
                out.push_str("WHERE ");
                out.append(clause);
            }
        }

        // {group by} {order by}
        out.push(' ');
        let group_by = names(&state.group_by)?;
        if !group_by.is_empty() {
            push_fmt(&mut out, format_args!("GROUP BY {}", group_by.join(",")));
        }
        out.push(' ');
        let order_by = names(&state.order_by)?;
        if !order_by.is_empty() {
            push_fmt(&mut out, format_args!("ORDER BY {}", order_by.join(",")));
        }

        // OFFSET and LIMIT are always present, even at zero
        push_fmt(
            &mut out,
            format_args!(" OFFSET {} LIMIT {}", state.offset, state.limit),
        );

        let stmt = out.finish();
        tracing::debug!(
            table = T::NAME,
            bind = config.literals == LiteralMode::Bind,
            params = stmt.params.len(),
            sql = %stmt.sql,
            "rendered statement"
        );
        Ok(stmt)
    }
}

fn extend<T, S, I>(list: &mut Vec<Expression>, selectors: I)
where
    S: Selector<T>,
    I: IntoIterator<Item = S>,
{
    list.extend(selectors.into_iter().map(<S as Selector<T>>::into_selector));
}

fn names(selectors: &[Expression]) -> Result<Vec<String>> {
    selectors
        .iter()
        .map(|s| column_name(s).map(str::to_string))
        .collect()
}

fn push_fmt(out: &mut SqlWriter, args: std::fmt::Arguments<'_>) {
    // Writing to a String can't fail
    let _ = out.write_fmt(args);
}
