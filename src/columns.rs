//! Column metadata for domain types.
//!
//! A domain type is described once, statically, by a [Table] impl: its SQL
//!  name and an ordered table of [ColumnDescriptor]s. The [define_table!]
//!  macro generates both together with typed [Column] constants that can be
//!  used directly as selectors and in predicates.

use std::marker::PhantomData;

use crate::{ast::Expression, value::Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: &'static str,
    /// Participates in the default projection.
    pub selectable: bool,
}

impl ColumnDescriptor {
    pub const fn selectable(name: &'static str) -> Self {
        Self {
            name,
            selectable: true,
        }
    }

    pub const fn hidden(name: &'static str) -> Self {
        Self {
            name,
            selectable: false,
        }
    }
}

pub trait Table {
    const NAME: &'static str;
    /// Columns in declaration order.
    const COLUMNS: &'static [ColumnDescriptor];
}

/// A column of table `T`.
#[derive(Debug)]
pub struct Column<T> {
    pub name: &'static str,
    _table: PhantomData<fn() -> T>,
}

// Manual impls: deriving would require `T: Clone`
impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Column<T> {}

impl<T> Column<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _table: PhantomData,
        }
    }

    pub fn expr(self) -> Expression {
        crate::ast::col(self.name)
    }

    pub fn eq(self, value: impl Into<Value>) -> Expression {
        self.expr().eq(value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Expression {
        self.expr().ne(value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Expression {
        self.expr().gt(value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Expression {
        self.expr().ge(value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Expression {
        self.expr().lt(value)
    }

    pub fn le(self, value: impl Into<Value>) -> Expression {
        self.expr().le(value)
    }

    pub fn is_in(self, values: impl Into<Value>) -> Expression {
        self.expr().is_in(values)
    }
}

impl<T> From<Column<T>> for Expression {
    fn from(c: Column<T>) -> Self {
        c.expr()
    }
}

/// Anything that can name a column of table `T`: a typed [Column] or an
///  untyped expression (checked when the query is rendered).
pub trait Selector<T> {
    fn into_selector(self) -> Expression;
}

impl<T> Selector<T> for Column<T> {
    fn into_selector(self) -> Expression {
        self.expr()
    }
}

impl<T> Selector<T> for Expression {
    fn into_selector(self) -> Expression {
        self
    }
}

/// Names of the columns of `T` that are marked selectable, in declaration order.
pub fn default_columns<T: Table>() -> Vec<String> {
    T::COLUMNS
        .iter()
        .filter(|c| c.selectable)
        .map(|c| c.name.to_string())
        .collect()
}

/// Reconciles an explicit projection with the columns available to it.
///
/// The base set is `group_by` when grouping, `defaults` otherwise. A
///  non-empty `explicit` projection is intersected with the base set (keeping
///  `explicit`'s order, each name once); if nothing survives, the whole base
///  set is used.
pub fn resolve_projection(
    explicit: &[String],
    group_by: &[String],
    defaults: &[String],
) -> Vec<String> {
    let base = if group_by.is_empty() {
        defaults
    } else {
        group_by
    };

    let mut resolved: Vec<String> = Vec::with_capacity(explicit.len());
    for name in explicit {
        if base.contains(name) && !resolved.contains(name) {
            resolved.push(name.clone());
        }
    }

    if resolved.is_empty() {
        if !explicit.is_empty() {
            tracing::warn!(
                ?explicit,
                ?base,
                "projection shares no columns with the base set, selecting the base set"
            );
        }
        base.to_vec()
    } else {
        resolved
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __selectable {
    (select) => {
        true
    };
    () => {
        false
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __table_name {
    ($name:ident) => {
        stringify!($name)
    };
    ($name:ident, $table:literal) => {
        $table
    };
}

/// Declares a domain type, its column table, and a typed [Column] constant
///  per column. Columns marked `#[select]` make up the default projection.
///
/// ```
/// use lambda_sql::{define_table, columns::{Table, default_columns}};
///
/// define_table! {
///     pub struct Order {
///         #[select] ID => "id",
///         #[select] AMOUNT => "amount",
///         NOTES => "notes",
///     }
/// }
///
/// assert_eq!(Order::NAME, "Order");
/// assert_eq!(Order::AMOUNT.name, "amount");
/// assert_eq!(default_columns::<Order>(), vec!["id", "amount"]);
/// ```
///
/// The SQL name defaults to the type name; `pub struct Order as "orders" { .. }`
///  overrides it.
#[macro_export]
macro_rules! define_table {
    (
        $vis:vis struct $name:ident $(as $table:literal)? {
            $( $(#[$marker:ident])? $col:ident => $db_col:literal ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::columns::Table for $name {
            const NAME: &'static str = $crate::__table_name!($name $(, $table)?);
            const COLUMNS: &'static [$crate::columns::ColumnDescriptor] = &[
                $(
                    $crate::columns::ColumnDescriptor {
                        name: $db_col,
                        selectable: $crate::__selectable!($($marker)?),
                    },
                )*
            ];
        }

        #[allow(dead_code)]
        impl $name {
            $(
                $vis const $col: $crate::columns::Column<$name> =
                    $crate::columns::Column::new($db_col);
            )*
        }
    };
}
