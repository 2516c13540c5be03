//! Shared WHERE clause accumulator for SELECT, UPDATE, DELETE and the table wrapper.
//!
//! Filters are kept in insertion order and rendered two ways:
//!
//! - [`WhereBuilder::build_filters`]: a column-keyed map for the REST endpoints.
//!   Filtering the same column twice keeps only the later filter.
//! - [`WhereBuilder::build_where_sql`]: a SQL fragment. Every filter is kept and
//!   ANDed, including repeated columns.
//!
//! The two forms therefore agree whenever each column is filtered at most once.

use crate::condition::{Filter, Op};
use crate::ident::quote_column;
use crate::qb::binding::BindingList;
use crate::qb::payload::{FilterEntry, FilterMap};
use crate::value::{FilterValue, Scalar};

/// Reusable WHERE clause builder, owned by each statement builder.
#[derive(Debug, Clone, Default)]
pub struct WhereBuilder {
    filters: Vec<Filter>,
    /// First invalid filter seen (reported by `validate()`)
    build_error: Option<String>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any filters have been added.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Filters in insertion order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Get the build error, if any.
    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    // ==================== Accumulation ====================

    /// Append a pre-built filter.
    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Append `column <op> value`. An invalid value shape is recorded as a build error.
    pub fn add(&mut self, column: &str, op: Op, value: impl Into<FilterValue>) {
        match Filter::new(column, op, value) {
            Ok(filter) => self.filters.push(filter),
            Err(err) => {
                if self.build_error.is_none() {
                    self.build_error = Some(err.to_string());
                }
            }
        }
    }

    /// Append `column IN (values...)`.
    pub fn add_in<I, T>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        self.add(column, Op::In, FilterValue::list(values));
    }

    /// Append `column NOT IN (values...)`.
    pub fn add_not_in<I, T>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        self.add(column, Op::NotIn, FilterValue::list(values));
    }

    /// Append `column IS NULL`.
    pub fn add_null(&mut self, column: &str) {
        self.add(column, Op::IsNull, FilterValue::None);
    }

    /// Append `column IS NOT NULL`.
    pub fn add_not_null(&mut self, column: &str) {
        self.add(column, Op::IsNotNull, FilterValue::None);
    }

    // ==================== Rendering ====================

    /// Column-keyed filter map for the REST endpoints (later filters overwrite earlier ones).
    pub fn build_filters(&self) -> FilterMap {
        let mut map = FilterMap::new();
        for filter in &self.filters {
            map.insert(
                filter.column().to_string(),
                FilterEntry {
                    operator: filter.op(),
                    value: filter.value().clone(),
                },
            );
        }
        map
    }

    /// `WHERE <cond> [AND <cond> ...]`, or `""` when there are no filters.
    ///
    /// Values are appended to `out` in filter insertion order.
    pub fn build_where_sql(&self, out: &mut BindingList) -> String {
        if self.filters.is_empty() {
            return String::new();
        }
        format!("WHERE {}", self.build_clause(out))
    }

    /// The conditions joined with `AND`, without the `WHERE` keyword.
    pub fn build_clause(&self, out: &mut BindingList) -> String {
        self.filters
            .iter()
            .map(|f| render_filter(f, out))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

fn render_filter(filter: &Filter, out: &mut BindingList) -> String {
    let column = quote_column(filter.column());
    let token = filter.op().sql_token();
    match filter.value() {
        FilterValue::None => format!("{column} {token}"),
        FilterValue::List(values) if values.is_empty() => {
            // Empty IN matches nothing; empty NOT IN matches everything.
            if filter.op() == Op::NotIn {
                "1=1".to_string()
            } else {
                "1=0".to_string()
            }
        }
        FilterValue::List(values) => {
            let items: Vec<String> = values.iter().map(|v| out.bind(v)).collect();
            format!("{column} {token} ({})", items.join(", "))
        }
        FilterValue::Single(value) => format!("{column} {token} {}", out.bind(value)),
    }
}

/// Generate the `where_*` family for a consuming builder.
///
/// The argument is the field path (from `self`) of the builder's [`WhereBuilder`].
macro_rules! impl_where_methods {
    ($($field:ident).+) => {
        /// Add WHERE: `column <op> value`.
        pub fn where_(
            mut self,
            column: &str,
            op: $crate::condition::Op,
            value: impl Into<$crate::value::FilterValue>,
        ) -> Self {
            self.$($field).+.add(column, op, value);
            self
        }

        /// Add WHERE with the operator given as a string (`"="`, `">="`, `"NOT IN"`, `"Equal"`, ...).
        ///
        /// Fails with [`NqError::UnknownOperator`](crate::NqError::UnknownOperator)
        /// if the operator is not in the catalog.
        pub fn where_op(
            mut self,
            column: &str,
            op: &str,
            value: impl Into<$crate::value::FilterValue>,
        ) -> $crate::error::NqResult<Self> {
            let op: $crate::condition::Op = op.parse()?;
            self.$($field).+.add(column, op, value);
            Ok(self)
        }

        /// Add WHERE: `column = value`.
        pub fn where_eq(mut self, column: &str, value: impl Into<$crate::value::FilterValue>) -> Self {
            self.$($field).+.add(column, $crate::condition::Op::Equals, value);
            self
        }

        /// Add WHERE: `column IN (values...)`.
        pub fn where_in<__I, __V>(mut self, column: &str, values: __I) -> Self
        where
            __I: IntoIterator<Item = __V>,
            __V: Into<$crate::value::Scalar>,
        {
            self.$($field).+.add_in(column, values);
            self
        }

        /// Add WHERE: `column NOT IN (values...)`.
        pub fn where_not_in<__I, __V>(mut self, column: &str, values: __I) -> Self
        where
            __I: IntoIterator<Item = __V>,
            __V: Into<$crate::value::Scalar>,
        {
            self.$($field).+.add_not_in(column, values);
            self
        }

        /// Add WHERE: `column IS NULL`.
        pub fn where_null(mut self, column: &str) -> Self {
            self.$($field).+.add_null(column);
            self
        }

        /// Add WHERE: `column IS NOT NULL`.
        pub fn where_not_null(mut self, column: &str) -> Self {
            self.$($field).+.add_not_null(column);
            self
        }

        /// Add a pre-built filter.
        pub fn where_filter(mut self, filter: $crate::condition::Filter) -> Self {
            self.$($field).+.push(filter);
            self
        }

        /// The accumulated filters.
        pub fn where_builder(&self) -> &$crate::qb::WhereBuilder {
            &self.$($field).+
        }
    };
}

pub(crate) use impl_where_methods;
