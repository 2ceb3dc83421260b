//! Filters, ordering and paging for `select` and `update`.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::row::Row;

/// A predicate on a single column.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Column equals the value. A missing column reads as `null`.
    Eq { column: String, value: Value },
    /// Column equals any of the values.
    In { column: String, values: Vec<Value> },
    /// Array column contains the value (or every element, if the value is
    /// itself an array).
    Contains { column: String, value: Value },
}

impl Filter {
    /// Column equals `value`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Column equals any of `values`.
    pub fn one_of<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Array column contains `value`.
    pub fn contains(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Contains {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Evaluate the predicate against a row.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::Eq { column, value } => column_value(row, column) == value,
            Self::In { column, values } => {
                let actual = column_value(row, column);
                values.iter().any(|v| v == actual)
            }
            Self::Contains { column, value } => {
                let Value::Array(items) = column_value(row, column) else {
                    return false;
                };
                match value {
                    Value::Array(wanted) => wanted.iter().all(|w| items.contains(w)),
                    single => items.contains(single),
                }
            }
        }
    }
}

/// Sort order on one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    /// Ascending order on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    /// Descending order on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Compare two rows on this order's column.
    ///
    /// Nulls sort last ascending and first descending.
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let ord = compare_values(column_value(a, &self.column), column_value(b, &self.column));
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

/// A `select` request.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Query {
    /// Select every row of a table.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
            offset: 0,
        }
    }

    /// Add a filter; all filters must match.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sort the result.
    pub fn order_by(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Return at most `limit` rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` rows.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns `true` if the row satisfies every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

fn column_value<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

/// Total order over JSON values used for sorting.
///
/// Strings that parse as RFC 3339 timestamps compare chronologically, since
/// serialized sub-second precision varies in length, and sort before all
/// other strings. Equal instants fall back to their text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(tx), Some(ty)) => tx.cmp(&ty).then_with(|| x.cmp(y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
