//! Typed table declarations, projections, and filters.
//!
//! Backends exchange rows as JSON objects. A [`Record`] declares the typed
//! shape of one table's rows, and a [`Table`] handle names the collection so
//! the generic data-access operations can decode rows at the boundary.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Typed row definition for one backend table.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key type of the table.
    type Id: Serialize + fmt::Display + Send + Sync;

    /// Column that stores the primary key.
    const KEY_COLUMN: &'static str = "id";

    /// Primary key of this row.
    fn id(&self) -> &Self::Id;
}

/// Named handle for a backend table holding rows of type `T`.
///
/// # Examples
/// ```
/// use leadline::domain::{LEADS, Lead, Table};
///
/// let table: Table<Lead> = LEADS;
/// assert_eq!(table.name(), "leads");
/// ```
pub struct Table<T> {
    name: &'static str,
    marker: PhantomData<fn() -> T>,
}

impl<T> Table<T> {
    /// Declare a table handle.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            marker: PhantomData,
        }
    }

    /// Logical collection name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Table<T> {}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Table").field(&self.name).finish()
    }
}

/// Columns to return from a read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every column (`*`).
    #[default]
    All,
    /// An explicit column list.
    Columns(Vec<String>),
}

impl Projection {
    /// Build an explicit column projection.
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            Self::All
        } else {
            Self::Columns(columns)
        }
    }

    /// Render as a comma separated select list.
    pub fn to_select_list(&self) -> String {
        match self {
            Self::All => "*".to_owned(),
            Self::Columns(columns) => columns.join(","),
        }
    }

    /// Whether the projection keeps `column`.
    pub fn includes(&self, column: &str) -> bool {
        match self {
            Self::All => true,
            Self::Columns(columns) => columns.iter().any(|candidate| candidate == column),
        }
    }
}

/// Value constraint for one filtered field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Equality against a scalar.
    Eq(Value),
    /// Membership in a set of scalars.
    In(Vec<Value>),
    /// No value supplied; the field is left out of the query entirely.
    Absent,
}

impl FilterValue {
    /// Test a row value against this constraint.
    ///
    /// [`FilterValue::Absent`] matches everything because it is never sent.
    pub fn matches(&self, candidate: Option<&Value>) -> bool {
        match self {
            Self::Absent => true,
            Self::Eq(expected) => candidate == Some(expected),
            Self::In(options) => candidate.is_some_and(|value| options.contains(value)),
        }
    }
}

/// Field filters for `fetch_all`, ordered by field name.
///
/// # Examples
/// ```
/// use leadline::domain::Filters;
///
/// let filters = Filters::new()
///     .eq("city", "Izmir")
///     .any_of("district", ["Konak", "Bornova"])
///     .maybe_eq("company", None::<String>);
///
/// let sent: Vec<&str> = filters.active().map(|(field, _)| field).collect();
/// assert_eq!(sent, ["city", "district"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(BTreeMap<String, FilterValue>);

impl Filters {
    /// Empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterValue::Eq(value.into()))
    }

    /// Require `field` to be one of `values`.
    #[must_use]
    pub fn any_of<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with(
            field,
            FilterValue::In(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Require equality when `value` is present; record an absent filter otherwise.
    #[must_use]
    pub fn maybe_eq<V: Into<Value>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.eq(field, value),
            None => self.with(field, FilterValue::Absent),
        }
    }

    /// Insert an explicit constraint, replacing any earlier one for `field`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    /// Iterate over constraints that are actually sent to the backend.
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0
            .iter()
            .filter(|(_, value)| !matches!(value, FilterValue::Absent))
            .map(|(field, value)| (field.as_str(), value))
    }

    /// Whether every active constraint holds for `row`.
    pub fn matches(&self, row: &Value) -> bool {
        self.active()
            .all(|(field, constraint)| constraint.matches(row.get(field)))
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Array(values) => Self::In(values),
            scalar => Self::Eq(scalar),
        }
    }
}

impl<V: Into<Value>> From<Option<V>> for FilterValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Absent, |inner| Self::from(inner.into()))
    }
}
