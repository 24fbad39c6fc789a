//! Wire shapes of PostgREST responses.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Error body returned by PostgREST for rejected requests.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PostgrestErrorDto {
    #[serde(default)]
    pub(super) code: Option<String>,
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) details: Option<Value>,
    #[serde(default)]
    pub(super) hint: Option<Value>,
}

impl PostgrestErrorDto {
    /// `details` and `hint` folded into one JSON object, if either is set.
    pub(super) fn detail_object(&self) -> Option<Value> {
        let mut object = Map::new();
        for (key, value) in [("details", &self.details), ("hint", &self.hint)] {
            if let Some(value) = value.as_ref().filter(|value| !value.is_null()) {
                object.insert(key.to_owned(), value.clone());
            }
        }
        (!object.is_empty()).then_some(Value::Object(object))
    }
}

/// Rows in a successful response.
///
/// Single-object responses are accepted alongside arrays so callers that ask
/// for `application/vnd.pgrst.object+json` still decode.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RowsDto {
    Many(Vec<Value>),
    One(Map<String, Value>),
}

impl RowsDto {
    pub(super) fn into_rows(self) -> Vec<Value> {
        match self {
            Self::Many(rows) => rows,
            Self::One(row) => vec![Value::Object(row)],
        }
    }
}
