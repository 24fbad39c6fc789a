//! Rendering of filters and projections as PostgREST query parameters.

use serde_json::Value;

use crate::domain::ports::RecordStoreError;
use crate::domain::{FilterValue, Filters, Projection};

/// Characters PostgREST treats as syntax inside `in.(...)` lists.
const RESERVED: [char; 7] = [',', '.', ':', '(', ')', '"', '\\'];

pub(super) fn select_params(
    projection: &Projection,
    filters: &Filters,
) -> Result<Vec<(String, String)>, RecordStoreError> {
    let mut params = vec![("select".to_owned(), projection.to_select_list())];
    params.extend(filter_params(filters)?);
    Ok(params)
}

/// One `column=operator.value` pair per active filter; absent filters are skipped.
pub(super) fn filter_params(filters: &Filters) -> Result<Vec<(String, String)>, RecordStoreError> {
    let mut params = Vec::new();
    for (column, value) in filters.active() {
        if let Some(rendered) = render(column, value)? {
            params.push((column.to_owned(), rendered));
        }
    }
    Ok(params)
}

fn render(column: &str, value: &FilterValue) -> Result<Option<String>, RecordStoreError> {
    match value {
        FilterValue::Absent => Ok(None),
        FilterValue::Eq(Value::Null) => Ok(Some("is.null".to_owned())),
        FilterValue::Eq(scalar) => Ok(Some(format!("eq.{}", scalar_text(column, scalar)?))),
        FilterValue::In(values) => {
            let items = values
                .iter()
                .map(|value| scalar_text(column, value).map(|text| quote_list_item(&text)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(format!("in.({})", items.join(","))))
        }
    }
}

fn scalar_text(column: &str, value: &Value) -> Result<String, RecordStoreError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok("null".to_owned()),
        Value::Array(_) | Value::Object(_) => Err(RecordStoreError::invalid_request(format!(
            "filter on '{column}' must use scalar values"
        ))),
    }
}

fn quote_list_item(text: &str) -> String {
    let needs_quotes = text.is_empty()
        || text.trim() != text
        || text.contains(RESERVED)
        || text.eq_ignore_ascii_case("null");
    if !needs_quotes {
        return text.to_owned();
    }
    let escaped = text.replace('\\', r"\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
