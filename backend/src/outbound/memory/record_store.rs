//! In-memory [`RecordStore`] keyed by table name.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Filters, Projection};

/// Code reported for duplicate keys, matching PostgreSQL's `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Default)]
struct Tables {
    rows: BTreeMap<String, Vec<Map<String, Value>>>,
    next_id: i64,
}

impl Tables {
    fn table(&mut self, name: &str) -> &mut Vec<Map<String, Value>> {
        self.rows.entry(name.to_owned()).or_default()
    }

    fn observe_id(&mut self, id: &Value) {
        if let Some(id) = id.as_i64() {
            self.next_id = self.next_id.max(id);
        }
    }
}

/// Record store holding rows in process memory.
///
/// Rows without an `id` get the next integer key. `created_at` is stamped on
/// insert and `updated_at` on insert and every update.
pub struct InMemoryRecordStore {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRecordStore {
    /// Empty store stamping times from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock,
        }
    }

    /// Seed `table` with rows as-is, without stamping timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::InvalidRequest`] when a row is not a JSON
    /// object.
    pub fn seed(&self, table: &str, rows: Vec<Value>) -> Result<(), RecordStoreError> {
        let mut tables = self.lock()?;
        for row in rows {
            let row = into_object(row)?;
            if let Some(id) = row.get("id") {
                tables.observe_id(id);
            }
            tables.table(table).push(row);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RecordStoreError> {
        self.tables
            .lock()
            .map_err(|_| RecordStoreError::transport("in-memory record store lock poisoned"))
    }

    fn now(&self) -> Value {
        json!(self.clock.utc())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(
        &self,
        table: &str,
        projection: &Projection,
        filters: &Filters,
    ) -> Result<Vec<Value>, RecordStoreError> {
        let mut tables = self.lock()?;
        let rows = tables
            .table(table)
            .iter()
            .map(|row| Value::Object(row.clone()))
            .filter(|row| filters.matches(row))
            .map(|row| project(row, projection))
            .collect::<Vec<_>>();
        debug!(table, rows = rows.len(), "in-memory select");
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, RecordStoreError> {
        let now = self.now();
        let mut tables = self.lock()?;
        let mut next_id = tables.next_id;
        let mut staged: Vec<Map<String, Value>> = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = into_object(row)?;
            match row.get("id").filter(|id| !id.is_null()).cloned() {
                Some(id) => {
                    let has_id = |existing: &Map<String, Value>| existing.get("id") == Some(&id);
                    if tables.table(table).iter().any(has_id) || staged.iter().any(has_id) {
                        return Err(duplicate_key(table, &id));
                    }
                    if let Some(raw) = id.as_i64() {
                        next_id = next_id.max(raw);
                    }
                }
                None => {
                    next_id += 1;
                    row.insert("id".to_owned(), json!(next_id));
                }
            }
            row.entry("created_at").or_insert_with(|| now.clone());
            row.insert("updated_at".to_owned(), now.clone());
            staged.push(row);
        }

        tables.next_id = next_id;
        tables.table(table).extend(staged.iter().cloned());
        debug!(table, rows = staged.len(), "in-memory insert");
        Ok(staged.into_iter().map(Value::Object).collect())
    }

    async fn update(
        &self,
        table: &str,
        filters: &Filters,
        patch: Value,
    ) -> Result<Vec<Value>, RecordStoreError> {
        let patch = into_object(patch)?;
        let now = self.now();
        let mut tables = self.lock()?;
        let mut updated = Vec::new();
        for row in tables.table(table).iter_mut() {
            if !filters.matches(&Value::Object(row.clone())) {
                continue;
            }
            for (column, value) in &patch {
                if column != "id" {
                    row.insert(column.clone(), value.clone());
                }
            }
            row.insert("updated_at".to_owned(), now.clone());
            updated.push(Value::Object(row.clone()));
        }
        debug!(table, rows = updated.len(), "in-memory update");
        Ok(updated)
    }

    async fn delete(
        &self,
        table: &str,
        filters: &Filters,
    ) -> Result<Vec<Value>, RecordStoreError> {
        let mut tables = self.lock()?;
        let (removed, kept): (Vec<_>, Vec<_>) = tables
            .table(table)
            .drain(..)
            .partition(|row| filters.matches(&Value::Object(row.clone())));
        *tables.table(table) = kept;
        Ok(removed.into_iter().map(Value::Object).collect())
    }
}

fn duplicate_key(table: &str, id: &Value) -> RecordStoreError {
    RecordStoreError::rejected(
        format!("duplicate key value violates unique constraint on {table}.id"),
        UNIQUE_VIOLATION,
        Some(json!({ "details": format!("Key (id)=({id}) already exists.") })),
    )
}

fn into_object(value: Value) -> Result<Map<String, Value>, RecordStoreError> {
    match value {
        Value::Object(row) => Ok(row),
        other => Err(RecordStoreError::invalid_request(format!(
            "rows must be JSON objects, got {other}"
        ))),
    }
}

fn project(row: Value, projection: &Projection) -> Value {
    match (row, projection) {
        (Value::Object(row), Projection::Columns(_)) => Value::Object(
            row.into_iter()
                .filter(|(column, _)| projection.includes(column))
                .collect(),
        ),
        (row, _) => row,
    }
}
