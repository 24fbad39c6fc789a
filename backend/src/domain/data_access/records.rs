//! Typed CRUD operations over a record store.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{map_record_store_error, run_guarded};
use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Envelope, ErrorInfo, Filters, Projection, Record, Table};

/// Record-oriented half of the data-access layer.
///
/// # Examples
/// ```rust,ignore
/// let access = RecordAccess::new(Arc::new(store));
/// let leads = access
///     .fetch_all(LEADS, &Projection::All, &Filters::new().eq("city", "Izmir"))
///     .await;
/// match leads.into_result() {
///     Ok(leads) => render(leads),
///     Err(error) => notifier.error(error.message()),
/// }
/// ```
pub struct RecordAccess<R> {
    store: Arc<R>,
}

impl<R> Clone for RecordAccess<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R> RecordAccess<R> {
    /// Wrap a record store adapter.
    pub fn new(store: Arc<R>) -> Self {
        Self { store }
    }
}

impl<R> RecordAccess<R>
where
    R: RecordStore,
{
    /// Read every row matching `filters`.
    ///
    /// Scalar filters become equality, sequences become set membership, and
    /// absent values are left out of the query. The key column is always
    /// selected, whatever `projection` lists.
    pub async fn fetch_all<T: Record>(
        &self,
        table: Table<T>,
        projection: &Projection,
        filters: &Filters,
    ) -> Envelope<Vec<T>> {
        run_guarded("fetch_all", table.name(), async {
            let projection = keyed_projection::<T>(projection);
            let rows = self
                .store
                .select(table.name(), &projection, filters)
                .await
                .map_err(map_record_store_error)?;
            debug!(table = table.name(), rows = rows.len(), "fetched rows");
            decode_rows(table, rows)
        })
        .await
    }

    /// Read exactly one row by key.
    ///
    /// Zero matches yield an [`ErrorKind::NotFound`](crate::domain::ErrorKind)
    /// error rather than a transport failure.
    pub async fn fetch_by_id<T: Record>(
        &self,
        table: Table<T>,
        id: &T::Id,
        projection: &Projection,
    ) -> Envelope<T> {
        run_guarded("fetch_by_id", table.name(), async {
            let filters = key_filter::<T>(id)?;
            let projection = keyed_projection::<T>(projection);
            let rows = self
                .store
                .select(table.name(), &projection, &filters)
                .await
                .map_err(map_record_store_error)?;
            single_row(table, id, rows)
        })
        .await
    }

    /// Insert one row and return it as persisted.
    pub async fn insert<T, N>(&self, table: Table<T>, record: &N) -> Envelope<T>
    where
        T: Record,
        N: Serialize + Sync,
    {
        run_guarded("insert", table.name(), async {
            let row = encode(record)?;
            let rows = self
                .store
                .insert(table.name(), vec![row])
                .await
                .map_err(map_record_store_error)?;
            let row = rows.into_iter().next().ok_or_else(|| {
                ErrorInfo::internal(format!("{} insert returned no row", table.name()))
            })?;
            decode_row(table, row)
        })
        .await
    }

    /// Insert several rows and return them as persisted.
    pub async fn insert_many<T, N>(&self, table: Table<T>, records: &[N]) -> Envelope<Vec<T>>
    where
        T: Record,
        N: Serialize + Sync,
    {
        run_guarded("insert_many", table.name(), async {
            let rows = records.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
            if rows.is_empty() {
                return Ok(Vec::new());
            }
            let inserted = self
                .store
                .insert(table.name(), rows)
                .await
                .map_err(map_record_store_error)?;
            decode_rows(table, inserted)
        })
        .await
    }

    /// Apply a partial update and return the full post-update row.
    pub async fn update_by_id<T, P>(&self, table: Table<T>, id: &T::Id, patch: &P) -> Envelope<T>
    where
        T: Record,
        P: Serialize + Sync,
    {
        run_guarded("update_by_id", table.name(), async {
            let filters = key_filter::<T>(id)?;
            let patch = encode(patch)?;
            let rows = self
                .store
                .update(table.name(), &filters, patch)
                .await
                .map_err(map_record_store_error)?;
            single_row(table, id, rows)
        })
        .await
    }

    /// Delete one row and return it as it existed before removal.
    pub async fn delete_by_id<T: Record>(&self, table: Table<T>, id: &T::Id) -> Envelope<T> {
        run_guarded("delete_by_id", table.name(), async {
            let filters = key_filter::<T>(id)?;
            let rows = self
                .store
                .delete(table.name(), &filters)
                .await
                .map_err(map_record_store_error)?;
            single_row(table, id, rows)
        })
        .await
    }

    /// Delete several rows and return those that existed.
    pub async fn delete_many<T: Record>(&self, table: Table<T>, ids: &[T::Id]) -> Envelope<Vec<T>> {
        run_guarded("delete_many", table.name(), async {
            let keys = ids.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
            if keys.is_empty() {
                return Ok(Vec::new());
            }
            let filters = Filters::new().any_of(T::KEY_COLUMN, keys);
            let rows = self
                .store
                .delete(table.name(), &filters)
                .await
                .map_err(map_record_store_error)?;
            decode_rows(table, rows)
        })
        .await
    }

    /// Run a caller-built query against the underlying store adapter.
    ///
    /// `builder` receives the adapter itself so call sites can use
    /// backend-specific joins, ordering, or transactions that the generic
    /// operations above do not model. The result is still normalised into an
    /// [`Envelope`], and panics inside `builder` are caught like any other
    /// failure.
    ///
    /// # Examples
    /// ```rust,ignore
    /// let newest = access
    ///     .execute_query(|store| async move {
    ///         let request = store
    ///             .request(Method::GET, "leads")
    ///             .query(&[("select", "*"), ("order", "updated_at.desc"), ("limit", "10")]);
    ///         store.send_rows(request).await
    ///     })
    ///     .await;
    /// ```
    pub async fn execute_query<T, F, Fut>(&self, builder: F) -> Envelope<T>
    where
        F: FnOnce(Arc<R>) -> Fut,
        Fut: Future<Output = Result<T, RecordStoreError>>,
    {
        let store = Arc::clone(&self.store);
        run_guarded("execute_query", "custom query", async move {
            builder(store).await.map_err(map_record_store_error)
        })
        .await
    }
}

fn encode<V: Serialize>(value: &V) -> Result<Value, ErrorInfo> {
    serde_json::to_value(value)
        .map_err(|error| ErrorInfo::internal(format!("payload could not be encoded: {error}")))
}

fn key_filter<T: Record>(id: &T::Id) -> Result<Filters, ErrorInfo> {
    Ok(Filters::new().eq(T::KEY_COLUMN, encode(id)?))
}

/// Rows decode into `T`, which always carries its key.
fn keyed_projection<T: Record>(projection: &Projection) -> Projection {
    match projection {
        Projection::Columns(columns) if !projection.includes(T::KEY_COLUMN) => {
            let mut columns = columns.clone();
            columns.push(T::KEY_COLUMN.to_owned());
            Projection::Columns(columns)
        }
        other => other.clone(),
    }
}

fn decode_row<T: Record>(table: Table<T>, row: Value) -> Result<T, ErrorInfo> {
    serde_json::from_value(row).map_err(|error| {
        ErrorInfo::internal(format!("{} row could not be decoded: {error}", table.name()))
    })
}

fn decode_rows<T: Record>(table: Table<T>, rows: Vec<Value>) -> Result<Vec<T>, ErrorInfo> {
    rows.into_iter().map(|row| decode_row(table, row)).collect()
}

fn single_row<T: Record>(table: Table<T>, id: &T::Id, rows: Vec<Value>) -> Result<T, ErrorInfo> {
    let mut rows = rows.into_iter();
    match (rows.next(), rows.next()) {
        (None, _) => Err(
            ErrorInfo::not_found(format!("{} record {id} not found", table.name()))
                .with_details(json!({ "table": table.name(), "id": id.to_string() })),
        ),
        (Some(row), None) => decode_row(table, row),
        (Some(_), Some(_)) => Err(ErrorInfo::internal(format!(
            "{} key {id} matched more than one row",
            table.name()
        ))),
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
