//! Reqwest-backed record store adapter.
//!
//! This adapter owns transport details only: URL and header construction,
//! timeout and HTTP error mapping, and decoding response bodies into rows.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use super::dto::{PostgrestErrorDto, RowsDto};
use super::query::{filter_params, select_params};
use crate::config::BackendConnection;
use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Filters, Projection};
use crate::outbound::http_support::{
    authorise, build_client, is_transport_status, service_root, status_message,
    transport_message,
};

const RETURN_REPRESENTATION: &str = "return=representation";

/// Record store talking to a PostgREST-compatible endpoint.
pub struct PostgrestRecordStore {
    client: Client,
    connection: BackendConnection,
    rest_root: Url,
}

impl PostgrestRecordStore {
    /// Build an adapter using the connection's timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::InvalidRequest`] when the base URL cannot
    /// carry a path or the HTTP client cannot be constructed.
    pub fn new(connection: BackendConnection) -> Result<Self, RecordStoreError> {
        let rest_root = service_root(connection.base_url(), &["rest", "v1"]).ok_or_else(|| {
            RecordStoreError::invalid_request(format!(
                "backend url {} cannot be used as a base",
                connection.base_url()
            ))
        })?;
        let client = build_client(&connection).map_err(|error| {
            RecordStoreError::invalid_request(format!("http client could not be built: {error}"))
        })?;
        Ok(Self {
            client,
            connection,
            rest_root,
        })
    }

    /// Authorised request against `table`, ready for extra query parameters.
    ///
    /// This is the escape hatch used with
    /// [`RecordAccess::execute_query`](crate::domain::data_access::RecordAccess::execute_query)
    /// for joins, ordering, and other PostgREST features the port does not model.
    pub fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let builder = self.client.request(method.clone(), self.table_url(table));
        let builder = authorise(builder, &self.connection);
        match self.connection.schema() {
            Some(schema) if method == Method::GET || method == Method::HEAD => {
                builder.header("Accept-Profile", schema)
            }
            Some(schema) => builder.header("Content-Profile", schema),
            None => builder,
        }
    }

    /// Send `builder` and decode the response body as rows.
    ///
    /// # Errors
    ///
    /// Network faults, timeouts, and 5xx statuses map to
    /// [`RecordStoreError::Transport`]; other failure statuses map to
    /// [`RecordStoreError::Rejected`]; unreadable bodies map to
    /// [`RecordStoreError::Decode`].
    pub async fn send_rows(&self, builder: RequestBuilder) -> Result<Vec<Value>, RecordStoreError> {
        let response = builder
            .send()
            .await
            .map_err(|error| RecordStoreError::transport(transport_message(&error)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| RecordStoreError::transport(transport_message(&error)))?;
        debug!(status = status.as_u16(), bytes = body.len(), "record store response");
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_rows(body.as_ref())
    }

    fn table_url(&self, table: &str) -> Url {
        let mut url = self.rest_root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(table);
        }
        url
    }

    fn write(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, table)
            .header("Prefer", RETURN_REPRESENTATION)
    }
}

#[async_trait]
impl RecordStore for PostgrestRecordStore {
    async fn select(
        &self,
        table: &str,
        projection: &Projection,
        filters: &Filters,
    ) -> Result<Vec<Value>, RecordStoreError> {
        validate_table(table)?;
        let params = select_params(projection, filters)?;
        self.send_rows(self.request(Method::GET, table).query(&params))
            .await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, RecordStoreError> {
        validate_table(table)?;
        self.send_rows(self.write(Method::POST, table).json(&rows))
            .await
    }

    async fn update(
        &self,
        table: &str,
        filters: &Filters,
        patch: Value,
    ) -> Result<Vec<Value>, RecordStoreError> {
        validate_table(table)?;
        let params = scoped_filter_params(table, filters)?;
        self.send_rows(self.write(Method::PATCH, table).query(&params).json(&patch))
            .await
    }

    async fn delete(
        &self,
        table: &str,
        filters: &Filters,
    ) -> Result<Vec<Value>, RecordStoreError> {
        validate_table(table)?;
        let params = scoped_filter_params(table, filters)?;
        self.send_rows(self.write(Method::DELETE, table).query(&params))
            .await
    }
}

fn validate_table(table: &str) -> Result<(), RecordStoreError> {
    if table.trim().is_empty() {
        return Err(RecordStoreError::invalid_request("table name must not be blank"));
    }
    Ok(())
}

/// Filter parameters for a write; unfiltered writes would touch every row.
fn scoped_filter_params(
    table: &str,
    filters: &Filters,
) -> Result<Vec<(String, String)>, RecordStoreError> {
    let params = filter_params(filters)?;
    if params.is_empty() {
        return Err(RecordStoreError::invalid_request(format!(
            "refusing to write to every row of {table}"
        )));
    }
    Ok(params)
}

fn parse_rows(body: &[u8]) -> Result<Vec<Value>, RecordStoreError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice::<RowsDto>(body)
        .map(RowsDto::into_rows)
        .map_err(|error| RecordStoreError::decode(format!("invalid rows payload: {error}")))
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RecordStoreError {
    if is_transport_status(status) {
        return RecordStoreError::transport(status_message(status, body));
    }
    let dto = serde_json::from_slice::<PostgrestErrorDto>(body).unwrap_or_default();
    let details = dto.detail_object();
    let message = dto
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| status_message(status, body));
    let code = dto
        .code
        .filter(|code| !code.trim().is_empty())
        .unwrap_or_else(|| status.as_u16().to_string());
    RecordStoreError::rejected(message, code, details)
}
