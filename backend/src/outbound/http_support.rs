//! Helpers shared by the reqwest-backed adapters.

use reqwest::{Client, RequestBuilder, StatusCode, Url};

use crate::config::BackendConnection;

pub(super) fn build_client(connection: &BackendConnection) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(connection.timeout()).build()
}

/// Attach the `apikey` header and bearer token every backend call needs.
pub(super) fn authorise(builder: RequestBuilder, connection: &BackendConnection) -> RequestBuilder {
    builder
        .header("apikey", connection.api_key())
        .bearer_auth(connection.api_key())
}

/// `{base}/{segments..}`, or `None` when the base URL cannot carry a path.
pub(super) fn service_root(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut root = base.clone();
    {
        let mut path = root.path_segments_mut().ok()?;
        path.pop_if_empty().extend(segments);
    }
    Some(root)
}

/// Statuses reported as transport faults rather than rejections.
pub(super) fn is_transport_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

pub(super) fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    }
}

pub(super) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

pub(super) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
