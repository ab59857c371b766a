use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::ObjectLocation;
use crate::errors::{DatabaseError, Result};
use crate::source::{MessageDatabase, ObjectStore};
use crate::telemetry::InvocationMetrics;

pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Proxy-style response returned by the remote handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl PageResponse {
    pub fn html(body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), HTML_CONTENT_TYPE.to_string());
        Self {
            status_code: 200,
            headers,
            body,
        }
    }
}

/// Both values are interpolated verbatim, without escaping.
pub fn render_html(object_text: &str, message: &str) -> String {
    format!("<html><body><h1>{object_text}</h1><h2>{message}</h2></body></html>")
}

/// Reads one object and one row, then renders them into a page.
///
/// The store and database handles are created once and shared; each call to
/// [`PageRenderer::render`] still opens and closes its own connection.
pub struct PageRenderer {
    store: Arc<dyn ObjectStore>,
    database: Arc<dyn MessageDatabase>,
    location: ObjectLocation,
}

impl PageRenderer {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        database: Arc<dyn MessageDatabase>,
        location: ObjectLocation,
    ) -> Self {
        Self {
            store,
            database,
            location,
        }
    }

    pub fn location(&self) -> &ObjectLocation {
        &self.location
    }

    /// High-level:
    /// 1. Fetch the object text.
    /// 2. Open a connection, read the first message, close the connection.
    /// 3. Render the page.
    ///
    /// The reads are sequential and any failure is returned as is.
    pub async fn render(&self) -> Result<PageResponse> {
        let started = Instant::now();
        let mut metrics = InvocationMetrics::default();

        let object_text = self.store.get_text(&self.location).await.map_err(|e| {
            error!("Reading {} failed: {}", self.location.uri(), e);
            e
        })?;
        metrics.object_bytes = object_text.len();
        metrics.object_read_ms = started.elapsed().as_millis();

        let query_started = Instant::now();
        let message = self.read_first_message().await.map_err(|e| {
            error!("Reading the first message failed: {}", e);
            e
        })?;
        metrics.row_bytes = message.len();
        metrics.query_ms = query_started.elapsed().as_millis();

        let response = PageResponse::html(render_html(&object_text, &message));
        metrics.total_ms = started.elapsed().as_millis();
        info!("Rendered page: {:?}", metrics);

        Ok(response)
    }

    async fn read_first_message(&self) -> std::result::Result<String, DatabaseError> {
        let mut conn = self.database.connect().await?;
        let row = conn.first_message().await;
        // Close before surfacing a query error so the connection never outlives the call.
        let closed = conn.close().await;

        let row = row?.ok_or(DatabaseError::NoRows)?;
        closed?;
        // NULL renders as an empty heading.
        Ok(row.content.unwrap_or_default())
    }
}
