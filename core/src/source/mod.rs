pub mod mysql;
pub mod s3;

use async_trait::async_trait;

use crate::config::ObjectLocation;
use crate::errors::{DatabaseError, StoreError};

#[cfg(test)]
use mockall::automock;

/// Read-only access to a blob store addressed by bucket and key.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches the object at `location` and decodes its body as UTF-8.
    async fn get_text(&self, location: &ObjectLocation) -> Result<String, StoreError>;
}

/// Opens one connection per call. Implementations must not pool or reuse
/// connections across calls.
#[async_trait]
pub trait MessageDatabase: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn MessageConnection>, DatabaseError>;
}

/// The first row of the messages query. `content` is `None` when the column is NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRow {
    pub content: Option<String>,
}

impl MessageRow {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// A single open database connection, used for one query and then closed.
#[async_trait]
pub trait MessageConnection: Send {
    /// First row of the messages query, or `None` when the table is empty.
    async fn first_message(&mut self) -> Result<Option<MessageRow>, DatabaseError>;

    async fn close(self: Box<Self>) -> Result<(), DatabaseError>;
}
