use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Row};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::errors::DatabaseError;
use crate::source::{MessageConnection, MessageDatabase, MessageRow};

pub const FIRST_MESSAGE_QUERY: &str = "SELECT content FROM messages LIMIT 1";

/// MySQL message table reader. Every `connect` dials a fresh connection.
pub struct MySqlMessageDatabase {
    options: MySqlConnectOptions,
    host: String,
    connect_timeout: Duration,
}

impl MySqlMessageDatabase {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database_name);

        Self {
            options,
            host: config.host.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}

#[async_trait]
impl MessageDatabase for MySqlMessageDatabase {
    async fn connect(&self) -> Result<Box<dyn MessageConnection>, DatabaseError> {
        debug!("Connecting to {}", self.host);

        let conn = tokio::time::timeout(
            self.connect_timeout,
            MySqlConnection::connect_with(&self.options),
        )
        .await
        .map_err(|_| DatabaseError::ConnectTimeout {
            host: self.host.clone(),
            seconds: self.connect_timeout.as_secs(),
        })?
        .map_err(|e| DatabaseError::Connection {
            host: self.host.clone(),
            reason: e.to_string(),
        })?;

        Ok(Box::new(MySqlMessageConnection { conn }))
    }
}

struct MySqlMessageConnection {
    conn: MySqlConnection,
}

#[async_trait]
impl MessageConnection for MySqlMessageConnection {
    async fn first_message(&mut self) -> Result<Option<MessageRow>, DatabaseError> {
        let row = sqlx::query(FIRST_MESSAGE_QUERY)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| DatabaseError::Query {
                reason: e.to_string(),
            })?;

        // A NULL `content` still counts as a row.
        row.map(|row| row.try_get::<Option<String>, _>(0))
            .transpose()
            .map(|content| content.map(|content| MessageRow { content }))
            .map_err(|e| DatabaseError::Query {
                reason: e.to_string(),
            })
    }

    async fn close(self: Box<Self>) -> Result<(), DatabaseError> {
        self.conn.close().await.map_err(|e| DatabaseError::Close {
            reason: e.to_string(),
        })
    }
}
