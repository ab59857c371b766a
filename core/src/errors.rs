use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Object store error: {0}")]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Failed to load configuration from {path}: {error}")]
    LoadFailed {
        path: String,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("Failed to download object from s3://{bucket}/{key}: {reason}")]
    Download {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Object s3://{bucket}/{key} is not valid UTF-8")]
    InvalidText { bucket: String, key: String },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to {host}: {reason}")]
    Connection { host: String, reason: String },

    #[error("Connecting to {host} timed out after {seconds}s")]
    ConnectTimeout { host: String, seconds: u64 },

    #[error("Query failed: {reason}")]
    Query { reason: String },

    #[error("Query returned no rows")]
    NoRows,

    #[error("Failed to close connection: {reason}")]
    Close { reason: String },
}

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Failed to invoke function {function}: {reason}")]
    Request { function: String, reason: String },

    #[error("Function {function} failed ({kind}): {payload}")]
    FunctionFailed {
        function: String,
        kind: String,
        payload: String,
    },

    #[error("Function {function} returned a payload that is not valid UTF-8")]
    InvalidPayload { function: String },
}

pub type Result<T> = std::result::Result<T, ReadoutError>;
