use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::{ConfigError, Result as ReadoutResult};

pub const RDS_HOST: &str = "RDS_HOST";
pub const DB_USERNAME: &str = "DB_USERNAME";
pub const DB_PASSWORD: &str = "DB_PASSWORD";
pub const DB_NAME: &str = "DB_NAME";
pub const S3_BUCKET: &str = "S3_BUCKET";
pub const S3_KEY: &str = "S3_KEY";

pub const FUNCTION_NAME_VAR: &str = "READOUT_FUNCTION_NAME";
pub const BIND_ADDR_VAR: &str = "READOUT_BIND_ADDR";

pub const DEFAULT_FUNCTION_NAME: &str = "ReadS3RDSData";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:80";

/// Everything the remote handler needs, resolved once at cold start.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerConfig {
    pub database: DatabaseConfig,
    pub object: ObjectLocation,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database_name: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

// Keeps the password out of logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database_name", &self.database_name)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

fn default_port() -> u16 {
    3306
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingField {
        field: name.to_string(),
    })
}

impl HandlerConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_string(),
            error: Box::new(e),
        })?;
        let config: HandlerConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_string(),
                error: Box::new(e),
            })?;
        Ok(config)
    }

    /// Reads the six required variables. The first one missing is named in the error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = DatabaseConfig {
            host: required_var(RDS_HOST)?,
            port: default_port(),
            username: required_var(DB_USERNAME)?,
            password: required_var(DB_PASSWORD)?,
            database_name: required_var(DB_NAME)?,
            connect_timeout_secs: default_connect_timeout_secs(),
        };
        let object = ObjectLocation {
            bucket: required_var(S3_BUCKET)?,
            key: required_var(S3_KEY)?,
        };
        Ok(Self { database, object })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            (RDS_HOST, &self.database.host),
            (DB_USERNAME, &self.database.username),
            (DB_NAME, &self.database.database_name),
            (S3_BUCKET, &self.object.bucket),
            (S3_KEY, &self.object.key),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("{name} cannot be empty"),
                });
            }
        }
        if self.database.connect_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "connect timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

pub async fn load_handler_config(config_path: Option<&str>) -> ReadoutResult<HandlerConfig> {
    let config = match config_path {
        Some(path) => HandlerConfig::from_file(path)?,
        None => HandlerConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    pub function_name: String,
    pub bind_addr: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl FrontendConfig {
    /// Unset variables fall back to the defaults; set-but-empty ones are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            function_name: env::var(FUNCTION_NAME_VAR).unwrap_or(defaults.function_name),
            bind_addr: env::var(BIND_ADDR_VAR).unwrap_or(defaults.bind_addr),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (FUNCTION_NAME_VAR, &self.function_name),
            (BIND_ADDR_VAR, &self.bind_addr),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("{name} cannot be empty"),
                });
            }
        }
        Ok(())
    }
}
