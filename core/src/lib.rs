pub mod config;
pub mod errors;
pub mod invoker;
pub mod page;
pub mod source;
pub mod telemetry;

pub use config::{FrontendConfig, HandlerConfig, ObjectLocation};
pub use errors::{ReadoutError, Result};
pub use invoker::{FunctionInvoker, LambdaInvoker};
pub use page::{PageRenderer, PageResponse};
pub use source::mysql::MySqlMessageDatabase;
pub use source::s3::S3ObjectStore;
