use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use readout_core::errors::InvokeError;
use readout_core::FunctionInvoker;
use tracing::{error, info};

/// Shared by every request. The invoker wraps one long-lived client.
#[derive(Clone)]
pub struct AppState {
    invoker: Arc<dyn FunctionInvoker>,
    function_name: Arc<str>,
}

impl AppState {
    pub fn new(invoker: Arc<dyn FunctionInvoker>, function_name: impl Into<Arc<str>>) -> Self {
        Self {
            invoker,
            function_name: function_name.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

/// Relays the function's payload as the page body, untouched.
async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    info!("Invoking {}", state.function_name);
    let body = state.invoker.invoke(&state.function_name).await?;
    Ok(Html(body))
}

#[derive(Debug)]
pub struct AppError(InvokeError);

impl From<InvokeError> for AppError {
    fn from(err: InvokeError) -> Self {
        AppError(err)
    }
}

// No diagnostic payload reaches the client; the cause is only logged.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
