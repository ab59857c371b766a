use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_lambda::Client as LambdaClient;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::types::InvocationType;
use tracing::{debug, warn};

use crate::errors::InvokeError;

#[cfg(test)]
use mockall::automock;

/// Synchronous call-and-wait invocation of a named remote function.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Invokes `function_name` with no payload and returns the response
    /// payload decoded as UTF-8.
    async fn invoke(&self, function_name: &str) -> Result<String, InvokeError>;
}

#[derive(Clone)]
pub struct LambdaInvoker {
    client: LambdaClient,
}

impl LambdaInvoker {
    pub fn new(client: LambdaClient) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(LambdaClient::new(&aws_config))
    }
}

#[async_trait]
impl FunctionInvoker for LambdaInvoker {
    async fn invoke(&self, function_name: &str) -> Result<String, InvokeError> {
        debug!("Invoking {}", function_name);

        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .send()
            .await
            .map_err(|e| InvokeError::Request {
                function: function_name.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        // The call itself succeeded but the function raised.
        if let Some(kind) = output.function_error() {
            let payload = output
                .payload()
                .map(|p| String::from_utf8_lossy(p.as_ref()).to_string())
                .unwrap_or_default();
            warn!("Function {} reported {}: {}", function_name, kind, payload);
            return Err(InvokeError::FunctionFailed {
                function: function_name.to_string(),
                kind: kind.to_string(),
                payload,
            });
        }

        // A function that returns nothing yields an empty body.
        let payload = output.payload().map(|p| p.as_ref().to_vec()).unwrap_or_default();

        String::from_utf8(payload).map_err(|_| InvokeError::InvalidPayload {
            function: function_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_lambda::config::{Credentials, Region};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INVOKE_PATH: &str = "/2015-03-31/functions/ReadS3RDSData/invocations";

    fn create_test_invoker(endpoint: &str) -> LambdaInvoker {
        let config = aws_sdk_lambda::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .endpoint_url(endpoint)
            .build();
        LambdaInvoker::new(LambdaClient::from_conf(config))
    }

    #[tokio::test]
    async fn test_invoke_returns_payload_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .expect(1)
            .mount(&server)
            .await;

        let invoker = create_test_invoker(&server.uri());
        let payload = invoker.invoke("ReadS3RDSData").await.unwrap();

        assert_eq!(payload, "hello");
    }

    #[tokio::test]
    async fn test_invoke_sends_request_response_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .and(wiremock::matchers::header("x-amz-invocation-type", "RequestResponse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let invoker = create_test_invoker(&server.uri());
        assert_eq!(invoker.invoke("ReadS3RDSData").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_invoke_non_utf8_payload_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff]))
            .mount(&server)
            .await;

        let invoker = create_test_invoker(&server.uri());
        let err = invoker.invoke("ReadS3RDSData").await.unwrap_err();

        assert!(matches!(err, InvokeError::InvalidPayload { ref function } if function == "ReadS3RDSData"));
    }

    #[tokio::test]
    async fn test_invoke_empty_payload_is_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let invoker = create_test_invoker(&server.uri());
        assert_eq!(invoker.invoke("ReadS3RDSData").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_invoke_function_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-amz-function-error", "Unhandled")
                    .set_body_string(r#"{"errorType":"NoRows","errorMessage":"Query returned no rows"}"#),
            )
            .mount(&server)
            .await;

        let invoker = create_test_invoker(&server.uri());
        let err = invoker.invoke("ReadS3RDSData").await.unwrap_err();

        match err {
            InvokeError::FunctionFailed {
                function,
                kind,
                payload,
            } => {
                assert_eq!(function, "ReadS3RDSData");
                assert_eq!(kind, "Unhandled");
                assert!(payload.contains("Query returned no rows"));
            }
            other => panic!("Expected FunctionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_access_denied_is_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-amzn-errortype", "AccessDeniedException")
                    .set_body_string(r#"{"Message":"not authorized"}"#),
            )
            .mount(&server)
            .await;

        let invoker = create_test_invoker(&server.uri());
        let err = invoker.invoke("ReadS3RDSData").await.unwrap_err();

        assert!(matches!(err, InvokeError::Request { ref function, .. } if function == "ReadS3RDSData"));
    }
}
