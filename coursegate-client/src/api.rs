//! HTTP client for the validation endpoint

use async_trait::async_trait;
use coursegate_core::{ErrorContext, GateError, GateResult, ValidateRequest, ValidateResponse};
use tracing::debug;
use url::Url;

/// The validation call made by the login form
#[async_trait]
pub trait ValidationApi: Send + Sync {
    /// Validate the credentials. Any non-2xx reply or transport failure is an
    /// error; the form treats all of them as a denial.
    async fn validate(&self, request: &ValidateRequest) -> GateResult<ValidateResponse>;
}

/// [`ValidationApi`] over HTTP using reqwest
#[derive(Debug, Clone)]
pub struct HttpValidationClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpValidationClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn network_error(&self, message: &str, source: reqwest::Error) -> GateError {
        GateError::Network {
            message: message.to_string(),
            source: Some(Box::new(source)),
            context: ErrorContext::new("validation_client")
                .with_operation("validate")
                .with_metadata("endpoint", self.endpoint.as_str()),
        }
    }
}

#[async_trait]
impl ValidationApi for HttpValidationClient {
    async fn validate(&self, request: &ValidateRequest) -> GateResult<ValidateResponse> {
        debug!(endpoint = %self.endpoint, "Sending validation request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.network_error("Validation request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                "Unable to validate credentials.".to_string()
            } else {
                body
            };
            return Err(GateError::AccessDenied {
                message,
                status: Some(status.as_u16()),
                context: ErrorContext::new("validation_client").with_operation("validate"),
            });
        }

        response
            .json::<ValidateResponse>()
            .await
            .map_err(|e| self.network_error("Unreadable validation response", e))
    }
}
