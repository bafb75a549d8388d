//! Workflow endpoint client

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use super::error::SaveError;
use super::payload::{SavePayload, SaveResponse, WorkflowSnapshot};
use crate::config::ServerConfig;

/// Where a workflow is persisted
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Endpoint used for logging and error messages
    fn endpoint(&self) -> &str;

    /// Submit a snapshot of the canvas. `Ok` only when the server reports success.
    async fn save(&self, payload: &SavePayload) -> Result<(), SaveError>;

    /// Load the stored steps and configurations
    async fn fetch(&self) -> Result<WorkflowSnapshot, SaveError>;
}

/// JSON-over-HTTP backend talking to the workflow builder page
pub struct HttpBackend {
    url: String,
    csrf_header: String,
    csrf_token: Option<String>,
    client: Client,
}

impl HttpBackend {
    pub fn new(
        url: impl Into<String>,
        csrf_header: impl Into<String>,
        csrf_token: Option<String>,
    ) -> Result<Self, SaveError> {
        let url = url.into();
        let client = Client::builder()
            .user_agent(concat!("workflow-builder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SaveError::transport(url.clone(), e))?;

        Ok(Self {
            url,
            csrf_header: csrf_header.into(),
            csrf_token,
            client,
        })
    }

    /// Build from server settings, reading the anti-forgery token from the environment
    pub fn from_config(config: &ServerConfig) -> Result<Self, SaveError> {
        let token = std::env::var(&config.csrf_token_env)
            .ok()
            .filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(
                env_var = %config.csrf_token_env,
                "CSRF token environment variable is not set or empty; saves may be rejected"
            );
        }
        Self::new(config.workflow_url(), config.csrf_header.clone(), token)
    }

    fn with_csrf(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.csrf_token {
            Some(token) => request.header(self.csrf_header.as_str(), token.as_str()),
            None => request,
        }
    }
}

#[async_trait]
impl WorkflowBackend for HttpBackend {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn save(&self, payload: &SavePayload) -> Result<(), SaveError> {
        let request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload);

        let response = self
            .with_csrf(request)
            .send()
            .await
            .map_err(|e| SaveError::transport(self.url.clone(), e))?;

        // The server reports rejections in the body, on 200 and 400 alike
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SaveError::transport(self.url.clone(), e))?;

        let reply: SaveResponse = serde_json::from_str(&body)
            .map_err(|e| SaveError::invalid_response(self.url.clone(), e.to_string()))?;

        if reply.success {
            tracing::info!(
                url = %self.url,
                steps = payload.steps.len(),
                configs = payload.configs.len(),
                "Workflow saved"
            );
            Ok(())
        } else {
            tracing::warn!(
                url = %self.url,
                status = %status,
                error = reply.error.as_deref().unwrap_or(""),
                "Server rejected workflow"
            );
            Err(SaveError::Rejected {
                url: self.url.clone(),
                status: status.as_u16(),
                message: reply.error,
            })
        }
    }

    async fn fetch(&self) -> Result<WorkflowSnapshot, SaveError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SaveError::transport(self.url.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SaveError::invalid_response(
                self.url.clone(),
                format!("HTTP {status}"),
            ));
        }

        let snapshot = response
            .json::<WorkflowSnapshot>()
            .await
            .map_err(|e| SaveError::invalid_response(self.url.clone(), e.to_string()))?;

        tracing::debug!(url = %self.url, steps = snapshot.steps.len(), "Fetched stored workflow");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_workflow_url() {
        let config = ServerConfig {
            base_url: "http://localhost:8000".to_string(),
            workflow_id: 3,
            csrf_header: "X-CSRFToken".to_string(),
            csrf_token_env: "WORKFLOW_BUILDER_TEST_TOKEN_UNSET".to_string(),
        };
        let backend = HttpBackend::from_config(&config).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8000/builder/3/");
        assert!(backend.csrf_token.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) is closed on test machines
        let backend = HttpBackend::new("http://127.0.0.1:9/builder/1/", "X-CSRFToken", None)
            .unwrap();
        let payload = SavePayload {
            steps: Vec::new(),
            configs: Default::default(),
        };

        let err = backend.save(&payload).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.notification_text(), "Save failed.");
    }
}
