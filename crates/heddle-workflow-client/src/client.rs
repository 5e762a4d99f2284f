//! Persistence API client
//!
//! The editor talks to the backend through the `WorkflowBackend` trait so
//! hosts and tests can substitute transports; the shipped implementation is
//! a thin reqwest JSON client.

use async_trait::async_trait;
use thiserror::Error;

use crate::document::WorkflowDocument;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from the persistence API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Unexpected status {status} updating workflow '{workflow_id}'")]
    UnexpectedStatus { workflow_id: String, status: u16 },
}

/// Asynchronous persistence boundary for workflow documents
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Replace the stored definition of a workflow
    async fn update_workflow(&self, workflow_id: &str, document: &WorkflowDocument) -> Result<()>;
}

/// reqwest-backed client against the workflow API
pub struct HttpWorkflowBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpWorkflowBackend {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// The API base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn workflow_url(&self, workflow_id: &str) -> String {
        format!("{}/wf/{}", self.base_url, workflow_id)
    }
}

#[async_trait]
impl WorkflowBackend for HttpWorkflowBackend {
    async fn update_workflow(&self, workflow_id: &str, document: &WorkflowDocument) -> Result<()> {
        let response = self
            .http
            .put(self.workflow_url(workflow_id))
            .json(document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                workflow_id: workflow_id.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
