use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::payload::SubmissionPayload;
use crate::config::CrmConfig;
use crate::forms::FormKind;

const USER_AGENT: &str = concat!("talent-intake/", env!("CARGO_PKG_VERSION"));

/// What the CRM returned for an accepted submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmReceipt {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmFieldError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CrmError {
    #[error("crm client could not be configured: {0}")]
    Setup(String),
    #[error("crm unreachable: {0}")]
    Transport(String),
    #[error("crm rejected submission with status {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        errors: Vec<CrmFieldError>,
    },
}

/// Outbound delivery of a finished application.
#[async_trait]
pub trait CrmTransport: Send + Sync {
    async fn deliver(
        &self,
        form: FormKind,
        payload: &SubmissionPayload,
    ) -> Result<CrmReceipt, CrmError>;
}

/// HubSpot forms-integration client.
pub struct HubSpotClient {
    client: reqwest::Client,
    config: CrmConfig,
}

impl HubSpotClient {
    pub fn new(config: CrmConfig) -> Result<Self, CrmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| CrmError::Setup(err.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn submission_url(&self, form: FormKind) -> String {
        format!(
            "{}/submissions/v3/integration/submit/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.portal_id,
            self.config.forms.for_form(form)
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HubSpotAccepted {
    inline_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HubSpotRejection {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<CrmFieldError>,
}

#[async_trait]
impl CrmTransport for HubSpotClient {
    async fn deliver(
        &self,
        form: FormKind,
        payload: &SubmissionPayload,
    ) -> Result<CrmReceipt, CrmError> {
        let url = self.submission_url(form);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        debug!(form = form.slug(), fields = payload.fields.len(), "posting application to crm");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(payload)
            .send()
            .await
            .map_err(|err| CrmError::Transport(err.to_string()))?;

        let status = response.status();

        if status.is_success() {
            // Accepted even when the body cannot be read, so the caller never posts twice.
            let inline_message = match response.text().await {
                Ok(body) => serde_json::from_str::<HubSpotAccepted>(&body)
                    .ok()
                    .and_then(|accepted| accepted.inline_message),
                Err(err) => {
                    warn!(
                        form = form.slug(),
                        status = status.as_u16(),
                        error = %err,
                        "crm accepted application but the response body was unreadable"
                    );
                    None
                }
            };
            return Ok(CrmReceipt {
                status: status.as_u16(),
                inline_message,
            });
        }

        let body = response.text().await.unwrap_or_default();

        let (message, errors) = match serde_json::from_str::<HubSpotRejection>(&body) {
            Ok(rejection) => (
                rejection.message.unwrap_or_else(|| status.to_string()),
                rejection.errors,
            ),
            Err(_) if body.trim().is_empty() => (status.to_string(), Vec::new()),
            Err(_) => (body, Vec::new()),
        };

        error!(
            form = form.slug(),
            status = status.as_u16(),
            %message,
            "crm rejected application"
        );

        Err(CrmError::Rejected {
            status: status.as_u16(),
            message,
            errors,
        })
    }
}
