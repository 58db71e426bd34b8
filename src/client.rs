//! HTTP client for the remote analysis API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::error::{extract_detail, SubmitError};
use crate::logging::{self, obj, v_str, Domain, ProfileScope};
use crate::report::AutopsyReport;
use crate::upload::CompleteSelection;

pub const RUN_AUTOPSY_PATH: &str = "run-autopsy";
pub const HEALTH_PATH: &str = "health";

/// The single backend operation the dashboard depends on.
#[async_trait]
pub trait AutopsyApi: Send + Sync {
    async fn run_autopsy(&self, files: CompleteSelection<'_>) -> Result<AutopsyReport, SubmitError>;

    /// Base URL as resolved from configuration, for messages.
    fn api_base(&self) -> String;
}

pub struct HttpAutopsyClient {
    client: Client,
    config: ClientConfig,
}

impl HttpAutopsyClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<String, SubmitError> {
        self.config
            .endpoint(path)
            .map(|u| u.to_string())
            .map_err(|e| SubmitError::Network {
                endpoint: format!("{}/{}", self.config.api.base, path),
                reason: e.to_string(),
            })
    }

    fn build_form(&self, files: &CompleteSelection<'_>, endpoint: &str) -> Result<Form, SubmitError> {
        let mut form = Form::new();
        for (slot, file) in files.parts() {
            logging::log_upload_part(slot.field(), &file.file_name, file.contents.len(), &file.sha256());
            let part = Part::bytes(file.contents.clone())
                .file_name(file.file_name.clone())
                .mime_str("text/csv")
                .map_err(|e| SubmitError::Network {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })?;
            form = form.part(slot.field(), part);
        }
        Ok(form)
    }

    /// `GET {API_URL}/health`. Returns the backend's JSON, or an empty
    /// object when it answers with something else.
    pub async fn health(&self) -> Result<Value, SubmitError> {
        let endpoint = self.endpoint(HEALTH_PATH)?;
        let resp = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| network_error(&endpoint, &e))?;
        let status = resp.status();
        logging::log_response(&endpoint, status.as_u16());
        let body = resp.bytes().await.map_err(|e| network_error(&endpoint, &e))?;
        if !status.is_success() {
            return Err(classify_status(status, &endpoint, &body));
        }
        Ok(serde_json::from_slice(&body).unwrap_or_else(|_| json!({})))
    }
}

#[async_trait]
impl AutopsyApi for HttpAutopsyClient {
    async fn run_autopsy(&self, files: CompleteSelection<'_>) -> Result<AutopsyReport, SubmitError> {
        let endpoint = self.endpoint(RUN_AUTOPSY_PATH)?;
        let form = self.build_form(&files, &endpoint)?;
        let _scope = ProfileScope::with_context("run_autopsy", &[("endpoint", v_str(&endpoint))]);

        logging::info(
            Domain::Http,
            "request",
            obj(&[("method", v_str("POST")), ("endpoint", v_str(&endpoint))]),
        );
        let resp = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(&endpoint, &e))?;

        let status = resp.status();
        logging::log_response(&endpoint, status.as_u16());
        let body = resp.bytes().await.map_err(|e| network_error(&endpoint, &e))?;

        if !status.is_success() {
            let err = classify_status(status, &endpoint, &body);
            logging::error(
                Domain::Http,
                "analysis_failed",
                obj(&[("endpoint", v_str(&endpoint)), ("error", v_str(&err.to_string()))]),
            );
            return Err(err);
        }

        AutopsyReport::from_slice(&body).map_err(|e| SubmitError::InvalidReport {
            reason: e.to_string(),
        })
    }

    fn api_base(&self) -> String {
        self.config.api.base.clone()
    }
}

fn network_error(endpoint: &str, err: &reqwest::Error) -> SubmitError {
    logging::error(
        Domain::Http,
        "network_error",
        obj(&[
            ("endpoint", v_str(endpoint)),
            ("timeout", Value::Bool(err.is_timeout())),
            ("connect", Value::Bool(err.is_connect())),
            ("reason", v_str(&err.to_string())),
        ]),
    );
    SubmitError::Network {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
}

/// Map a non-2xx response onto the submission taxonomy.
pub fn classify_status(status: StatusCode, endpoint: &str, body: &[u8]) -> SubmitError {
    let detail = extract_detail(body);
    match status.as_u16() {
        404 => SubmitError::NotFound {
            endpoint: endpoint.to_string(),
        },
        code @ 500..=599 => SubmitError::Server {
            status: code,
            endpoint: endpoint.to_string(),
            detail,
        },
        code => SubmitError::Rejected { status: code, detail },
    }
}
