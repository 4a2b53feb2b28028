//! BLS public API (v2) integration for the CPI category series.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AppError;

/// Status string the API reports for a request it actually served.
const STATUS_OK: &str = "REQUEST_SUCCEEDED";

/// Environment variable holding the registration key.
pub const API_KEY_ENV: &str = "BLS_API_KEY";

/// Anything that can answer a batched series request.
///
/// `BlsClient` is the production implementation; tests substitute canned
/// responses or failures.
pub trait SeriesSource {
    fn fetch(&self, series_ids: &[&str], start_year: i32, end_year: i32) -> Result<BlsResponse, AppError>;
}

pub struct BlsClient {
    client: Client,
    api_key: String,
    url: String,
}

impl BlsClient {
    pub fn new(api_key: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            url: url.into(),
        })
    }
}

/// Read the registration key from the environment (or a `.env` file).
pub fn api_key_from_env() -> Result<String, AppError> {
    dotenvy::dotenv().ok();
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("Missing {API_KEY_ENV} in environment (.env).")))
}

impl SeriesSource for BlsClient {
    fn fetch(&self, series_ids: &[&str], start_year: i32, end_year: i32) -> Result<BlsResponse, AppError> {
        let request = BlsRequest {
            seriesid: series_ids,
            startyear: start_year.to_string(),
            endyear: end_year.to_string(),
            registrationkey: &self.api_key,
        };

        info!(
            series = series_ids.len(),
            start_year,
            end_year,
            url = %self.url,
            "requesting BLS series"
        );

        // `.json()` also sets `Content-Type: application/json`.
        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .map_err(|e| AppError::fetch(format!("BLS request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::fetch(format!("BLS request failed with status {status}.")));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::fetch(format!("Failed to read BLS response body: {e}")))?;
        debug!(bytes = body.len(), "received BLS response");

        parse_response(&body)
    }
}

/// Decode a response body, treating API-level refusals as fetch failures.
///
/// The API answers quota and key problems with HTTP 200 and a non-success
/// `status`, so the envelope is checked before the payload is decoded.
pub fn parse_response(body: &str) -> Result<BlsResponse, AppError> {
    let envelope: BlsEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::fetch(format!("Invalid BLS response: {e}")))?;

    if envelope.status != STATUS_OK {
        let detail = if envelope.message.is_empty() {
            String::new()
        } else {
            format!(": {}", envelope.message.join("; "))
        };
        return Err(AppError::fetch(format!("BLS returned {}{detail}", envelope.status)));
    }
    for msg in &envelope.message {
        warn!(message = %msg, "BLS notice");
    }

    serde_json::from_str(body).map_err(|e| AppError::fetch(format!("Invalid BLS response payload: {e}")))
}

#[derive(Debug, Serialize)]
struct BlsRequest<'a> {
    seriesid: &'a [&'a str],
    startyear: String,
    endyear: String,
    registrationkey: &'a str,
}

#[derive(Debug, Deserialize)]
struct BlsEnvelope {
    status: String,
    #[serde(default)]
    message: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlsResponse {
    pub status: String,
    #[serde(default)]
    pub message: Vec<String>,
    #[serde(rename = "Results")]
    pub results: BlsResults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlsResults {
    #[serde(default)]
    pub series: Vec<BlsSeries>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlsSeries {
    #[serde(rename = "seriesID")]
    pub series_id: String,
    #[serde(default)]
    pub data: Vec<BlsDatum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlsDatum {
    pub year: String,
    /// Month code, e.g. `M05`.
    pub period: String,
    pub value: RawValue,
}

/// Observation value; the API sends strings, but numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}
