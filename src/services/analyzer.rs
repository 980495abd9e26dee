use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::AnalyzerSettings;
use crate::core::{HeuristicAnalyzer, StaticAnalyzer};
use crate::error::ScoringError;
use crate::models::AnalysisSignals;

/// Errors that can occur when running static analysis
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Analyzer returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Analyzer misconfigured: {0}")]
    Misconfigured(String),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    source_text: &'a str,
    expected_language: &'a str,
}

/// Client for an external static-analysis service
///
/// POST {base_url}/analyze returns the six grading signals, or 422 when
/// the code cannot be parsed.
pub struct RemoteAnalyzerClient {
    base_url: String,
    client: Client,
}

impl RemoteAnalyzerClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AnalyzerError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    pub async fn analyze(
        &self,
        source_text: &str,
        expected_language: &str,
    ) -> Result<AnalysisSignals, AnalyzerError> {
        let url = format!("{}/analyze", self.base_url.trim_end_matches('/'));

        tracing::debug!("Requesting analysis from: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest {
                source_text,
                expected_language,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let reason = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("analyzer could not parse the submission")
                .to_string();
            return Err(ScoringError::UnparsableSubmission(reason).into());
        }

        if !status.is_success() {
            return Err(AnalyzerError::ApiError(format!(
                "Analysis failed: {}",
                status
            )));
        }

        response
            .json::<AnalysisSignals>()
            .await
            .map_err(|e| AnalyzerError::InvalidResponse(format!("Failed to parse signals: {}", e)))
    }
}

/// Static analyzer selected by configuration
pub enum AnalyzerBackend {
    Heuristic(HeuristicAnalyzer),
    Remote(RemoteAnalyzerClient),
}

impl AnalyzerBackend {
    pub fn from_settings(settings: &AnalyzerSettings) -> Result<Self, AnalyzerError> {
        match settings.mode.as_str() {
            "heuristic" => Ok(Self::Heuristic(HeuristicAnalyzer)),
            "remote" => {
                let endpoint = settings.endpoint.clone().ok_or_else(|| {
                    AnalyzerError::Misconfigured("remote mode needs an endpoint".to_string())
                })?;
                let client =
                    RemoteAnalyzerClient::new(endpoint, Duration::from_secs(settings.timeout_secs))?;
                Ok(Self::Remote(client))
            }
            other => Err(AnalyzerError::Misconfigured(format!(
                "unknown analyzer mode: {}",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Heuristic(_) => "heuristic",
            Self::Remote(_) => "remote",
        }
    }

    pub async fn analyze(
        &self,
        source_text: &str,
        expected_language: &str,
    ) -> Result<AnalysisSignals, AnalyzerError> {
        match self {
            Self::Heuristic(analyzer) => Ok(analyzer.analyze(source_text, expected_language)?),
            Self::Remote(client) => client.analyze(source_text, expected_language).await,
        }
    }
}
