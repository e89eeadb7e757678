//! HTTP analysis collaborator

use analysis_scheduler::{parse_response, AnalyzeError, Analyzer};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared_types::AnalysisRequest;
use std::time::Duration;
use tracing::debug;

/// Calls `POST {endpoint}/api/analyze`
pub struct HttpAnalyzer {
    client: Client,
    url: String,
}

pub fn analyze_url(endpoint: &str) -> String {
    format!("{}/api/analyze", endpoint.trim_end_matches('/'))
}

impl HttpAnalyzer {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: analyze_url(endpoint),
        })
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, request: AnalysisRequest) -> Result<Value, AnalyzeError> {
        debug!(url = %self.url, chars = request.text.chars().count(), "POST analyze");
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;
        parse_response(status, &body)
    }
}
