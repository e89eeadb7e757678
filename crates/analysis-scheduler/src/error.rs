use serde_json::Value;
use thiserror::Error;

/// Longest slice of a failing response body surfaced to the user
pub const MAX_ERROR_BODY_CHARS: usize = 240;

/// Failure of the analyze collaborator call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Backend error ({status}). {body}")]
    Status { status: u16, body: String },

    #[error("Backend error ({status}). {body}")]
    InvalidJson { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),
}

impl AnalyzeError {
    /// Non-2xx response
    pub fn status(status: u16, raw_body: &str) -> Self {
        AnalyzeError::Status {
            status,
            body: truncate_body(raw_body),
        }
    }

    /// Successful status with a body that is not JSON
    pub fn invalid_json(status: u16, raw_body: &str) -> Self {
        AnalyzeError::InvalidJson {
            status,
            body: truncate_body(raw_body),
        }
    }
}

/// Classify an HTTP response from the analysis service
pub fn parse_response(status: u16, body: &str) -> Result<Value, AnalyzeError> {
    if !(200..300).contains(&status) {
        return Err(AnalyzeError::status(status, body));
    }
    serde_json::from_str(body).map_err(|_| AnalyzeError::invalid_json(status, body))
}

fn truncate_body(raw: &str) -> String {
    if raw.is_empty() {
        "No response body".to_string()
    } else {
        raw.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}

/// Invalid engine configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Debounce must be greater than zero")]
    ZeroDebounce,

    #[error("Max wait ({max_wait_ms}ms) must exceed debounce ({debounce_ms}ms)")]
    MaxWaitNotAboveDebounce { debounce_ms: u64, max_wait_ms: u64 },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = AnalyzeError::status(502, "Bad gateway");
        assert_eq!(err.to_string(), "Backend error (502). Bad gateway");
    }

    #[test]
    fn test_empty_body_placeholder() {
        let err = AnalyzeError::invalid_json(200, "");
        assert_eq!(err.to_string(), "Backend error (200). No response body");
    }

    #[test]
    fn test_body_is_truncated() {
        let body = "x".repeat(1000);
        match AnalyzeError::status(500, &body) {
            AnalyzeError::Status { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_CHARS),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(
            parse_response(200, r#"{"findings": []}"#),
            Ok(serde_json::json!({"findings": []}))
        );
        assert_eq!(
            parse_response(404, "missing"),
            Err(AnalyzeError::status(404, "missing"))
        );
        assert_eq!(
            parse_response(200, "<html>"),
            Err(AnalyzeError::invalid_json(200, "<html>"))
        );
    }

    #[test]
    fn test_transport_error_message() {
        let err = AnalyzeError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Request failed: connection refused");
    }
}
