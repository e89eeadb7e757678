use async_trait::async_trait;
use serde_json::Value;
use shared_types::AnalysisRequest;

use crate::error::AnalyzeError;

/// The remote analysis collaborator
///
/// Implementations may take arbitrarily long; the scheduler never cancels a
/// call, it only ignores results that have been superseded.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest) -> Result<Value, AnalyzeError>;
}
