pub mod types;

pub use types::{
    AnalysisRequest, Finding, FindingKind, InterventionVerdict, RenderState, TextSpan,
};
