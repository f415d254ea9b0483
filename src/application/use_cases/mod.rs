//! # Use Cases
//!
//! - [`AssessmentWorkflow`]: aggregate parts, collect quotes, build the report

pub mod assessment_workflow;

pub use assessment_workflow::{
    AssessmentInput, AssessmentReport, AssessmentWorkflow, MarketAverageStatus,
    PartQuoteListing, RecommendationStatus, RequestSummary, WorkflowConfig,
};
