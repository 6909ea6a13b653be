//! Failures a plan request can end in, and how each is shown to callers.

use axum::http::StatusCode;
use thiserror::Error;

use crate::planner::{SchemaError, StageKind};

pub const EMPTY_GOAL_MESSAGE: &str = "Could not extract a valid goal from the user message.";
pub const PLAN_PARSE_MESSAGE: &str = "Failed to parse LLM response as JSON.";
pub const SCHEMA_MESSAGE: &str = "LLM response did not match the expected plan structure.";
pub const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

#[derive(Debug, Error)]
pub enum PlanError {
    /// The extraction completion was not JSON after fence stripping.
    #[error("goal extraction response was not valid JSON")]
    ExtractionParse,

    /// Any other failure while deriving the goal and timeline.
    #[error("goal extraction failed: {0}")]
    ExtractionRuntime(String),

    #[error("no goal could be extracted from the request")]
    EmptyGoal,

    #[error("plan response was not valid JSON: {0}")]
    PlanParse(#[source] serde_json::Error),

    #[error("plan response did not match the expected structure: {0}")]
    SchemaValidation(#[from] SchemaError),

    #[error("internal failure during {stage}: {cause:#}")]
    Internal {
        stage: StageKind,
        cause: anyhow::Error,
    },
}

impl PlanError {
    pub fn internal(stage: StageKind, cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            stage,
            cause: cause.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PlanError::ExtractionParse | PlanError::ExtractionRuntime(_) | PlanError::EmptyGoal => {
                StatusCode::BAD_REQUEST
            }
            PlanError::PlanParse(_) | PlanError::SchemaValidation(_) | PlanError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text safe to return to the caller. Never includes provider output,
    /// file paths or error chains.
    pub fn public_message(&self) -> String {
        match self {
            PlanError::ExtractionParse => "JSONDecodeError".to_string(),
            PlanError::ExtractionRuntime(description) => format!("Error {description}"),
            PlanError::EmptyGoal => EMPTY_GOAL_MESSAGE.to_string(),
            PlanError::PlanParse(_) => PLAN_PARSE_MESSAGE.to_string(),
            PlanError::SchemaValidation(_) => SCHEMA_MESSAGE.to_string(),
            PlanError::Internal { .. } => INTERNAL_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn extraction_failures_are_client_errors() {
        assert_eq!(PlanError::ExtractionParse.status(), StatusCode::BAD_REQUEST);
        assert_eq!(PlanError::EmptyGoal.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PlanError::ExtractionRuntime("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn extraction_messages_carry_classification() {
        assert_eq!(PlanError::ExtractionParse.public_message(), "JSONDecodeError");
        assert_eq!(
            PlanError::ExtractionRuntime("field 'goal' is not a string".to_string()).public_message(),
            "Error field 'goal' is not a string"
        );
    }

    #[test]
    fn plan_parse_is_server_error_with_fixed_message() {
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = PlanError::PlanParse(source);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), PLAN_PARSE_MESSAGE);
    }

    #[test]
    fn internal_detail_is_not_public() {
        let err = PlanError::internal(
            StageKind::Persistence,
            anyhow!("disk full at /secret/path"),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), INTERNAL_MESSAGE);
        assert!(err.to_string().contains("/secret/path"));
        assert!(err.to_string().contains("persistence"));
    }
}
