use std::fmt;

use serde_json::Value;

const DEFAULT_TIMELINE: &str = "unspecified";

/// Remove literal markdown fence markers and surrounding whitespace.
///
/// This only strips the markers themselves. JSON wrapped in prose, or
/// followed by commentary, is left for the parser to reject.
pub(crate) fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

pub(crate) fn parse_completion_json(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(raw))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExtractionStatus {
    Ok,
    JsonDecodeError,
    Error(String),
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStatus::Ok => write!(f, "OK"),
            ExtractionStatus::JsonDecodeError => write!(f, "JSONDecodeError"),
            ExtractionStatus::Error(message) => write!(f, "Error {message}"),
        }
    }
}

/// Goal and timeline pulled out of the extraction completion.
///
/// An empty `goal` means nothing usable was extracted; `timeline` falls back
/// to `"unspecified"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Extraction {
    pub goal: String,
    pub timeline: String,
    pub status: ExtractionStatus,
}

impl Extraction {
    fn failed(status: ExtractionStatus) -> Self {
        Self {
            goal: String::new(),
            timeline: DEFAULT_TIMELINE.to_string(),
            status,
        }
    }
}

pub(crate) fn extract_goal_timeline(raw: &str) -> Extraction {
    let value = match parse_completion_json(raw) {
        Ok(value) => value,
        Err(_) => return Extraction::failed(ExtractionStatus::JsonDecodeError),
    };

    let Value::Object(fields) = value else {
        return Extraction::failed(ExtractionStatus::Error(
            "extraction response was not a JSON object".to_string(),
        ));
    };

    let goal = match fields.get("goal") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(goal)) => goal.clone(),
        Some(_) => {
            return Extraction::failed(ExtractionStatus::Error(
                "field 'goal' is not a string".to_string(),
            ));
        }
    };

    let timeline = match fields.get("timeline") {
        None | Some(Value::Null) => DEFAULT_TIMELINE.to_string(),
        Some(Value::String(timeline)) => timeline.clone(),
        Some(_) => {
            return Extraction::failed(ExtractionStatus::Error(
                "field 'timeline' is not a string".to_string(),
            ));
        }
    };

    Extraction {
        goal,
        timeline,
        status: ExtractionStatus::Ok,
    }
}
