//! Goal extraction and plan generation.

mod parsing;
mod prompt;
mod service;
mod stage;
mod types;

pub use service::PlanService;
pub use stage::StageKind;
pub use types::SchemaError;
