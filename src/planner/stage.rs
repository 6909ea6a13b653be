use std::fmt;

/// Steps a single plan request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Extraction,
    GoalValidation,
    PlanCompletion,
    PlanParsing,
    SchemaValidation,
    Persistence,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageKind::Extraction => "extraction",
            StageKind::GoalValidation => "goal-validation",
            StageKind::PlanCompletion => "plan-completion",
            StageKind::PlanParsing => "plan-parsing",
            StageKind::SchemaValidation => "schema-validation",
            StageKind::Persistence => "persistence",
        };
        write!(f, "{label}")
    }
}
