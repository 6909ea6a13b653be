use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::DynCompletionClient;
use crate::error::PlanError;
use crate::store::PlanStore;

use super::parsing::{ExtractionStatus, extract_goal_timeline, parse_completion_json};
use super::prompt::{build_extraction_prompt, build_planning_prompt};
use super::stage::StageKind;
use super::types::validate_plan;

/// Runs one plan request end to end: extract goal and timeline, ask for a
/// phased plan, check its shape, persist it.
///
/// The plan is returned and stored exactly as the model produced it, extra
/// keys included; the typed [`Plan`](super::types::Plan) only gates the shape.
#[derive(Clone)]
pub struct PlanService {
    client: Arc<DynCompletionClient>,
    store: PlanStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GoalTimeline {
    pub goal: String,
    pub timeline: String,
}

impl PlanService {
    pub fn new(client: Arc<DynCompletionClient>, store: PlanStore) -> Self {
        Self { client, store }
    }

    pub async fn create_plan(&self, query: &str) -> Result<Value, PlanError> {
        info!(query_chars = query.chars().count(), "plan request received");

        let target = self.extract_goal_timeline(query).await?;
        debug!(goal = %target.goal, timeline = %target.timeline, "goal extracted");

        let planning_prompt = build_planning_prompt(&target.goal, &target.timeline);
        let raw = self
            .client
            .complete(&planning_prompt)
            .await
            .map_err(|err| PlanError::internal(StageKind::PlanCompletion, err))?;
        debug!(stage = %StageKind::PlanCompletion, response = %raw, "plan completion");

        let value = parse_completion_json(&raw).map_err(|err| {
            warn!(stage = %StageKind::PlanParsing, error = %err, "plan response was not JSON");
            PlanError::PlanParse(err)
        })?;
        let plan = validate_plan(&value)?;
        for issue in plan.advisory_issues() {
            warn!(stage = %StageKind::SchemaValidation, %issue, "plan ordering issue");
        }

        let path = self
            .store
            .store(&planning_prompt, &value)
            .map_err(|err| PlanError::internal(StageKind::Persistence, err))?;
        info!(
            path = %path.display(),
            phases = plan.phases.len(),
            tasks = plan.tasks().count(),
            "plan stored"
        );

        Ok(value)
    }

    async fn extract_goal_timeline(&self, query: &str) -> Result<GoalTimeline, PlanError> {
        let prompt = build_extraction_prompt(query);
        let raw = self.client.complete(&prompt).await.map_err(|err| {
            let detail = format!("{err:#}");
            warn!(stage = %StageKind::Extraction, error = %detail, "completion failed");
            PlanError::ExtractionRuntime("completion request failed".to_string())
        })?;
        debug!(stage = %StageKind::Extraction, response = %raw, "extraction completion");

        let extraction = extract_goal_timeline(&raw);
        match extraction.status {
            ExtractionStatus::Ok => {}
            ExtractionStatus::JsonDecodeError => return Err(PlanError::ExtractionParse),
            ExtractionStatus::Error(description) => {
                return Err(PlanError::ExtractionRuntime(description));
            }
        }

        // Whitespace-only goals count as empty too.
        if extraction.goal.trim().is_empty() {
            debug!(stage = %StageKind::GoalValidation, "extracted goal is empty");
            return Err(PlanError::EmptyGoal);
        }

        Ok(GoalTimeline {
            goal: extraction.goal,
            timeline: extraction.timeline,
        })
    }
}
