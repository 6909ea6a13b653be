use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Ordered phases of a generated plan. Serializes as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub phase_name: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: i64,
    pub task_name: String,
    pub description: String,
    pub start_day: i64,
    pub end_day: i64,
    pub dependencies: Vec<i64>,
}

/// Structural mismatch between the model's JSON and the plan shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct SchemaError {
    pub path: String,
    pub reason: String,
}

impl SchemaError {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Check required keys and value types, then build the typed plan.
///
/// Unknown keys are ignored here and left untouched in `value`. Ordering rules between tasks are not enforced
/// here; see [`Plan::advisory_issues`].
pub fn validate_plan(value: &Value) -> Result<Plan, SchemaError> {
    let Value::Array(raw_phases) = value else {
        return Err(SchemaError::new("$", "expected an array of phases"));
    };

    let phases = raw_phases
        .iter()
        .enumerate()
        .map(|(index, raw)| validate_phase(raw, &format!("$[{index}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Plan { phases })
}

fn validate_phase(value: &Value, path: &str) -> Result<Phase, SchemaError> {
    let fields = as_object(value, path)?;
    let phase_name = string_field(fields, path, "phase_name")?;

    let tasks_path = format!("{path}.tasks");
    let Some(raw_tasks) = fields.get("tasks") else {
        return Err(SchemaError::new(tasks_path, "missing required field"));
    };
    let Value::Array(raw_tasks) = raw_tasks else {
        return Err(SchemaError::new(tasks_path, "expected an array of tasks"));
    };

    let tasks = raw_tasks
        .iter()
        .enumerate()
        .map(|(index, raw)| validate_task(raw, &format!("{tasks_path}[{index}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Phase { phase_name, tasks })
}

fn validate_task(value: &Value, path: &str) -> Result<Task, SchemaError> {
    let fields = as_object(value, path)?;
    let task_id = integer_field(fields, path, "task_id")?;
    let task_name = string_field(fields, path, "task_name")?;
    let description = string_field(fields, path, "description")?;
    let start_day = integer_field(fields, path, "start_day")?;
    let end_day = integer_field(fields, path, "end_day")?;

    let deps_path = format!("{path}.dependencies");
    let dependencies = match fields.get("dependencies") {
        None => return Err(SchemaError::new(deps_path, "missing required field")),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                as_integer(item).ok_or_else(|| {
                    SchemaError::new(format!("{deps_path}[{index}]"), "expected an integer task id")
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(SchemaError::new(deps_path, "expected an array of task ids")),
    };

    Ok(Task {
        task_id,
        task_name,
        description,
        start_day,
        end_day,
        dependencies,
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::new(path, "expected an object"))
}

fn string_field(fields: &Map<String, Value>, path: &str, key: &str) -> Result<String, SchemaError> {
    match fields.get(key) {
        None => Err(SchemaError::new(format!("{path}.{key}"), "missing required field")),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(SchemaError::new(format!("{path}.{key}"), "expected a string")),
    }
}

fn integer_field(fields: &Map<String, Value>, path: &str, key: &str) -> Result<i64, SchemaError> {
    match fields.get(key) {
        None => Err(SchemaError::new(format!("{path}.{key}"), "missing required field")),
        Some(value) => as_integer(value)
            .ok_or_else(|| SchemaError::new(format!("{path}.{key}"), "expected an integer")),
    }
}

/// Integers, or floats with no fractional part (`3.0`), which models emit often.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(integer) = value.as_i64() {
        return Some(integer);
    }
    let float = value.as_f64()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    (float.fract() == 0.0 && in_range).then_some(float as i64)
}

impl Plan {
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.phases.iter().flat_map(|phase| phase.tasks.iter())
    }

    /// Ordering problems the model was asked to avoid. These are reported,
    /// not rejected.
    pub fn advisory_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut start_by_id: HashMap<i64, i64> = HashMap::new();

        for task in self.tasks() {
            if start_by_id.insert(task.task_id, task.start_day).is_some() {
                issues.push(format!("task id {} is used more than once", task.task_id));
            }
            if task.end_day < task.start_day {
                issues.push(format!(
                    "task {} ends on day {} before it starts on day {}",
                    task.task_id, task.end_day, task.start_day
                ));
            }
        }

        for task in self.tasks() {
            for dependency in &task.dependencies {
                match start_by_id.get(dependency) {
                    None => issues.push(format!(
                        "task {} depends on unknown task {}",
                        task.task_id, dependency
                    )),
                    Some(start) if *start > task.start_day => issues.push(format!(
                        "task {} depends on task {} which starts later",
                        task.task_id, dependency
                    )),
                    Some(_) => {}
                }
            }
        }

        issues
    }
}
