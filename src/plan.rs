//! Plans as they arrive from the plan-generation service.
//!
//! Model output is loosely shaped: it may be wrapped in markdown fences,
//! nested under a `plan` key, or carry fields this crate has never heard of.
//! Parsing is strict only about the presence of a `tasks` array.

use crate::task::{Task, lenient_date};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan response was empty")]
    EmptyResponse,
    #[error("plan response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("plan has no tasks array")]
    MissingTasks,
    #[error("plan is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// A goal plus its ordered tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub goal: String,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Plan {
    pub fn new(goal: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            goal: goal.into(),
            start_date: None,
            tasks,
            extra: Map::new(),
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn from_value(value: Value) -> Result<Self, PlanError> {
        if !value.get("tasks").is_some_and(Value::is_array) {
            return Err(PlanError::MissingTasks);
        }
        serde_json::from_value(value).map_err(PlanError::Malformed)
    }

    /// Parse raw model output (fenced or not, enveloped or not) into a plan.
    pub fn from_json_str(text: &str) -> Result<Self, PlanError> {
        Self::from_value(parse_model_response(text)?)
    }

    /// The plan's own start date, or `today` when it has none.
    pub fn effective_start(&self, today: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or(today)
    }

    pub fn to_value(&self) -> Result<Value, PlanError> {
        serde_json::to_value(self).map_err(PlanError::Malformed)
    }
}

fn fence_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)```(?:json)?").expect("Invalid regex"))
}

/// Strip markdown fences, parse JSON and unwrap a `{"plan": {...}}` envelope.
pub fn parse_model_response(text: &str) -> Result<Value, PlanError> {
    let stripped = fence_regex().replace_all(text, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return Err(PlanError::EmptyResponse);
    }
    let value: Value = serde_json::from_str(trimmed).map_err(PlanError::InvalidJson)?;
    Ok(unwrap_envelope(value))
}

fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !map.contains_key("tasks") && map.contains_key("plan") => {
            match map.remove("plan") {
                Some(inner @ Value::Object(_)) => inner,
                Some(other) => {
                    map.insert("plan".to_string(), other);
                    Value::Object(map)
                }
                None => Value::Object(map),
            }
        }
        other => other,
    }
}
