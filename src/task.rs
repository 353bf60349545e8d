use chrono::NaiveDate;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Task identifier as produced upstream: either a JSON number or a string.
///
/// `1` and `"1"` name the same task; the JSON representation it arrived in is kept for
/// output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl TaskId {
    fn key(&self) -> Cow<'_, str> {
        match self {
            TaskId::Number(n) => Cow::Owned(n.to_string()),
            TaskId::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, TaskId::Text(s) if s.trim().is_empty())
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        TaskId::Number(value)
    }
}

impl From<i32> for TaskId {
    fn from(value: i32) -> Self {
        TaskId::Number(i64::from(value))
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        TaskId::Text(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        TaskId::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SubtaskRepr")]
pub struct Subtask {
    pub title: String,
    pub done: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            done: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubtaskRepr {
    Title(String),
    Full {
        title: String,
        #[serde(default)]
        done: bool,
    },
}

impl From<SubtaskRepr> for Subtask {
    fn from(value: SubtaskRepr) -> Self {
        match value {
            SubtaskRepr::Title(title) => Subtask::new(title),
            SubtaskRepr::Full { title, done } => Subtask { title, done },
        }
    }
}

/// One unit of work in a generated plan.
///
/// Scheduling fills `start_date`, `end_date`, `due_date` and `is_holiday`;
/// enrichment fills `category`, `subtasks`, `explanation` and
/// `expected_output`. Fields this crate does not know about are carried in
/// `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task_id", alias = "id")]
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "one_day", deserialize_with = "lenient_days")]
    pub estimated_days: u32,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub depends_on: Vec<TaskId>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(
        default,
        alias = "dueDate",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default,
        alias = "isHoliday",
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_holiday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>, estimated_days: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            estimated_days: estimated_days.max(1),
            depends_on: Vec::new(),
            start_date: None,
            end_date: None,
            due_date: None,
            is_holiday: None,
            category: None,
            subtasks: Vec::new(),
            explanation: None,
            expected_output: None,
            extra: Map::new(),
        }
    }

    pub fn with_depends_on<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Working days this task occupies; never less than one.
    pub fn duration(&self) -> u32 {
        self.estimated_days.max(1)
    }

    pub fn is_scheduled(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }

    pub(crate) fn assign_dates(&mut self, start: NaiveDate, end: NaiveDate, is_holiday: bool) {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self.due_date = Some(end);
        self.is_holiday = Some(is_holiday);
    }
}

fn one_day() -> u32 {
    1
}

/// Whole working days from any JSON value; fractions round up, anything
/// unusable becomes one day.
pub(crate) fn coerce_days(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(days) if days.is_finite() && days >= 1.0 => days.ceil().min(u32::MAX as f64) as u32,
        _ => 1,
    }
}

fn lenient_days<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_days(&value))
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<TaskId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let ids = match value {
        Value::Array(items) => items.into_iter().filter_map(id_from_value).collect(),
        Value::Null => Vec::new(),
        single => id_from_value(single).into_iter().collect(),
    };
    Ok(ids)
}

fn id_from_value(value: Value) -> Option<TaskId> {
    match value {
        Value::Number(n) => n.as_i64().map(TaskId::Number),
        Value::String(s) => Some(TaskId::Text(s)),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD` or anything starting with it (timestamps); other
/// values are treated as absent.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => parse_iso_date(&s),
        _ => None,
    })
}

pub(crate) fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}
