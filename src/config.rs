use crate::calculations::SchedulingMode;
use crate::calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
use crate::enrichment::{EnrichmentRules, KeywordEnricher};
use crate::schedule::Scheduler;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a config file when none is passed explicitly.
pub const CONFIG_ENV_VAR: &str = "PLAN_SCHEDULER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Everything a scheduler needs, loadable from a JSON file.
///
/// Every field is optional in the file:
///
/// ```json
/// {
///   "calendar": { "version": "2026", "working_days": ["Mon", "Tue"], "holidays": ["2026-01-01"] },
///   "mode": "list-order",
///   "enrich": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub calendar: WorkCalendarConfig,
    #[serde(default)]
    pub mode: SchedulingMode,
    #[serde(default = "enabled")]
    pub enrich: bool,
    #[serde(default)]
    pub enrichment: EnrichmentRules,
}

fn enabled() -> bool {
    true
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            calendar: WorkCalendarConfig::default(),
            mode: SchedulingMode::default(),
            enrich: true,
            enrichment: EnrichmentRules::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        Self::from_json_str(&text)
    }

    /// `path` if given, else the file named by `PLAN_SCHEDULER_CONFIG`, else defaults.
    pub fn from_env_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(env_path) if !env_path.is_empty() => Self::load(PathBuf::from(env_path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn calendar(&self) -> Result<WorkCalendar, ConfigError> {
        Ok(WorkCalendar::from_config(&self.calendar)?)
    }

    pub fn build_scheduler(&self) -> Result<Scheduler<WorkCalendar>, ConfigError> {
        let scheduler = Scheduler::new(self.calendar()?).with_mode(self.mode);
        Ok(if self.enrich {
            scheduler.with_enricher(KeywordEnricher::new(self.enrichment.clone()))
        } else {
            scheduler.without_enrichment()
        })
    }
}
