pub mod calculations;
pub mod calendar;
pub mod config;
pub mod enrichment;
pub mod export;
pub mod goal;
pub mod graph;
pub mod plan;
pub mod schedule;
pub mod summary;
pub mod table;
pub mod task;
pub mod task_validation;

pub use calculations::{ForwardPass, SchedulingMode};
pub use calendar::{CalendarError, WorkCalendar, WorkCalendarConfig, WorkingDayCalendar};
pub use config::{ConfigError, PlannerConfig};
pub use enrichment::{EnrichmentRules, KeywordEnricher, TaskEnricher};
pub use export::{ExportError, save_plan_to_json, save_tasks_to_csv, write_plan_json, write_tasks_csv};
pub use goal::extract_duration_days;
pub use plan::{Plan, PlanError, parse_model_response};
pub use schedule::{ScheduleError, Scheduler};
pub use summary::PlanSummary;
pub use table::{render_text_table, tasks_dataframe};
pub use task::{Subtask, Task, TaskId};
pub use task_validation::TaskValidationError;
