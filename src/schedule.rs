use crate::calculations::{ForwardPass, SchedulingMode};
use crate::calendar::{WorkCalendar, WorkingDayCalendar};
use crate::enrichment::{KeywordEnricher, TaskEnricher};
use crate::plan::Plan;
use crate::summary::PlanSummary;
use crate::task::{Task, TaskId};
use crate::task_validation::TaskValidationError;
use chrono::NaiveDate;
use log::{info, warn};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("dependency cycle detected at task {task_id}")]
    CycleDetected { task_id: TaskId },
    #[error(transparent)]
    InvalidTasks(#[from] TaskValidationError),
}

/// Dates a plan against a working-day calendar, then enriches it.
pub struct Scheduler<C: WorkingDayCalendar = WorkCalendar> {
    calendar: C,
    mode: SchedulingMode,
    enricher: Option<Box<dyn TaskEnricher>>,
}

impl Default for Scheduler<WorkCalendar> {
    fn default() -> Self {
        Self::new(WorkCalendar::default())
    }
}

impl<C: WorkingDayCalendar> Scheduler<C> {
    /// Topological scheduling with the built-in keyword enricher.
    pub fn new(calendar: C) -> Self {
        Self {
            calendar,
            mode: SchedulingMode::default(),
            enricher: Some(Box::new(KeywordEnricher::default())),
        }
    }

    pub fn with_mode(mut self, mode: SchedulingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_enricher(mut self, enricher: impl TaskEnricher + 'static) -> Self {
        self.enricher = Some(Box::new(enricher));
        self
    }

    pub fn without_enrichment(mut self) -> Self {
        self.enricher = None;
        self
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    pub fn mode(&self) -> SchedulingMode {
        self.mode
    }

    /// Date every task; no enrichment.
    pub fn schedule_tasks(
        &self,
        tasks: &mut [Task],
        plan_start: NaiveDate,
    ) -> Result<(), ScheduleError> {
        ForwardPass::new(&self.calendar).execute(tasks, plan_start, self.mode)
    }

    /// Date and enrich a plan. A plan without a start date starts `today`,
    /// and that date is written back onto the plan.
    pub fn schedule_plan(
        &self,
        plan: &mut Plan,
        today: NaiveDate,
    ) -> Result<PlanSummary, ScheduleError> {
        self.schedule_plan_in_mode(plan, today, self.mode)
    }

    fn schedule_plan_in_mode(
        &self,
        plan: &mut Plan,
        today: NaiveDate,
        mode: SchedulingMode,
    ) -> Result<PlanSummary, ScheduleError> {
        let start = plan.effective_start(today);
        ForwardPass::new(&self.calendar).execute(&mut plan.tasks, start, mode)?;
        plan.start_date = Some(start);
        if let Some(enricher) = &self.enricher {
            enricher.enrich_all(&mut plan.tasks);
        }

        let summary = PlanSummary::from_plan(plan, &self.calendar);
        info!(
            "scheduled {} tasks from {start} in {mode} mode: {}",
            plan.tasks.len(),
            summary.to_cli_summary()
        );
        Ok(summary)
    }

    /// Schedule a raw plan document without ever failing. A malformed plan
    /// is handed back untouched; a plan the configured mode rejects (cycles,
    /// duplicate ids) is dated in list order instead.
    pub fn schedule_plan_value(&self, value: Value, today: NaiveDate) -> Value {
        let mut plan = match Plan::from_value(value.clone()) {
            Ok(plan) => plan,
            Err(err) => {
                warn!("returning plan unscheduled: {err}");
                return value;
            }
        };
        if let Err(err) = self.schedule_plan(&mut plan, today) {
            warn!("{err}; falling back to list-order scheduling");
            if let Err(err) = self.schedule_plan_in_mode(&mut plan, today, SchedulingMode::ListOrder)
            {
                warn!("returning plan unscheduled: {err}");
                return value;
            }
        }
        match plan.to_value() {
            Ok(scheduled) => scheduled,
            Err(err) => {
                warn!("returning plan unscheduled: {err}");
                value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn schedule_plan_writes_back_start_date() {
        let scheduler = Scheduler::default();
        let mut plan = Plan::new("x", vec![Task::new(1, "Plan scope", 1)]);
        let summary = scheduler.schedule_plan(&mut plan, d(2025, 2, 8)).unwrap();
        assert_eq!(plan.start_date, Some(d(2025, 2, 8)));
        // Saturday start rolls to Monday
        assert_eq!(plan.tasks[0].start_date, Some(d(2025, 2, 10)));
        assert_eq!(plan.tasks[0].category.as_deref(), Some("Planning"));
        assert_eq!(summary.task_count, 1);
    }

    #[test]
    fn malformed_documents_are_returned_unchanged() {
        let scheduler = Scheduler::default();
        let value = json!({"goal": "no tasks here"});
        assert_eq!(scheduler.schedule_plan_value(value.clone(), d(2025, 2, 3)), value);

        let value = json!({"goal": "bad", "tasks": [{"name": "missing id"}]});
        assert_eq!(scheduler.schedule_plan_value(value.clone(), d(2025, 2, 3)), value);
    }

    #[test]
    fn rejected_plans_are_still_dated_in_list_order() {
        let scheduler = Scheduler::default();
        let plans = [
            json!({"start_date": "2025-02-03", "tasks": [
                {"task_id": 1, "estimated_days": 2, "depends_on": []},
                {"task_id": 2, "depends_on": [2]}
            ]}),
            json!({"start_date": "2025-02-03", "tasks": [
                {"task_id": 1, "estimated_days": 1, "depends_on": [2]},
                {"task_id": 2, "estimated_days": 1, "depends_on": [1]}
            ]}),
            json!({"start_date": "2025-02-03", "tasks": [
                {"task_id": 1, "estimated_days": 1},
                {"task_id": "1", "estimated_days": 3},
                {"task_id": 2, "estimated_days": 1, "depends_on": [1]}
            ]}),
        ];
        for value in plans {
            let scheduled = scheduler.schedule_plan_value(value, d(2025, 1, 1));
            let tasks = scheduled["tasks"].as_array().unwrap();
            for task in tasks {
                assert!(task["start_date"].is_string(), "undated task in {scheduled}");
                assert!(task["end_date"].is_string(), "undated task in {scheduled}");
            }
            assert_eq!(tasks[0]["start_date"], json!("2025-02-03"));
        }
    }

    #[test]
    fn self_dependency_is_ignored_by_the_fallback() {
        let scheduler = Scheduler::default();
        let value = json!({"start_date": "2025-02-03", "tasks": [
            {"task_id": 1, "estimated_days": 2, "depends_on": []},
            {"task_id": 2, "estimated_days": 1, "depends_on": [2]}
        ]});
        let scheduled = scheduler.schedule_plan_value(value, d(2025, 1, 1));
        assert_eq!(scheduled["tasks"][0]["end_date"], json!("2025-02-04"));
        assert_eq!(scheduled["tasks"][1]["start_date"], json!("2025-02-03"));
        assert_eq!(scheduled["tasks"][1]["category"], json!("General"));
    }

    #[test]
    fn typed_entry_point_keeps_the_strict_error() {
        let scheduler = Scheduler::default();
        let mut plan = Plan::new("x", vec![Task::new(1, "a", 1).with_depends_on([1])]);
        assert!(matches!(
            scheduler.schedule_plan(&mut plan, d(2025, 2, 3)),
            Err(ScheduleError::CycleDetected { .. })
        ));
        assert!(!plan.tasks[0].is_scheduled());
    }

    #[test]
    fn list_order_mode_tolerates_cycles() {
        let scheduler = Scheduler::default().with_mode(SchedulingMode::ListOrder);
        let value = json!({
            "goal": "loop",
            "start_date": "2025-02-03",
            "tasks": [
                {"task_id": 1, "estimated_days": 1, "depends_on": [2]},
                {"task_id": 2, "estimated_days": 1, "depends_on": [1]}
            ]
        });
        let scheduled = scheduler.schedule_plan_value(value, d(2025, 1, 1));
        assert_eq!(scheduled["tasks"][0]["start_date"], json!("2025-02-03"));
        assert_eq!(scheduled["tasks"][1]["start_date"], json!("2025-02-04"));
        assert_eq!(scheduled["tasks"][1]["due_date"], json!("2025-02-04"));
    }

    #[test]
    fn without_enrichment_leaves_annotations_alone() {
        let scheduler = Scheduler::default().without_enrichment();
        let mut plan = Plan::new("x", vec![Task::new(1, "Design", 1)]);
        scheduler.schedule_plan(&mut plan, d(2025, 2, 3)).unwrap();
        assert!(plan.tasks[0].category.is_none());
        assert!(plan.tasks[0].is_scheduled());
    }
}
