use crate::calendar::WorkingDayCalendar;
use crate::goal::extract_duration_days;
use crate::plan::Plan;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub task_count: usize,
    pub scheduled_count: usize,
    pub earliest_start: Option<NaiveDate>,
    pub latest_finish: Option<NaiveDate>,
    pub holiday_finish_count: usize,
    /// Working days from the plan start through the latest finish.
    pub working_days: i64,
    /// Calendar days from the plan start through the latest finish, inclusive.
    pub calendar_days: i64,
    /// Horizon stated in the goal text ("in 3 weeks"), in calendar days.
    pub horizon_days: Option<u32>,
    pub exceeds_horizon: bool,
}

impl PlanSummary {
    pub fn from_plan<C: WorkingDayCalendar + ?Sized>(plan: &Plan, calendar: &C) -> Self {
        let scheduled: Vec<_> = plan.tasks.iter().filter(|t| t.is_scheduled()).collect();
        let earliest_start = scheduled.iter().filter_map(|t| t.start_date).min();
        let latest_finish = scheduled.iter().filter_map(|t| t.end_date).max();
        let holiday_finish_count = scheduled
            .iter()
            .filter(|t| t.is_holiday == Some(true))
            .count();

        let span_start = plan.start_date.or(earliest_start);
        let (working_days, calendar_days) = match (span_start, latest_finish) {
            (Some(start), Some(finish)) if start <= finish => (
                calendar.count_working_days(start, finish),
                (finish - start).num_days() + 1,
            ),
            _ => (0, 0),
        };

        let horizon_days = extract_duration_days(&plan.goal);
        let exceeds_horizon = horizon_days.is_some_and(|days| calendar_days > i64::from(days));

        Self {
            task_count: plan.tasks.len(),
            scheduled_count: scheduled.len(),
            earliest_start,
            latest_finish,
            holiday_finish_count,
            working_days,
            calendar_days,
            horizon_days,
            exceeds_horizon,
        }
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        if self.scheduled_count != self.task_count {
            parts.push(format!("scheduled={}", self.scheduled_count));
        }
        if let Some(date) = self.earliest_start {
            parts.push(format!("start={}", date));
        }
        if let Some(date) = self.latest_finish {
            parts.push(format!("finish={}", date));
        }
        if self.working_days > 0 {
            parts.push(format!("working_days={}", self.working_days));
        }
        if self.holiday_finish_count > 0 {
            parts.push(format!("holiday_finishes={}", self.holiday_finish_count));
        }
        if let Some(days) = self.horizon_days {
            let marker = if self.exceeds_horizon { " (exceeded)" } else { "" };
            parts.push(format!("horizon={}d{}", days, marker));
        }
        parts.join(", ")
    }
}
