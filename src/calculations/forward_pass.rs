use crate::calendar::WorkingDayCalendar;
use crate::graph::PlanDag;
use crate::schedule::ScheduleError;
use crate::task::{Task, TaskId};
use crate::task_validation;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How dependency end dates become visible while dating tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulingMode {
    /// Tasks are dated in input order. A dependency only constrains a task if
    /// it appears earlier in the list; later, self and cyclic references are
    /// ignored.
    ListOrder,
    /// Tasks are dated in dependency order; cycles and duplicate ids are errors.
    #[default]
    Topological,
}

impl SchedulingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingMode::ListOrder => "list-order",
            SchedulingMode::Topological => "topological",
        }
    }
}

impl fmt::Display for SchedulingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "list-order" | "legacy" => Ok(SchedulingMode::ListOrder),
            "topological" | "strict" => Ok(SchedulingMode::Topological),
            other => Err(format!(
                "unknown scheduling mode '{other}' (expected list-order or topological)"
            )),
        }
    }
}

pub struct ForwardPass<'a, C: WorkingDayCalendar + ?Sized> {
    calendar: &'a C,
}

impl<'a, C: WorkingDayCalendar + ?Sized> ForwardPass<'a, C> {
    pub fn new(calendar: &'a C) -> Self {
        Self { calendar }
    }

    /// Assign start/end/due dates and the holiday flag to every task in place.
    /// Task order is never changed.
    pub fn execute(
        &self,
        tasks: &mut [Task],
        plan_start: NaiveDate,
        mode: SchedulingMode,
    ) -> Result<(), ScheduleError> {
        if tasks.is_empty() {
            return Ok(());
        }
        match mode {
            SchedulingMode::ListOrder => {
                self.execute_in_list_order(tasks, plan_start);
                Ok(())
            }
            SchedulingMode::Topological => self.execute_in_topological_order(tasks, plan_start),
        }
    }

    fn execute_in_list_order(&self, tasks: &mut [Task], plan_start: NaiveDate) {
        let base = self.calendar.next_working_day(plan_start);
        let mut finishes: HashMap<TaskId, NaiveDate> = HashMap::with_capacity(tasks.len());

        for task in tasks.iter_mut() {
            let start = self.earliest_start(task, &finishes, base);
            let end = self.place(task, start);
            finishes.entry(task.id.clone()).or_insert(end);
        }
    }

    fn execute_in_topological_order(
        &self,
        tasks: &mut [Task],
        plan_start: NaiveDate,
    ) -> Result<(), ScheduleError> {
        task_validation::validate_task_collection(tasks)?;
        let order = PlanDag::build(tasks).topological_order()?;

        let base = self.calendar.next_working_day(plan_start);
        let mut finishes: HashMap<TaskId, NaiveDate> = HashMap::with_capacity(tasks.len());

        for position in order {
            let task = &mut tasks[position];
            let start = self.earliest_start(task, &finishes, base);
            let end = self.place(task, start);
            finishes.insert(task.id.clone(), end);
        }
        Ok(())
    }

    /// `base` when no dependency has been dated, otherwise the first working
    /// day after the latest dependency finish.
    fn earliest_start(
        &self,
        task: &Task,
        finishes: &HashMap<TaskId, NaiveDate>,
        base: NaiveDate,
    ) -> NaiveDate {
        let latest_dependency_finish = task
            .depends_on
            .iter()
            .filter_map(|dep_id| {
                let finish = finishes.get(dep_id).copied();
                if finish.is_none() {
                    debug!("task {}: dependency {dep_id} not dated yet, ignoring", task.id);
                }
                finish
            })
            .max();

        match latest_dependency_finish {
            Some(finish) => {
                let day_after = finish.succ_opt().unwrap_or(finish);
                self.calendar.next_working_day(day_after)
            }
            None => base,
        }
    }

    fn place(&self, task: &mut Task, start: NaiveDate) -> NaiveDate {
        let end = self.calendar.add_working_days(start, task.duration());
        task.assign_dates(start, end, self.calendar.is_holiday(end));
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WorkCalendar;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("legacy".parse::<SchedulingMode>(), Ok(SchedulingMode::ListOrder));
        assert_eq!("List_Order".parse::<SchedulingMode>(), Ok(SchedulingMode::ListOrder));
        assert_eq!("strict".parse::<SchedulingMode>(), Ok(SchedulingMode::Topological));
        assert!("random".parse::<SchedulingMode>().is_err());
    }

    #[test]
    fn list_order_ignores_forward_references() {
        let calendar = WorkCalendar::default();
        let mut tasks = vec![
            Task::new(2, "second", 2).with_depends_on([1]),
            Task::new(1, "first", 3),
        ];
        ForwardPass::new(&calendar)
            .execute(&mut tasks, d(2025, 2, 3), SchedulingMode::ListOrder)
            .unwrap();
        assert_eq!(tasks[0].start_date, Some(d(2025, 2, 3)));
        assert_eq!(tasks[1].start_date, Some(d(2025, 2, 3)));
    }

    #[test]
    fn topological_mode_honours_forward_references() {
        let calendar = WorkCalendar::default();
        let mut tasks = vec![
            Task::new(2, "second", 2).with_depends_on([1]),
            Task::new(1, "first", 3),
        ];
        ForwardPass::new(&calendar)
            .execute(&mut tasks, d(2025, 2, 3), SchedulingMode::Topological)
            .unwrap();
        // first: Mon 3 .. Wed 5, second: Thu 6 .. Fri 7
        assert_eq!(tasks[1].end_date, Some(d(2025, 2, 5)));
        assert_eq!(tasks[0].start_date, Some(d(2025, 2, 6)));
        assert_eq!(tasks[0].end_date, Some(d(2025, 2, 7)));
    }

    #[test]
    fn list_order_first_duplicate_wins() {
        let calendar = WorkCalendar::default();
        let mut tasks = vec![
            Task::new(1, "short", 1),
            Task::new(1, "long", 5),
            Task::new(2, "after", 1).with_depends_on([1]),
        ];
        ForwardPass::new(&calendar)
            .execute(&mut tasks, d(2025, 2, 3), SchedulingMode::ListOrder)
            .unwrap();
        assert_eq!(tasks[2].start_date, Some(d(2025, 2, 4)));
    }
}
