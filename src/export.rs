use crate::plan::Plan;
use crate::task::Task;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Flat CSV row for a scheduled task; subtasks are `;`-joined titles.
#[derive(Debug, Default, Serialize)]
struct TaskCsvRecord {
    task_id: String,
    name: String,
    estimated_days: u32,
    depends_on: String,
    start_date: String,
    end_date: String,
    due_date: String,
    is_holiday: String,
    category: String,
    subtasks: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id.to_string(),
            name: task.name.clone(),
            estimated_days: task.duration(),
            depends_on: join(task.depends_on.iter().map(ToString::to_string), ","),
            start_date: format_date(task.start_date),
            end_date: format_date(task.end_date),
            due_date: format_date(task.due_date),
            is_holiday: task.is_holiday.map(|b| b.to_string()).unwrap_or_default(),
            category: task.category.clone().unwrap_or_default(),
            subtasks: join(task.subtasks.iter().map(|s| s.title.clone()), ";"),
        }
    }
}

fn format_date(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn join(values: impl Iterator<Item = String>, separator: &str) -> String {
    values.collect::<Vec<_>>().join(separator)
}

/// Header row plus one row per task, in plan order.
pub fn write_tasks_csv<W: Write>(tasks: &[Task], writer: W) -> ExportResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for task in tasks {
        csv_writer.serialize(TaskCsvRecord::from(task))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_plan_json<W: Write>(plan: &Plan, mut writer: W) -> ExportResult<()> {
    serde_json::to_writer_pretty(&mut writer, plan)?;
    writeln!(writer)?;
    Ok(())
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> ExportResult<()> {
    write_tasks_csv(tasks, File::create(path)?)
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &Plan, path: P) -> ExportResult<()> {
    write_plan_json(plan, File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Subtask;

    #[test]
    fn csv_rows_flatten_lists_and_dates() {
        let mut task = Task::new(2, "Build API", 3).with_depends_on([1, 5]);
        task.start_date = NaiveDate::from_ymd_opt(2025, 2, 11);
        task.subtasks = vec![Subtask::new("Define"), Subtask::new("Ship")];

        let mut buf = Vec::new();
        write_tasks_csv(&[task], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("task_id,name,estimated_days,depends_on,start_date,end_date,due_date,is_holiday,category,subtasks")
        );
        assert_eq!(
            lines.next(),
            Some("2,Build API,3,\"1,5\",2025-02-11,,,,,Define;Ship")
        );
    }

    #[test]
    fn empty_task_list_writes_nothing() {
        let mut buf = Vec::new();
        write_tasks_csv(&[], &mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
