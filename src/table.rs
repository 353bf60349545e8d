//! Polars view of a scheduled plan, plus a plain-text renderer for the CLI.

use crate::task::Task;
use chrono::NaiveDate;
use polars::prelude::*;

pub const TABLE_COLUMNS: [&str; 8] = [
    "task_id",
    "name",
    "category",
    "estimated_days",
    "depends_on",
    "start_date",
    "end_date",
    "is_holiday",
];

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn date_to_i32(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

fn i32_to_date(days: i32) -> Option<NaiveDate> {
    epoch().checked_add_signed(chrono::Duration::days(i64::from(days)))
}

/// One row per task, in plan order. Dates are polars `Date` columns;
/// unscheduled tasks leave them null.
pub fn tasks_dataframe(tasks: &[Task]) -> PolarsResult<DataFrame> {
    let ids: Vec<String> = tasks.iter().map(|t| t.id.to_string()).collect();
    let names: Vec<String> = tasks.iter().map(|t| t.name.clone()).collect();
    let categories: Vec<Option<String>> = tasks.iter().map(|t| t.category.clone()).collect();
    let days: Vec<u32> = tasks.iter().map(Task::duration).collect();
    let depends_on: Vec<String> = tasks
        .iter()
        .map(|t| {
            t.depends_on
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    let starts: Vec<Option<i32>> = tasks.iter().map(|t| t.start_date.map(date_to_i32)).collect();
    let ends: Vec<Option<i32>> = tasks.iter().map(|t| t.end_date.map(date_to_i32)).collect();
    let holidays: Vec<Option<bool>> = tasks.iter().map(|t| t.is_holiday).collect();

    let columns = vec![
        Series::new(PlSmallStr::from_static("task_id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("category"), categories).into_column(),
        Series::new(PlSmallStr::from_static("estimated_days"), days).into_column(),
        Series::new(PlSmallStr::from_static("depends_on"), depends_on).into_column(),
        Series::new(PlSmallStr::from_static("start_date"), starts)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("end_date"), ends)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("is_holiday"), holidays).into_column(),
    ];
    DataFrame::new(columns)
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::Date(days) => i32_to_date(*days)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Boxed ASCII table with one header row.
pub fn render_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let headers: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let format_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (cell, width) in cells.iter().zip(&widths) {
            let pad = width - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&format_row(&headers));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}
