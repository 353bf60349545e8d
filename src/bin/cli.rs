use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use plan_scheduler::{
    Plan, PlannerConfig, SchedulingMode, WorkCalendar, WorkingDayCalendar, parse_model_response,
    render_text_table, tasks_dataframe, write_plan_json, write_tasks_csv,
};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Schedule generated task plans over working days
///
/// Reads a plan (a goal plus tasks with durations and dependencies), assigns
/// start and end dates that skip weekends and holidays, and annotates each
/// task with a category and subtasks.
#[derive(Parser)]
#[command(version, about, name = "plan-scheduler")]
struct Args {
    /// JSON config with calendar, mode and enrichment settings. Falls back to
    /// $PLAN_SCHEDULER_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a plan file (or `-` for stdin)
    Schedule {
        plan: PathBuf,
        /// Plan start date, overriding the one in the file
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Fallback start when the plan has none; defaults to the local date
        #[arg(long)]
        today: Option<NaiveDate>,
        /// topological (default) or list-order
        #[arg(long)]
        mode: Option<SchedulingMode>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Skip category and subtask annotations
        #[arg(long)]
        no_enrich: bool,
        /// Input is raw model output, possibly fenced or wrapped in {"plan": ...}
        #[arg(long)]
        raw: bool,
    },
    /// Inspect the working-day calendar
    Calendar {
        #[command(subcommand)]
        command: CalendarCommands,
    },
}

#[derive(Subcommand)]
enum CalendarCommands {
    /// Print version, working days and holidays
    Show,
    /// Classify a date as working day, weekend or holiday
    Check { date: NaiveDate },
    /// Earliest working day on or after a date
    Next { date: NaiveDate },
    /// The N-th working day counting from a date
    Add { date: NaiveDate, days: u32 },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read plan from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_plan(path: &Path, raw: bool) -> Result<Plan> {
    let text = read_input(path)?;
    let value = if raw {
        parse_model_response(&text)?
    } else {
        serde_json::from_str(&text).context("Plan is not valid JSON")?
    };
    Ok(Plan::from_value(value)?)
}

fn print_calendar_info(calendar: &WorkCalendar) {
    let config = calendar.to_config();
    let working_days = config
        .working_days()
        .iter()
        .map(|wd| wd.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let holidays = config
        .holidays()
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Calendar version   : {}", calendar.version());
    println!("Working days       : {}", working_days);
    println!("Holidays           : {}", holidays);
}

fn run_calendar(calendar: &WorkCalendar, command: CalendarCommands) {
    match command {
        CalendarCommands::Show => print_calendar_info(calendar),
        CalendarCommands::Check { date } => {
            let kind = if calendar.is_holiday(date) {
                "holiday"
            } else if calendar.is_weekend(date) {
                "weekend"
            } else {
                "working day"
            };
            println!("{date} {kind}");
        }
        CalendarCommands::Next { date } => println!("{}", calendar.next_working_day(date)),
        CalendarCommands::Add { date, days } => {
            println!("{}", calendar.add_working_days(date, days))
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let Args { config, command } = Args::parse();
    let mut config = PlannerConfig::from_env_or_default(config.as_deref())
        .context("Failed to load config")?;

    match command {
        Commands::Calendar { command } => {
            let calendar = config.calendar().context("Invalid calendar")?;
            run_calendar(&calendar, command);
        }
        Commands::Schedule {
            plan,
            start,
            today,
            mode,
            format,
            no_enrich,
            raw,
        } => {
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if no_enrich {
                config.enrich = false;
            }
            let scheduler = config.build_scheduler().context("Invalid config")?;

            let mut loaded = load_plan(&plan, raw)
                .with_context(|| format!("Failed to load plan {}", plan.display()))?;
            if let Some(start) = start {
                loaded.start_date = Some(start);
            }

            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let summary = scheduler
                .schedule_plan(&mut loaded, today)
                .context("Scheduling failed")?;

            let stdout = io::stdout();
            match format {
                OutputFormat::Json => write_plan_json(&loaded, stdout.lock())?,
                OutputFormat::Csv => write_tasks_csv(&loaded.tasks, stdout.lock())?,
                OutputFormat::Table => {
                    let df = tasks_dataframe(&loaded.tasks)?;
                    print!("{}", render_text_table(&df));
                }
            }
            eprintln!("{}", summary.to_cli_summary());
        }
    }
    Ok(())
}
