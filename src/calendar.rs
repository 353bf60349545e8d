use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Version label of the built-in holiday list.
pub const DEFAULT_CALENDAR_VERSION: &str = "2025";

/// Version label for a config that brings its own holidays without naming them.
pub const CUSTOM_CALENDAR_VERSION: &str = "custom";

const DEFAULT_HOLIDAYS: [(i32, u32, u32); 7] = [
    (2025, 1, 1),
    (2025, 1, 26),
    (2025, 3, 8),
    (2025, 8, 15),
    (2025, 10, 2),
    (2025, 10, 20),
    (2025, 12, 25),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("calendar requires at least one working day")]
    NoWorkingDays,
}

/// Classifies dates as working or non-working and walks forward over working days.
///
/// Implementors only answer the two membership questions; the date arithmetic
/// is shared so every calendar strategy schedules the same way.
pub trait WorkingDayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool;

    fn is_weekend(&self, date: NaiveDate) -> bool;

    fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    /// Earliest working day on or after `from`.
    fn next_working_day(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from;
        while !self.is_working_day(current) {
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Date of the `days`-th working day, counting `next_working_day(from)` as day 1.
    fn add_working_days(&self, from: NaiveDate, days: u32) -> NaiveDate {
        let mut current = self.next_working_day(from);
        let mut counted = 1;
        while counted < days {
            let Some(next) = current.succ_opt() else {
                break;
            };
            current = next;
            if self.is_working_day(current) {
                counted += 1;
            }
        }
        current
    }

    /// Working days in `[start, end]`, both ends inclusive.
    fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;
        while current <= end {
            if self.is_working_day(current) {
                count += 1;
            }
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    version: String,
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

/// Serialized calendar. Omitted fields fall back as a unit: with neither
/// `version` nor `holidays` the built-in 2025 list applies; holidays without
/// a version are labelled `"custom"`; a version without holidays means none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WorkCalendarConfigRepr")]
pub struct WorkCalendarConfig {
    version: String,
    working_days: Vec<Weekday>,
    holidays: Vec<NaiveDate>,
}

#[derive(Deserialize)]
struct WorkCalendarConfigRepr {
    version: Option<String>,
    working_days: Option<Vec<Weekday>>,
    holidays: Option<Vec<NaiveDate>>,
}

impl From<WorkCalendarConfigRepr> for WorkCalendarConfig {
    fn from(repr: WorkCalendarConfigRepr) -> Self {
        let working_days = repr.working_days.unwrap_or_else(default_working_days);
        let (version, holidays) = match (repr.version, repr.holidays) {
            (Some(version), holidays) => (version, holidays.unwrap_or_default()),
            (None, Some(holidays)) => (CUSTOM_CALENDAR_VERSION.to_string(), holidays),
            (None, None) => (DEFAULT_CALENDAR_VERSION.to_string(), default_holidays()),
        };
        WorkCalendarConfig::new(version, working_days, holidays)
    }
}

fn default_holidays() -> Vec<NaiveDate> {
    DEFAULT_HOLIDAYS
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

fn default_working_days() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

impl Default for WorkCalendar {
    fn default() -> Self {
        let mut calendar = Self::weekends_only(DEFAULT_CALENDAR_VERSION);
        calendar.holidays.extend(default_holidays());
        calendar
    }
}

impl WorkingDayCalendar for WorkCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    fn is_weekend(&self, date: NaiveDate) -> bool {
        self.non_working_days.contains(&date.weekday())
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Saturday/Sunday weekends and no holidays.
    pub fn weekends_only(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }

    pub fn custom<I, J>(working_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let config = WorkCalendarConfig::new(DEFAULT_CALENDAR_VERSION, working_days, holidays);
        Self::from_config(&config)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        Ok(Self {
            version: config.version.clone(),
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        })
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Holidays in ascending order.
    pub fn holidays(&self) -> Vec<NaiveDate> {
        let mut holidays: Vec<NaiveDate> = self.holidays.iter().copied().collect();
        holidays.sort();
        holidays
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    /// Replace the working week, e.g. Mon-Sat for six-day weeks.
    pub fn set_working_days(&mut self, days: &[Weekday]) -> Result<(), CalendarError> {
        if days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
        Ok(())
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(version: impl Into<String>, working_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Self {
            version: version.into(),
            working_days: working,
            holidays,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day));
        WorkCalendarConfig::new(calendar.version.clone(), working, calendar.holidays())
    }
}
