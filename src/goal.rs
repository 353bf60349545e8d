use regex::Regex;
use std::sync::OnceLock;

fn horizon_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)(\d+)\s*(day|week|month)s?").expect("Invalid regex"))
}

/// Calendar days implied by the first "<n> days|weeks|months" phrase in a goal.
///
/// Weeks count as 7 days and months as 30.
pub fn extract_duration_days(goal: &str) -> Option<u32> {
    let captures = horizon_regex().captures(goal)?;
    let value: u32 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2)?.as_str().to_ascii_lowercase();
    let factor = match unit.as_str() {
        "week" => 7,
        "month" => 30,
        _ => 1,
    };
    value.checked_mul(factor)
}
