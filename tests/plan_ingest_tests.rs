use chrono::NaiveDate;
use plan_scheduler::{Plan, PlanError, PlanSummary, Scheduler, TaskId, WorkCalendar, parse_model_response};
use serde_json::json;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const MODEL_OUTPUT: &str = r#"Here is your plan:
```json
{
  "plan": {
    "goal": "Launch a portfolio site in 2 weeks",
    "tasks": [
      {"task_id": 1, "name": "Plan content", "estimated_days": 1.5, "depends_on": []},
      {"task_id": "2", "name": "Design pages", "estimated_days": "2", "depends_on": [1]},
      {"id": 3, "name": "Deploy", "estimated_days": 0, "depends_on": "2"}
    ]
  }
}
```"#;

#[test]
fn model_output_is_unfenced_and_unwrapped() {
    let text = MODEL_OUTPUT.trim_start_matches("Here is your plan:");
    let value = parse_model_response(text).unwrap();
    assert_eq!(value["goal"], json!("Launch a portfolio site in 2 weeks"));
    assert!(value["tasks"].is_array());
}

#[test]
fn loose_fields_are_coerced() {
    let text = MODEL_OUTPUT.trim_start_matches("Here is your plan:");
    let plan = Plan::from_json_str(text).unwrap();
    assert_eq!(plan.tasks.len(), 3);
    assert_eq!(plan.tasks[0].estimated_days, 2);
    assert_eq!(plan.tasks[1].estimated_days, 2);
    assert_eq!(plan.tasks[2].estimated_days, 1);
    assert_eq!(plan.tasks[2].id, TaskId::from(3));
    assert_eq!(plan.tasks[2].depends_on, vec![TaskId::from(2)]);
}

#[test]
fn upstream_failures_are_errors() {
    assert!(matches!(parse_model_response("   "), Err(PlanError::EmptyResponse)));
    assert!(matches!(parse_model_response("```json\n```"), Err(PlanError::EmptyResponse)));
    assert!(matches!(
        parse_model_response("Sorry, I can't help with that."),
        Err(PlanError::InvalidJson(_))
    ));
    assert!(matches!(
        Plan::from_json_str(r#"{"goal": "x"}"#),
        Err(PlanError::MissingTasks)
    ));
    assert!(matches!(
        Plan::from_json_str(r#"{"goal": "x", "tasks": {"a": 1}}"#),
        Err(PlanError::MissingTasks)
    ));
}

#[test]
fn ingested_plan_schedules_end_to_end() {
    let text = MODEL_OUTPUT.trim_start_matches("Here is your plan:");
    let mut plan = Plan::from_json_str(text).unwrap().with_start_date(d(2025, 2, 3));
    let summary = Scheduler::default().schedule_plan(&mut plan, d(2025, 1, 1)).unwrap();

    // 1: Mon-Tue, 2: Wed-Thu, 3: Fri
    assert_eq!(plan.tasks[0].end_date, Some(d(2025, 2, 4)));
    assert_eq!(plan.tasks[1].start_date, Some(d(2025, 2, 5)));
    assert_eq!(plan.tasks[2].start_date, Some(d(2025, 2, 7)));
    assert_eq!(plan.tasks[2].end_date, Some(d(2025, 2, 7)));

    assert_eq!(summary.latest_finish, Some(d(2025, 2, 7)));
    assert_eq!(summary.working_days, 5);
    assert_eq!(summary.calendar_days, 5);
    assert_eq!(summary.horizon_days, Some(14));
    assert!(!summary.exceeds_horizon);
}

#[test]
fn summary_flags_an_overrun_goal() {
    let mut plan = Plan::from_value(json!({
        "goal": "Ship in 3 days",
        "start_date": "2025-02-06",
        "tasks": [{"task_id": 1, "name": "All of it", "estimated_days": 3}]
    }))
    .unwrap();
    let summary = Scheduler::default().schedule_plan(&mut plan, d(2025, 1, 1)).unwrap();
    // Thu, Fri, Mon: five calendar days
    assert_eq!(summary.calendar_days, 5);
    assert!(summary.exceeds_horizon);
    assert_eq!(
        summary.to_cli_summary(),
        "tasks=1, start=2025-02-06, finish=2025-02-10, working_days=3, horizon=3d (exceeded)"
    );
}

#[test]
fn summary_of_an_unscheduled_plan() {
    let plan = Plan::from_value(json!({"goal": "x", "tasks": [{"task_id": 1}]})).unwrap();
    let summary = PlanSummary::from_plan(&plan, &WorkCalendar::default());
    assert_eq!(summary.scheduled_count, 0);
    assert_eq!(summary.working_days, 0);
    assert_eq!(summary.to_cli_summary(), "tasks=1, scheduled=0");
}

#[test]
fn plan_level_extras_survive() {
    let plan = Plan::from_value(json!({
        "goal": "x",
        "model": "any",
        "tasks": []
    }))
    .unwrap();
    let value = plan.to_value().unwrap();
    assert_eq!(value["model"], json!("any"));
    assert!(value.get("start_date").is_none());
}
