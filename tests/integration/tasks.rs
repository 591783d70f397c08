//! End-to-end: task file through the codec to runnable schedules.

use chrono::{TimeZone, Utc};
use warden::{parse_tasks, resolve_tasks, RecurrenceSpec, TaskAction};

use crate::common::SAMPLE_TASKS_YAML;

#[test]
fn task_file_resolves_to_normalized_expressions() {
    let config = parse_tasks(SAMPLE_TASKS_YAML).unwrap();
    let tasks = resolve_tasks(&config).unwrap();

    assert_eq!(tasks.len(), 3);
    // Days arrive unordered in the file and come out ascending.
    assert_eq!(tasks[0].cron_expression.as_str(), "30 4 * * 1,3,5");
    assert_eq!(tasks[1].cron_expression.as_str(), "@every 6h");
    assert_eq!(tasks[2].cron_expression.as_str(), "0 9 * * 0,6");
}

#[test]
fn resolved_tasks_explain_like_the_panel() {
    let tasks = resolve_tasks(&parse_tasks(SAMPLE_TASKS_YAML).unwrap()).unwrap();

    assert_eq!(tasks[0].describe(), "At 04:30 on days: 1,3,5");
    assert_eq!(tasks[1].describe(), "Every 6 hour(s)");
    assert_eq!(tasks[2].describe(), "At 09:00 on days: 0,6");
}

#[test]
fn resolved_tasks_compute_next_runs() {
    let tasks = resolve_tasks(&parse_tasks(SAMPLE_TASKS_YAML).unwrap()).unwrap();

    // Monday 2024-01-15 noon UTC.
    let base = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

    // Backup: next of Mon/Wed/Fri at 04:30 is Wednesday.
    assert_eq!(
        tasks[0].next_run(base).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 17, 4, 30, 0).unwrap()
    );

    // Restart sweep: six hours from the anchor.
    assert_eq!(
        tasks[1].next_run(base).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap()
    );

    // Weekend opening: next Saturday.
    assert_eq!(
        tasks[2].next_run(base).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap()
    );
}

#[test]
fn resolved_expressions_decode_back_to_specs() {
    let tasks = resolve_tasks(&parse_tasks(SAMPLE_TASKS_YAML).unwrap()).unwrap();

    for task in &tasks {
        let spec: RecurrenceSpec = task.cron_expression.decode().unwrap();
        // Decoding and re-encoding is the identity on codec output.
        assert_eq!(spec.to_cron(), task.cron_expression);
    }
}

#[test]
fn task_fields_survive_resolution() {
    let tasks = resolve_tasks(&parse_tasks(SAMPLE_TASKS_YAML).unwrap()).unwrap();

    assert_eq!(tasks[0].action, TaskAction::Command);
    assert_eq!(tasks[0].payload, "save-all\nsave-off");
    assert_eq!(tasks[1].server_id.as_str(), "survival-01");
    assert!(!tasks[2].one_shot);
}

#[test]
fn task_file_on_disk_loads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.yaml");
    std::fs::write(&path, SAMPLE_TASKS_YAML).unwrap();

    let config = warden::load_tasks_from_file(&path).unwrap();
    let tasks = resolve_tasks(&config).unwrap();
    assert_eq!(tasks.len(), 3);
}
