use chrono::{NaiveDate, NaiveDateTime};
use todo_agenda::{
    count, has_pending_before, has_pending_within, is_completed_on, is_pending_on, occurs_on,
    overdue, select, toggle, Bucket, CompletionState, Day, Lookback, QueryOptions, RecurrenceRule,
    Task,
};
use todo_agenda::loader::load_dir;

fn ymd(y: i32, m: u32, d: u32) -> Day {
    Day::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn noon(day: Day) -> NaiveDateTime {
    day.date().unwrap().and_hms_opt(12, 0, 0).unwrap()
}

#[test]
fn weekly_task_marked_on_one_monday() {
    let anchor = ymd(2024, 1, 1);
    let monday = ymd(2024, 1, 8);
    let state = CompletionState::empty_marks();

    assert!(occurs_on(anchor, RecurrenceRule::Weekly, monday));
    assert!(!is_completed_on(&state, RecurrenceRule::Weekly, monday));

    let task = Task::new("w", "Weekly review")
        .anchored(anchor)
        .repeating(RecurrenceRule::Weekly)
        .with_completion(state.clone());
    assert!(is_pending_on(&task, monday));

    let marked = toggle(&state, RecurrenceRule::Weekly, monday);
    let task = task.with_completion(marked.clone());
    assert!(is_completed_on(&marked, RecurrenceRule::Weekly, monday));
    assert!(!is_pending_on(&task, monday));
    assert!(is_pending_on(&task, ymd(2024, 1, 15)));

    assert_eq!(toggle(&marked, RecurrenceRule::Weekly, monday), state);
}

#[test]
fn monthly_task_skips_non_matching_day_of_month() {
    assert!(!occurs_on(ymd(2024, 1, 1), RecurrenceRule::Monthly, ymd(2024, 2, 29)));
}

#[test]
fn undated_task_is_due_all_week_but_never_overdue() {
    let task: Task = serde_json::from_str(r#"{"id": "u", "title": "Someday", "completed": false}"#).unwrap();
    let today = ymd(2024, 5, 20);

    for offset in 0..7 {
        assert!(is_pending_on(&task, today.offset(offset)));
    }
    assert!(has_pending_within(&task, today, 7));
    assert!(!has_pending_before(&task, today, Lookback::Unbounded));

    let tasks = vec![task];
    assert!(overdue(&tasks, noon(today), &QueryOptions::default()).is_empty());
}

#[test]
fn biweekly_anchor_day_counts() {
    let anchor = ymd(2024, 1, 1);
    assert!(occurs_on(anchor, RecurrenceRule::BiWeekly, anchor));
}

#[test]
fn malformed_records_degrade_to_not_due() {
    let json = r#"[
        {"id": "a", "anchorDate": "someday", "recurrenceRule": "daily"},
        {"id": "b", "anchorDate": "2024-01-01", "recurrenceRule": "every-full-moon"},
        {"id": "c", "anchorDate": "2024-01-01", "recurrenceRule": "daily", "completionState": true}
    ]"#;
    let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
    let now = noon(ymd(2024, 1, 10));
    let opts = QueryOptions::default();

    // broken anchor: never occurs
    assert!(select(&tasks, now, Bucket::Today, &opts).iter().all(|t| t.id != "a"));
    // unknown rule: single occurrence on the anchor day only
    assert_eq!(tasks[1].recurrence_rule, RecurrenceRule::None);
    assert!(select(&tasks, now, Bucket::Today, &opts).iter().all(|t| t.id != "b"));
    // stray flag on a repeating task is ignored
    assert!(select(&tasks, now, Bucket::Today, &opts).iter().any(|t| t.id == "c"));
}

#[test]
fn counts_equal_list_lengths() {
    let json = r#"[
        {"id": "1", "date": "2024-01-01", "repeat": "daily", "completed": ["2024-01-05", "2024-01-06"]},
        {"id": "2", "date": "2024-01-03", "repeat": "biweekly", "priority": 4},
        {"id": "3", "date": "2024-01-31", "repeat": "monthly", "tags": ["Bills"]},
        {"id": "4", "date": "1970-01-01", "completed": false},
        {"id": "5", "date": "2024-02-02", "completed": true},
        {"id": "6", "date": "2024-02-14", "priority": 7, "tags": ["bills", "home"]}
    ]"#;
    let tasks: Vec<Task> = serde_json::from_str(json).unwrap();

    for day in 0..120 {
        let now = noon(ymd(2023, 12, 15).offset(day));
        for opts in [
            QueryOptions::default(),
            QueryOptions { lookback: Lookback::Days(10), ..QueryOptions::default() },
            QueryOptions { tags: ["bills".to_string()].into(), ..QueryOptions::default() },
        ] {
            for bucket in Bucket::ALL {
                assert_eq!(
                    count(&tasks, now, bucket, &opts),
                    select(&tasks, now, bucket, &opts).len()
                );
            }
        }
    }
}

#[test]
fn badly_typed_records_degrade_inside_a_loaded_collection() {
    let dir = tempfile::Builder::new().prefix("tasks").tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.json"),
        r#"[
            {"id": "good", "anchorDate": "2024-01-10"},
            {"id": "epoch", "anchorDate": 0, "recurrenceRule": 7},
            {"id": "rule", "anchorDate": "2024-01-08", "recurrenceRule": 7, "completionState": "yes"},
            {"id": "daily", "anchorDate": "2024-01-01", "recurrenceRule": "daily", "completionState": {"x": 1}},
            "not a task"
        ]"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("b.json"), "{").unwrap();
    std::fs::write(
        dir.path().join("c.json"),
        r#"{"tasks": [{"id": "later", "anchorDate": "2024-01-11"}]}"#,
    )
    .unwrap();

    let loaded = load_dir(dir.path(), "*.json").unwrap();
    let tasks = &loaded.tasks;
    assert_eq!(tasks.len(), 5);

    let now = noon(ymd(2024, 1, 10));
    let opts = QueryOptions::default();
    let ids = |bucket| -> Vec<String> {
        select(tasks, now, bucket, &opts).iter().map(|t| t.id.clone()).collect()
    };

    assert_eq!(ids(Bucket::Today), ["good", "epoch", "daily"]);
    assert_eq!(ids(Bucket::Tomorrow), ["epoch", "daily", "later"]);
    // numeric 0 anchor is the undated sentinel: never overdue
    assert_eq!(ids(Bucket::Overdue), ["rule", "daily"]);

    for bucket in Bucket::ALL {
        assert_eq!(count(tasks, now, bucket, &opts), select(tasks, now, bucket, &opts).len());
    }
}
