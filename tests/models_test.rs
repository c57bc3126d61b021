use std::path::Path;

use chrono::{NaiveDate, Weekday};
use court_permit_booker::error::AppError;
use court_permit_booker::infrastructure::locator::js_string;
use court_permit_booker::models::log_markers::submit_line;
use court_permit_booker::models::{account_alias, load_booking_plan, parse_booking_plan, CourtSlot};
use court_permit_booker::workflow::BookingCtx;
use court_permit_booker::Locator;

const COURTS: &str = r#"
[[courts]]
number = 3
facility_id = "9bdef00b-afa0-4b6b-bf9a-75899f7f97c7"
site_name = "Octagon Tennis court 3"

[[courts]]
number = 6
facility_id = "77c7f42c-8891-4818-a610-d5c1027c62fe"
site_name = "Octagon Tennis Court 6"
"#;

fn plan_toml(priorities: &str) -> String {
    format!(
        r#"
[[accounts]]
email = "club+alex@example.com"
password = "pw"

[[accounts]]
email = "club+jamie@example.com"
password = "pw"
priorities = [{{ court = 6, time = 19 }}]

{priorities}

[[booking_rules]]
weekday = "Mon"
days_ahead = [1, 2]

[[booking_rules]]
weekday = "Friday"
days_ahead = [3, 4]
{courts}"#,
        priorities = priorities,
        courts = COURTS
    )
}

const DEFAULT_PRIORITIES: &str = r#"
[[priorities]]
court = 6
time = "18:00"

[[priorities]]
court = 3
time = 17

[[priorities]]
court = 6
time = "19:00"
"#;

#[test]
fn test_account_alias() {
    assert_eq!(account_alias("club+alex@example.com"), "alex");
    assert_eq!(account_alias("nyuclubtennis+jordanr@gmail.com"), "jordanr");
    assert_eq!(account_alias("plain@example.com"), "plain");
    assert_eq!(account_alias("  club+Bob@example.org "), "Bob");
    assert_eq!(account_alias("club+@example.com"), "club+");
}

#[test]
fn test_parse_plan_defaults_and_slot_times() {
    let plan = parse_booking_plan(&plan_toml(DEFAULT_PRIORITIES), "inline").unwrap();

    assert_eq!(plan.accounts.len(), 2);
    assert_eq!(plan.release_time, "08:00:00");
    assert_eq!(plan.submit_time, "08:00:09");
    assert_eq!(plan.priorities[0], CourtSlot::new(6, "18:00"));
    // 整数小时会被规范成 HH:00
    assert_eq!(plan.priorities[1], CourtSlot::new(3, "17:00"));
    assert_eq!(plan.accounts[1].priorities, vec![CourtSlot::new(6, "19:00")]);

    assert_eq!(plan.priorities[1].start_hour(), Some(17));
    assert_eq!(plan.priorities[1].end_hour(), Some(18));
    assert_eq!(plan.court(3).unwrap().site_name, "Octagon Tennis court 3");
}

#[test]
fn test_account_priorities_restrict_slots() {
    let plan = parse_booking_plan(&plan_toml(DEFAULT_PRIORITIES), "inline").unwrap();
    let alex = &plan.accounts[0];
    let jamie = &plan.accounts[1];

    assert!(alex.accepts(&CourtSlot::new(6, "18:00")));
    assert!(alex.accepts(&CourtSlot::new(3, "17:00")));
    assert!(jamie.accepts(&CourtSlot::new(6, "19:00")));
    assert!(!jamie.accepts(&CourtSlot::new(6, "18:00")));
}

#[test]
fn test_days_ahead_by_weekday() {
    let plan = parse_booking_plan(&plan_toml(DEFAULT_PRIORITIES), "inline").unwrap();

    assert_eq!(plan.days_ahead_for(Weekday::Mon), vec![1, 2]);
    assert_eq!(plan.days_ahead_for(Weekday::Fri), vec![3, 4]);
    assert!(plan.days_ahead_for(Weekday::Sun).is_empty());
}

#[test]
fn test_one_digit_hour_is_normalized() {
    let morning = "[[priorities]]\ncourt = 6\ntime = \"9:00\"\n\n[[priorities]]\ncourt = 3\ntime = 9\n";
    let plan = parse_booking_plan(&plan_toml(morning), "inline").unwrap();

    assert_eq!(plan.priorities[0].time, "09:00");
    assert_eq!(plan.priorities[1].time, "09:00");
    assert_eq!(CourtSlot::new(6, " 9:00 "), plan.priorities[0]);

    // 字符串和整数写法是同一个场次
    let alex = court_permit_booker::models::Account {
        email: "club+alex@example.com".into(),
        password: "pw".into(),
        priorities: vec![CourtSlot::new(6, "9:00")],
    };
    assert!(alex.accepts(&CourtSlot::new(6, "09:00")));
}

#[test]
fn test_plan_rejects_unknown_court() {
    let priorities = "[[priorities]]\ncourt = 2\ntime = \"18:00\"\n";
    let err = parse_booking_plan(&plan_toml(priorities), "inline").unwrap_err();
    assert!(matches!(err, AppError::InvalidPlan(_)), "{err}");
}

#[test]
fn test_plan_rejects_slot_ending_after_midnight() {
    let late = "[[priorities]]\ncourt = 6\ntime = \"23:00\"\n";
    let err = parse_booking_plan(&plan_toml(late), "inline").unwrap_err();
    assert!(matches!(err, AppError::InvalidPlan(_)));

    let last_ok = "[[priorities]]\ncourt = 6\ntime = \"22:00\"\n";
    assert!(parse_booking_plan(&plan_toml(last_ok), "inline").is_ok());
}

#[test]
fn test_plan_rejects_unparsable_time() {
    let bad = "[[priorities]]\ncourt = 6\ntime = \"6pm\"\n";
    let err = parse_booking_plan(&plan_toml(bad), "inline").unwrap_err();
    assert!(matches!(err, AppError::InvalidPlan(_)));
}

#[test]
fn test_plan_rejects_duplicate_accounts() {
    let toml = format!(
        r#"
[[accounts]]
email = "club+alex@example.com"
password = "a"

[[accounts]]
email = "CLUB+alex@example.com"
password = "b"
{}
{}"#,
        DEFAULT_PRIORITIES, COURTS
    );
    let err = parse_booking_plan(&toml, "inline").unwrap_err();
    assert!(matches!(err, AppError::InvalidPlan(_)));
}

#[test]
fn test_plan_rejects_empty_accounts() {
    let toml = format!("accounts = []\n{}\n{}", DEFAULT_PRIORITIES, COURTS);
    let err = parse_booking_plan(&toml, "inline").unwrap_err();
    assert!(matches!(err, AppError::InvalidPlan(_)));
}

#[test]
fn test_plan_rejects_bad_weekday() {
    let toml = plan_toml(DEFAULT_PRIORITIES).replace("\"Friday\"", "\"Funday\"");
    let err = parse_booking_plan(&toml, "inline").unwrap_err();
    assert!(matches!(err, AppError::InvalidPlan(_)));
}

#[test]
fn test_plan_reports_toml_syntax_error() {
    let err = parse_booking_plan("accounts = [", "broken.toml").unwrap_err();
    match err {
        AppError::TomlParse { path, .. } => assert_eq!(path, "broken.toml"),
        other => panic!("意外的错误类型: {other}"),
    }
}

#[test]
fn test_locator_js_expressions() {
    // 数字开头的 ID 不能用 #id，只能用属性选择器或 getElementById
    let id = Locator::id("11e79e5d3daf4712b9e6418d2691b976");
    assert_eq!(
        id.js_expr(),
        r#"document.getElementById("11e79e5d3daf4712b9e6418d2691b976")"#
    );
    assert_eq!(
        id.as_css().as_deref(),
        Some(r#"[id="11e79e5d3daf4712b9e6418d2691b976"]"#)
    );

    let name = Locator::name("startHour");
    assert_eq!(
        name.js_expr(),
        r#"(document.getElementsByName("startHour")[0] || null)"#
    );

    let xpath = Locator::xpath("//button[@id='cancelNewPermitRequest']/preceding-sibling::button");
    assert!(xpath.js_expr().starts_with("document.evaluate("));
    assert!(xpath.js_expr().ends_with(".singleNodeValue"));
    assert_eq!(xpath.as_css(), None);

    assert_eq!(js_string(r#"say "hi""#), r#""say \"hi\"""#);
}

#[test]
fn test_submit_line_format() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let line = submit_line(1, 3, &CourtSlot::new(6, "18:00"), date, "club+alex@example.com");
    assert_eq!(
        line,
        "Clicking submit for instance 1/3 (Court 6 on 01/03/2025 at 18:00) using club+alex@example.com"
    );
}

#[test]
fn test_booking_ctx_display() {
    let plan = parse_booking_plan(&plan_toml(DEFAULT_PRIORITIES), "inline").unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let ctx = BookingCtx::new(2, &plan.accounts[0], CourtSlot::new(6, "18:00"), date);

    assert_eq!(ctx.alias, "alex");
    assert_eq!(ctx.to_string(), "[Court 6 01/03/2025 18:00 #2 alex]");
}

#[tokio::test]
async fn test_load_example_plan() {
    let plan = load_booking_plan(Path::new("booking_plan.example.toml"))
        .await
        .expect("示例计划应能加载");

    assert_eq!(plan.courts.len(), 6);
    assert_eq!(plan.priorities.len(), 9);
    assert_eq!(plan.priorities[0], CourtSlot::new(6, "18:00"));
    assert_eq!(plan.days_ahead_for(Weekday::Fri), vec![3, 4]);

    let brian = plan
        .accounts
        .iter()
        .find(|a| a.alias() == "brian")
        .expect("示例中有 brian");
    assert!(brian.accepts(&CourtSlot::new(3, "19:00")));
    assert!(!brian.accepts(&CourtSlot::new(6, "18:00")));
}
