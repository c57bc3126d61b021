use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use court_permit_booker::models::{parse_booking_plan, Account, BookingPlan, CourtSlot};
use court_permit_booker::orchestrator::timing::remaining_until;
use court_permit_booker::orchestrator::{
    booking_dates, booking_targets, fill_slot, fill_targets, next_submit_time, should_pause,
    AccountPool, SlotOutcome,
};
use court_permit_booker::services::ReportWriter;
use tokio::sync::Mutex;

const PLAN: &str = r#"
[[accounts]]
email = "club+alex@example.com"
password = "pw"

[[accounts]]
email = "club+jamie@example.com"
password = "pw"

[[priorities]]
court = 6
time = "18:00"

[[priorities]]
court = 3
time = "18:00"

[[booking_rules]]
weekday = "Fri"
days_ahead = [3, 4]

[[booking_rules]]
weekday = "Tue"
days_ahead = [2]

[[courts]]
number = 3
facility_id = "9bdef00b-afa0-4b6b-bf9a-75899f7f97c7"
site_name = "Octagon Tennis court 3"

[[courts]]
number = 6
facility_id = "77c7f42c-8891-4818-a610-d5c1027c62fe"
site_name = "Octagon Tennis Court 6"
"#;

fn plan() -> BookingPlan {
    parse_booking_plan(PLAN, "inline").unwrap()
}

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn account(alias: &str, priorities: Vec<CourtSlot>) -> Account {
    Account {
        email: format!("club+{}@example.com", alias),
        password: "pw".into(),
        priorities,
    }
}

#[test]
fn test_next_submit_time_today_or_tomorrow() {
    let submit = NaiveTime::from_hms_opt(8, 0, 9).unwrap();

    assert_eq!(
        next_submit_time(dt("2025-01-03 07:55:00"), submit),
        dt("2025-01-03 08:00:09")
    );
    // 已经过了就顺延到明天
    assert_eq!(
        next_submit_time(dt("2025-01-03 08:00:09"), submit),
        dt("2025-01-04 08:00:09")
    );
    assert_eq!(
        next_submit_time(dt("2025-12-31 23:00:00"), submit),
        dt("2026-01-01 08:00:09")
    );
}

#[test]
fn test_remaining_until_never_negative() {
    let now = dt("2025-01-03 08:00:00");
    assert_eq!(remaining_until(now, dt("2025-01-03 08:00:09")).as_secs(), 9);
    assert!(remaining_until(now, dt("2025-01-03 07:59:59")).is_zero());
}

#[test]
fn test_should_pause() {
    // 每 3 次暂停，共 7 次：第 3、6 次之后暂停
    let pauses: Vec<usize> = (0..7).filter(|&i| should_pause(i, 7, 3)).collect();
    assert_eq!(pauses, vec![2, 5]);

    // 最后一次之后不暂停
    assert!(!should_pause(5, 6, 3));
    assert!(!should_pause(0, 5, 0));
}

#[test]
fn test_booking_dates_follow_rules() {
    let plan = plan();
    let friday = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let sunday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();

    assert_eq!(
        booking_dates(friday, &plan),
        vec![
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 7).unwrap(),
        ]
    );
    assert_eq!(
        booking_dates(tuesday, &plan),
        vec![NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()]
    );
    assert!(booking_dates(sunday, &plan).is_empty());
}

#[test]
fn test_booking_targets_order() {
    let plan = plan();
    let d1 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();

    let targets = booking_targets(&plan, &[d1, d2]);
    let flat: Vec<(NaiveDate, u8)> = targets.iter().map(|t| (t.date, t.slot.court)).collect();
    assert_eq!(flat, vec![(d1, 6), (d1, 3), (d2, 6), (d2, 3)]);
}

#[test]
fn test_account_pool_take_for_respects_priorities() {
    let evening = CourtSlot::new(6, "19:00");
    let mut pool = AccountPool::new(vec![
        account("jamie", vec![evening.clone()]),
        account("alex", vec![]),
    ]);

    let first = pool.take_for(&CourtSlot::new(3, "18:00")).unwrap();
    assert_eq!(first.alias(), "alex");
    assert_eq!(pool.len(), 1);

    assert!(pool.take_for(&CourtSlot::new(3, "18:00")).is_none());
    assert_eq!(pool.take_for(&evening).unwrap().alias(), "jamie");
    assert!(pool.is_empty());
}

#[test]
fn test_account_pool_shuffled_keeps_everyone() {
    let pool = AccountPool::shuffled(vec![
        account("a", vec![]),
        account("b", vec![]),
        account("c", vec![]),
    ]);
    assert_eq!(pool.len(), 3);
}

#[tokio::test]
async fn test_fill_slot_retries_with_next_account() {
    let pool = Mutex::new(AccountPool::new(vec![
        account("alex", vec![]),
        account("jamie", vec![]),
    ]));
    let mut seen = Vec::new();

    let outcome = fill_slot(&pool, &CourtSlot::new(6, "18:00"), 2, |acc: Account| {
        let alias = acc.alias();
        seen.push(alias.clone());
        async move {
            if alias == "jamie" {
                Ok::<_, &str>(alias)
            } else {
                Err("登录失败")
            }
        }
    })
    .await;

    assert!(matches!(outcome, SlotOutcome::Prepared(ref a) if a == "jamie"));
    assert_eq!(seen, vec!["alex".to_string(), "jamie".to_string()]);
    assert!(pool.lock().await.is_empty());
}

#[tokio::test]
async fn test_fill_slot_gives_up_after_max_retries() {
    let pool = Mutex::new(AccountPool::new(vec![
        account("alex", vec![]),
        account("jamie", vec![CourtSlot::new(6, "19:00")]),
        account("morgan", vec![]),
        account("jordan", vec![]),
    ]));

    let outcome = fill_slot(&pool, &CourtSlot::new(6, "18:00"), 1, |_acc: Account| async {
        Err::<(), _>("表单未加载")
    })
    .await;

    // 首次 + 1 次重试；jamie 不接受这个场次，被跳过
    assert!(matches!(outcome, SlotOutcome::Exhausted { tries: 2 }));
    let mut pool = pool.lock().await;
    assert_eq!(pool.len(), 2);
    assert!(pool.take_for(&CourtSlot::new(6, "19:00")).is_some());
}

#[test]
fn test_fill_slot_runs_out_of_accounts() {
    let pool = Mutex::new(AccountPool::new(vec![account("alex", vec![])]));
    let slot = CourtSlot::new(6, "18:00");

    let outcome = tokio_test::block_on(fill_slot(&pool, &slot, 5, |_acc: Account| async {
        Err::<(), _>("超时")
    }));
    assert!(matches!(outcome, SlotOutcome::Exhausted { tries: 1 }));

    let outcome = tokio_test::block_on(fill_slot(&pool, &slot, 5, |_acc: Account| async {
        Ok::<_, &str>(())
    }));
    assert!(matches!(outcome, SlotOutcome::NoAccount));
}

#[tokio::test]
async fn test_fill_targets_retries_before_next_target() {
    let plan = plan();
    let d1 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
    let targets = booking_targets(&plan, &[d1, d2]);
    assert_eq!(targets.len(), 4);

    let pool = Mutex::new(AccountPool::new(vec![
        account("alex", vec![]),
        account("jamie", vec![]),
        account("morgan", vec![]),
        account("jordan", vec![]),
    ]));
    let mut calls = Vec::new();

    let outcomes = fill_targets(&pool, &targets, 2, |acc: Account, target| {
        let alias = acc.alias();
        calls.push((target.date, target.slot.court, alias.clone()));
        async move {
            if alias == "alex" {
                Err("登录失败")
            } else {
                Ok(alias)
            }
        }
    })
    .await;

    // 第一个目标换号重试，拿到 jamie 之后才轮到第二个目标；最后一个目标没号可用
    assert_eq!(
        calls,
        vec![
            (d1, 6, "alex".to_string()),
            (d1, 6, "jamie".to_string()),
            (d1, 3, "morgan".to_string()),
            (d2, 6, "jordan".to_string()),
        ]
    );
    assert_eq!(outcomes.len(), 4);
    assert!(matches!(outcomes[0], SlotOutcome::Prepared(ref a) if a == "jamie"));
    assert!(matches!(outcomes[1], SlotOutcome::Prepared(ref a) if a == "morgan"));
    assert!(matches!(outcomes[2], SlotOutcome::Prepared(ref a) if a == "jordan"));
    assert!(matches!(outcomes[3], SlotOutcome::NoAccount));
    assert!(pool.lock().await.is_empty());
}

#[test]
fn test_report_writer_default_path() {
    let writer = ReportWriter::new("summaries");
    let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    assert_eq!(
        writer.default_path(date),
        std::path::PathBuf::from("summaries/booking_summary_20250102.txt")
    );
}

#[tokio::test]
async fn test_report_writer_creates_parent_dir() {
    let dir = std::env::temp_dir().join(format!("court_report_test_{}", std::process::id()));
    let writer = ReportWriter::new(&dir);
    let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let path = writer.default_path(date);

    writer.write(&path, "TENNIS BOOKING SUMMARY").await.unwrap();
    let written = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(written, "TENNIS BOOKING SUMMARY");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
