use chrono::{NaiveDate, NaiveDateTime};
use court_permit_booker::models::log_markers::submit_line;
use court_permit_booker::models::CourtSlot;
use court_permit_booker::reconcile::log_parser::LineParser;
use court_permit_booker::reconcile::{parse_log_line, parse_log_lines, BookingLogParser};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.3f").unwrap()
}

const SAMPLE_LOG: &str = "\
2025-01-01 08:00:09,500 - INFO - Clicking submit for instance 1/1 (Court 6 on 01/03/2025 at 18:00) using club+old@example.com
2025-01-02 07:58:00,001 - INFO - Script started
2025-01-02 07:58:30.250  INFO court_permit_booker: 会话准备完成
    Traceback line without a timestamp
2025-01-02 08:00:09,002  INFO Target time reached! Starting RAPID Submission Phase
2025-01-02 08:00:09,120  INFO Clicking submit for instance 1/3 (Court 6 on 01/03/2025 at 18:00) using club+alex@example.com
2025-01-02 08:00:09.310  INFO Clicking submit for instance 2/3 (Court 3 on 01/03/2025 at 18:00) using club+jamie@example.com
2025-01-02 08:00:09,700  INFO Clicking submit for instance 3/3 (Court 6 on 01/04/2025 at 19:00) using club+alex@example.com
2025-01-03 08:00:09,120  INFO Clicking submit for instance 1/1 (Court 5 on 01/05/2025 at 18:00) using club+next@example.com
";

#[test]
fn test_timestamp_comma_and_dot_millis() {
    let parser = LineParser::new().unwrap();

    assert_eq!(
        parser.timestamp("2025-01-02 08:00:09,120 - INFO - x"),
        Some(at("2025-01-02 08:00:09.120"))
    );
    assert_eq!(
        parser.timestamp("2025-01-02 08:00:09.007  INFO x"),
        Some(at("2025-01-02 08:00:09.007"))
    );
    assert_eq!(parser.timestamp("    at line 3"), None);
    assert_eq!(parser.timestamp("2025-01-02 08:00:09 no millis"), None);
}

#[test]
fn test_parse_submit_line() {
    let line = "2025-01-02 08:00:09,120 - INFO - Clicking submit for instance 1/3 (Court 6 on 01/03/2025 at 18:00) using nyuclubtennis+jordan.r@gmail.com";
    let attempt = parse_log_line(line).expect("应识别为提交行");

    assert_eq!(attempt.timestamp, at("2025-01-02 08:00:09.120"));
    assert_eq!(attempt.court, 6);
    assert_eq!(attempt.booking_date, "01/03/2025");
    assert_eq!(attempt.time, "18:00");
    assert_eq!(attempt.email, "nyuclubtennis+jordan.r@gmail.com");
    assert_eq!(attempt.alias, "jordan.r");
    assert_eq!(attempt.time_str(), "08:00:09.120");
}

#[test]
fn test_submit_line_with_one_digit_hour_parses_back() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    for slot in [
        CourtSlot::new(6, "9:00"),
        CourtSlot {
            court: 6,
            time: "9:00".to_string(),
        },
    ] {
        let line = format!(
            "2025-01-02 08:00:09.120  INFO court_permit_booker::utils::logging: {}",
            submit_line(1, 1, &slot, date, "club+alex@example.com")
        );
        let attempt = parse_log_line(&line).expect("自己写的提交行应能读回");
        assert_eq!(attempt.court, 6);
        assert_eq!(attempt.time, "09:00");
        assert_eq!(attempt.alias, "alex");
    }
}

#[test]
fn test_non_submit_lines_are_ignored() {
    assert!(parse_log_line("2025-01-02 08:00:09,120 - INFO - Script started").is_none());
    assert!(parse_log_line(
        "Clicking submit for instance 1/3 (Court 6 on 01/03/2025 at 18:00) using club+alex@example.com"
    )
    .is_none());
    // 场地号超出 u8
    assert!(parse_log_line(
        "2025-01-02 08:00:09,120 Clicking submit for instance 1/3 (Court 999 on 01/03/2025 at 18:00) using a@b.com"
    )
    .is_none());
}

#[test]
fn test_parse_log_lines_filters_by_date() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let data = parse_log_lines(date, SAMPLE_LOG.lines()).unwrap();

    assert_eq!(data.date, date);
    assert_eq!(data.total_attempts(), 3);
    assert_eq!(data.script_start, Some(at("2025-01-02 07:58:00.001")));
    assert_eq!(data.submission_time, Some(at("2025-01-02 08:00:09.002")));

    // 日志顺序
    let aliases: Vec<&str> = data.attempts.iter().map(|a| a.alias.as_str()).collect();
    assert_eq!(aliases, vec!["alex", "jamie", "alex"]);
}

#[test]
fn test_parse_log_lines_groups_and_counts() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let data = parse_log_lines(date, SAMPLE_LOG.lines()).unwrap();

    assert_eq!(data.by_account.len(), 2);
    assert_eq!(data.by_account["alex"].len(), 2);
    assert_eq!(data.by_account["jamie"].len(), 1);
    assert_eq!(data.by_account["alex"][1].booking_date, "01/04/2025");

    assert_eq!(data.courts_attempted.get(&6), Some(&2));
    assert_eq!(data.courts_attempted.get(&3), Some(&1));
    assert_eq!(data.times_attempted.get("18:00"), Some(&2));
    assert_eq!(data.times_attempted.get("19:00"), Some(&1));
}

#[test]
fn test_parse_log_lines_empty_day() {
    let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let data = parse_log_lines(date, SAMPLE_LOG.lines()).unwrap();

    assert_eq!(data.total_attempts(), 0);
    assert!(data.by_account.is_empty());
    assert_eq!(data.script_start, None);
    assert_eq!(data.submission_time, None);
}

#[tokio::test]
async fn test_booking_log_parser_reads_file() {
    let dir = std::env::temp_dir().join(format!("court_log_test_{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("booking_actions.log");
    tokio::fs::write(&path, SAMPLE_LOG).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let data = BookingLogParser::new(&path).parse(date).await.unwrap();
    assert_eq!(data.total_attempts(), 1);
    assert_eq!(data.attempts[0].alias, "next");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_booking_log_parser_missing_file() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let result = BookingLogParser::new("definitely/not/here.log")
        .parse(date)
        .await;
    assert!(result.is_err());
}
