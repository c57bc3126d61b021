//! 动作日志端到端：用程序自己的日志配置写文件，再用对账解析器读回来
//!
//! 日志系统是全局的，只能初始化一次，所以单独放在这个测试文件里。

use chrono::{Local, NaiveDate};
use court_permit_booker::models::CourtSlot;
use court_permit_booker::reconcile::BookingLogParser;
use court_permit_booker::utils::logging;

#[tokio::test]
async fn test_action_log_is_readable_by_parser() {
    let dir = std::env::temp_dir().join(format!("court_action_log_{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("auto_booker_action.log");

    logging::init(path.to_str().unwrap(), false).expect("日志初始化失败");

    let booking = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let today = Local::now().date_naive();

    logging::log_submission_phase();
    logging::log_submit_click(1, 3, &CourtSlot::new(6, "18:00"), booking, "club+alex@example.com");
    logging::log_submit_click(2, 3, &CourtSlot::new(3, "9:00"), booking, "club+jamie@example.com");
    // 绕过构造函数的原始写法也要能读回
    let raw = CourtSlot {
        court: 5,
        time: "7:00".to_string(),
    };
    logging::log_submit_click(3, 3, &raw, booking, "club+morgan@example.com");

    let data = BookingLogParser::new(&path).parse(today).await.unwrap();

    assert!(data.submission_time.is_some(), "应找到提交阶段标记");
    assert_eq!(data.total_attempts(), 3);

    let aliases: Vec<&str> = data.attempts.iter().map(|a| a.alias.as_str()).collect();
    assert_eq!(aliases, vec!["alex", "jamie", "morgan"]);
    assert_eq!(data.attempts[0].time, "18:00");
    assert_eq!(data.attempts[1].time, "09:00");
    assert_eq!(data.attempts[2].time, "07:00");
    assert_eq!(data.attempts[1].booking_date, "01/03/2025");
    assert!(data.attempts.iter().all(|a| a.timestamp >= data.submission_time.unwrap()));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
