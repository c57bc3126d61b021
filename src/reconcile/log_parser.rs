//! 动作日志解析
//!
//! 从预约程序的动作日志里找出某一天的提交记录。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::log_markers::{SCRIPT_STARTED, SUBMISSION_PHASE};
use crate::models::{account_alias, BookingAttempt};

const TIMESTAMP_PATTERN: &str = r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})[,.](\d{3})";
const SUBMIT_PATTERN: &str = r"Clicking submit for instance \d+/\d+ \(Court (\d+) on ([\d/\-]+) at (\d{2}:\d{2})\) using ([\w\+@\.\-]+)";

/// 一天的日志解析结果
#[derive(Debug, Clone)]
pub struct LogData {
    pub date: NaiveDate,
    pub script_start: Option<NaiveDateTime>,
    pub submission_time: Option<NaiveDateTime>,
    /// 按日志顺序
    pub attempts: Vec<BookingAttempt>,
    pub by_account: BTreeMap<String, Vec<BookingAttempt>>,
    pub courts_attempted: BTreeMap<u8, usize>,
    pub times_attempted: BTreeMap<String, usize>,
}

impl LogData {
    pub fn total_attempts(&self) -> usize {
        self.attempts.len()
    }
}

/// 单行解析器（正则只编译一次）
pub struct LineParser {
    timestamp_re: Regex,
    submit_re: Regex,
}

impl LineParser {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            timestamp_re: Regex::new(TIMESTAMP_PATTERN)?,
            submit_re: Regex::new(SUBMIT_PATTERN)?,
        })
    }

    /// 行首时间戳，支持 `,mmm` 和 `.mmm` 两种毫秒写法
    pub fn timestamp(&self, line: &str) -> Option<NaiveDateTime> {
        let caps = self.timestamp_re.captures(line)?;
        let text = format!("{}.{}", &caps[1], &caps[2]);
        NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.3f").ok()
    }

    /// 解析一条提交行；不是提交行或没有时间戳时返回 None
    pub fn attempt(&self, line: &str) -> Option<BookingAttempt> {
        let timestamp = self.timestamp(line)?;
        let caps = self.submit_re.captures(line)?;
        let court = caps[1].parse::<u8>().ok()?;
        let email = caps[4].to_string();

        Some(BookingAttempt {
            timestamp,
            court,
            booking_date: caps[2].to_string(),
            time: caps[3].to_string(),
            alias: account_alias(&email),
            email,
        })
    }
}

/// 解析单行日志（便捷函数）
pub fn parse_log_line(line: &str) -> Option<BookingAttempt> {
    LineParser::new().ok()?.attempt(line)
}

/// 按日期过滤日志行并汇总
///
/// 只看以 `YYYY-MM-DD` 开头的行；没有时间戳的续行会被忽略。
pub fn parse_log_lines<'a, I>(date: NaiveDate, lines: I) -> AppResult<LogData>
where
    I: IntoIterator<Item = &'a str>,
{
    let parser = LineParser::new()?;
    let prefix = date.format("%Y-%m-%d").to_string();

    let mut script_start = None;
    let mut submission_time = None;
    let mut attempts = Vec::new();

    for line in lines.into_iter().filter(|l| l.starts_with(&prefix)) {
        let line_time = parser.timestamp(line);

        if line.contains(SCRIPT_STARTED) {
            script_start = line_time;
            debug!("找到启动标记: {:?}", line_time);
        }
        if line.contains(SUBMISSION_PHASE) {
            submission_time = line_time;
            debug!("找到提交阶段标记: {:?}", line_time);
        }
        if let Some(attempt) = parser.attempt(line) {
            debug!(
                "提交记录: {} → Court {} at {} on {}",
                attempt.alias, attempt.court, attempt.time, attempt.booking_date
            );
            attempts.push(attempt);
        }
    }

    let mut by_account: BTreeMap<String, Vec<BookingAttempt>> = BTreeMap::new();
    let mut courts_attempted = BTreeMap::new();
    let mut times_attempted = BTreeMap::new();
    for attempt in &attempts {
        by_account
            .entry(attempt.alias.clone())
            .or_default()
            .push(attempt.clone());
        *courts_attempted.entry(attempt.court).or_insert(0) += 1;
        *times_attempted.entry(attempt.time.clone()).or_insert(0) += 1;
    }

    Ok(LogData {
        date,
        script_start,
        submission_time,
        attempts,
        by_account,
        courts_attempted,
        times_attempted,
    })
}

/// 动作日志文件解析器
pub struct BookingLogParser {
    log_file: PathBuf,
}

impl BookingLogParser {
    pub fn new(log_file: impl AsRef<Path>) -> Self {
        Self {
            log_file: log_file.as_ref().to_path_buf(),
        }
    }

    /// 读取日志文件并解析指定日期
    pub async fn parse(&self, date: NaiveDate) -> AppResult<LogData> {
        info!("📄 解析动作日志: {}", self.log_file.display());
        let content = tokio::fs::read_to_string(&self.log_file).await?;
        let data = parse_log_lines(date, content.lines())?;
        info!(
            "✓ {} 共找到 {} 次提交，涉及 {} 个账号",
            date,
            data.total_attempts(),
            data.by_account.len()
        );
        Ok(data)
    }
}
