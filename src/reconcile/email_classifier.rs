//! 邮件分类
//!
//! 按标题里的固定短语判断结果，按收件人判断是哪个账号。

use chrono::{DateTime, Local, NaiveDateTime};
use regex::Regex;

use crate::models::{account_alias, DecisionCategory, EmailDecision};

/// (标题中的短语, 分类)，按顺序匹配
const SUBJECT_RULES: &[(&str, DecisionCategory)] = &[
    ("Your Tennis Permit has been approved", DecisionCategory::Approved),
    ("Unable to Process your request", DecisionCategory::Rejected),
    ("Your permit request has been canceled", DecisionCategory::Canceled),
    ("Pending Approval", DecisionCategory::Pending),
    ("application has been received", DecisionCategory::Pending),
];

/// 按标题判断邮件分类
pub fn classify_subject(subject: &str) -> DecisionCategory {
    SUBJECT_RULES
        .iter()
        .find(|(phrase, _)| subject.contains(phrase))
        .map(|(_, category)| *category)
        .unwrap_or(DecisionCategory::Unknown)
}

/// 从 To 字段中取出第一个邮箱地址的别名
///
/// `"Alex" <club+alex@example.com>` → `alex`
pub fn recipient_alias(to_field: &str) -> Option<String> {
    let re = Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").ok()?;
    re.find(to_field).map(|m| account_alias(m.as_str()))
}

/// 解析邮件 Date 头（RFC 2822），转成本地时间
pub fn parse_mail_date(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
        .or_else(|| NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S").ok())
}

/// 由收件人、标题、收到时间构造一条邮件结果；收件人无法识别时返回 None
pub fn decision_from_headers(
    to_field: &str,
    subject: &str,
    received: Option<NaiveDateTime>,
) -> Option<EmailDecision> {
    let alias = recipient_alias(to_field)?;
    Some(EmailDecision {
        alias,
        category: classify_subject(subject),
        subject: subject.to_string(),
        received,
    })
}
