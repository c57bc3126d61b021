use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// 预约账号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub password: String,
    /// 账号自己的场次偏好（为空时接受全局优先级中的任意场次）
    #[serde(default)]
    pub priorities: Vec<CourtSlot>,
}

impl Account {
    /// 账号别名（邮箱 `+` 后的标签）
    pub fn alias(&self) -> String {
        account_alias(&self.email)
    }

    /// 该账号是否愿意预约这个场次
    pub fn accepts(&self, slot: &CourtSlot) -> bool {
        self.priorities.is_empty() || self.priorities.contains(slot)
    }
}

/// 从邮箱地址中提取账号别名
///
/// `club+alex@example.com` → `alex`；没有 `+` 标签时返回 `@` 前的部分。
pub fn account_alias(email: &str) -> String {
    let local = email.trim().split('@').next().unwrap_or_default();
    match local.split_once('+') {
        Some((_, tag)) if !tag.is_empty() => tag.to_string(),
        _ => local.to_string(),
    }
}

/// 一个场次：场地编号 + 开始时间（一小时）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourtSlot {
    pub court: u8,
    #[serde(deserialize_with = "deserialize_slot_time")]
    pub time: String,
}

impl CourtSlot {
    pub fn new(court: u8, time: impl Into<String>) -> Self {
        let time: String = time.into();
        Self {
            court,
            time: normalize_slot_time(&time),
        }
    }

    /// 解析开始时间
    pub fn start_time(&self) -> Option<NaiveTime> {
        parse_slot_time(&self.time)
    }

    /// 开始小时
    pub fn start_hour(&self) -> Option<u32> {
        self.start_time().map(|t| t.hour())
    }

    /// 结束小时（开始 + 1）
    pub fn end_hour(&self) -> Option<u32> {
        self.start_hour().map(|h| h + 1)
    }
}

impl fmt::Display for CourtSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Court {} at {}", self.court, self.time)
    }
}

/// 解析 `HH:MM` 格式的场次时间
pub fn parse_slot_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// 统一成两位小时的 `HH:MM`（"9:00" → "09:00"）
///
/// 日志、比较、对账都依赖这个形式；无法解析的值原样保留，交给计划校验报错。
pub fn normalize_slot_time(s: &str) -> String {
    match parse_slot_time(s) {
        Some(t) => t.format("%H:%M").to_string(),
        None => s.trim().to_string(),
    }
}

// 场次时间既可以写 "18:00"，也可以直接写小时数 18
fn deserialize_slot_time<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;

    struct SlotTimeVisitor;

    impl<'de> Visitor<'de> for SlotTimeVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a \"HH:MM\" string or an hour integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(normalize_slot_time(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if !(0..24).contains(&value) {
                return Err(E::custom(format!("hour out of range: {}", value)));
            }
            Ok(format!("{:02}:00", value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            self.visit_i64(value as i64)
        }
    }

    deserializer.deserialize_any(SlotTimeVisitor)
}
