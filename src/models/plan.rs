//! 预约计划
//!
//! 账号、全局场次优先级、按星期的预约规则、场地元素 ID，
//! 全部来自一个 TOML 文件。

use std::collections::HashSet;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::account::{Account, CourtSlot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPlan {
    /// 供应商开放预约的时刻
    #[serde(default = "default_release_time")]
    pub release_time: String,
    /// 实际点击提交的时刻
    #[serde(default = "default_submit_time")]
    pub submit_time: String,
    pub accounts: Vec<Account>,
    /// 全局场次优先级（高优先级在前）
    pub priorities: Vec<CourtSlot>,
    #[serde(default)]
    pub booking_rules: Vec<BookingRule>,
    pub courts: Vec<CourtInfo>,
}

/// 某个星期几要预约几天之后的场地
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRule {
    /// "Mon" / "Monday" 等
    pub weekday: String,
    pub days_ahead: Vec<i64>,
}

/// 场地在供应商页面上的标识
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtInfo {
    pub number: u8,
    /// 设施复选框的元素 ID
    pub facility_id: String,
    /// 站点下拉框中的可见文本
    pub site_name: String,
}

fn default_release_time() -> String {
    "08:00:00".to_string()
}

fn default_submit_time() -> String {
    "08:00:09".to_string()
}

impl BookingPlan {
    /// 校验计划内容
    pub fn validate(&self) -> AppResult<()> {
        if self.accounts.is_empty() {
            return Err(AppError::invalid_plan("至少需要一个账号"));
        }
        if self.priorities.is_empty() {
            return Err(AppError::invalid_plan("场次优先级列表为空"));
        }

        let mut emails = HashSet::new();
        for account in &self.accounts {
            if !emails.insert(account.email.to_lowercase()) {
                return Err(AppError::invalid_plan(format!("账号重复: {}", account.email)));
            }
        }

        let mut numbers = HashSet::new();
        for court in &self.courts {
            if !numbers.insert(court.number) {
                return Err(AppError::invalid_plan(format!("场地 {} 重复定义", court.number)));
            }
        }

        let account_slots = self.accounts.iter().flat_map(|a| a.priorities.iter());
        for slot in self.priorities.iter().chain(account_slots) {
            self.validate_slot(slot)?;
        }

        for rule in &self.booking_rules {
            parse_weekday(&rule.weekday)?;
        }

        parse_clock(&self.release_time)?;
        parse_clock(&self.submit_time)?;
        Ok(())
    }

    fn validate_slot(&self, slot: &CourtSlot) -> AppResult<()> {
        if self.court(slot.court).is_none() {
            return Err(AppError::invalid_plan(format!("场地 {} 未在 courts 中定义", slot.court)));
        }
        match slot.start_hour() {
            None => Err(AppError::invalid_plan(format!("无法解析场次时间: {}", slot.time))),
            Some(hour) if hour + 1 >= 24 => Err(AppError::invalid_plan(format!(
                "场次 {} 的结束时间超出当天",
                slot
            ))),
            Some(_) => Ok(()),
        }
    }

    /// 按编号查找场地
    pub fn court(&self, number: u8) -> Option<&CourtInfo> {
        self.courts.iter().find(|c| c.number == number)
    }

    /// 今天（weekday）需要预约几天之后的场地
    pub fn days_ahead_for(&self, weekday: Weekday) -> Vec<i64> {
        self.booking_rules
            .iter()
            .filter(|rule| parse_weekday(&rule.weekday).ok() == Some(weekday))
            .flat_map(|rule| rule.days_ahead.iter().copied())
            .collect()
    }

    pub fn release_time(&self) -> AppResult<NaiveTime> {
        parse_clock(&self.release_time)
    }

    pub fn submit_time(&self) -> AppResult<NaiveTime> {
        parse_clock(&self.submit_time)
    }
}

fn parse_weekday(s: &str) -> AppResult<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| AppError::invalid_plan(format!("无法解析星期: {}", s)))
}

/// 解析 `HH:MM:SS`（也接受 `HH:MM`）
pub fn parse_clock(s: &str) -> AppResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| AppError::invalid_plan(format!("无法解析时间: {}", s)))
}
