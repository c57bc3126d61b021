//! 预约上下文
//!
//! 封装"第几个会话、哪个账号、订哪块场地的哪一天"这一信息

use std::fmt::Display;

use chrono::NaiveDate;

use crate::models::log_markers::BOOKING_DATE_FORMAT;
use crate::models::{Account, CourtSlot};

/// 单个会话的预约上下文
#[derive(Debug, Clone)]
pub struct BookingCtx {
    /// 会话编号（从 1 开始，同时决定浏览器用户目录）
    pub session_index: usize,

    pub email: String,

    /// 账号别名（仅用于日志显示）
    pub alias: String,

    pub slot: CourtSlot,

    /// 要预约的日期
    pub date: NaiveDate,
}

impl BookingCtx {
    pub fn new(session_index: usize, account: &Account, slot: CourtSlot, date: NaiveDate) -> Self {
        Self {
            session_index,
            email: account.email.clone(),
            alias: account.alias(),
            slot,
            date,
        }
    }
}

impl Display for BookingCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[Court {} {} {} #{} {}]",
            self.slot.court,
            self.date.format(BOOKING_DATE_FORMAT),
            self.slot.time,
            self.session_index,
            self.alias
        )
    }
}
