//! 动作日志中的固定标记
//!
//! 提交流程写这些行，对账流程解析这些行，两边共用一份定义。

use chrono::NaiveDate;

use crate::models::account::{normalize_slot_time, CourtSlot};

/// 一次运行开始
pub const SCRIPT_STARTED: &str = "Script started";

/// 到达目标时刻，开始提交
pub const SUBMISSION_PHASE: &str = "Target time reached! Starting RAPID Submission Phase";

/// 日志中预约日期的格式
pub const BOOKING_DATE_FORMAT: &str = "%m/%d/%Y";

/// 生成提交行
///
/// `Clicking submit for instance 1/3 (Court 6 on 01/03/2025 at 18:00) using club+alex@example.com`
pub fn submit_line(
    instance: usize,
    total: usize,
    slot: &CourtSlot,
    date: NaiveDate,
    email: &str,
) -> String {
    format!(
        "Clicking submit for instance {}/{} (Court {} on {} at {}) using {}",
        instance,
        total,
        slot.court,
        date.format(BOOKING_DATE_FORMAT),
        normalize_slot_time(&slot.time),
        email
    )
}
