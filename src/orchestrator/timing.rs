//! 时间计算
//!
//! 提交时刻、错峰暂停、预约日期。纯函数部分不读时钟，方便测试。

use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::models::BookingPlan;

/// 粗等待结束后留给精确等待的余量
const PRECISE_WINDOW: Duration = Duration::from_millis(1500);

/// 下一次提交时刻：今天的 `submit_time`，已经过了就是明天
pub fn next_submit_time(now: NaiveDateTime, submit_time: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(submit_time);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// 第 `index` 次点击（从 0 开始）之后是否需要暂停
///
/// 每 `every` 次暂停一次，最后一次之后不暂停；`every == 0` 表示从不暂停。
pub fn should_pause(index: usize, total: usize, every: usize) -> bool {
    every > 0 && (index + 1) % every == 0 && index + 1 < total
}

/// 按预约规则算出要预约的日期
///
/// `day` 的星期决定提前几天；没有规则时返回空。
pub fn booking_dates(day: NaiveDate, plan: &BookingPlan) -> Vec<NaiveDate> {
    plan.days_ahead_for(day.weekday())
        .into_iter()
        .filter_map(|ahead| day.checked_add_signed(chrono::Duration::days(ahead)))
        .collect()
}

/// 本地时间
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// 距离目标还有多久（已过则为 0）
pub fn remaining_until(now: NaiveDateTime, target: NaiveDateTime) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

/// 等到目标时刻（毫秒精度）
///
/// 先粗睡到目标前 1.5 秒，再用短睡眠逼近目标。
pub async fn wait_until(target: NaiveDateTime) {
    let remaining = remaining_until(local_now(), target);
    info!(
        "⏳ 等待到 {} (还有 {:.1} 秒)",
        target.format("%Y-%m-%d %H:%M:%S%.3f"),
        remaining.as_secs_f64()
    );

    if remaining > PRECISE_WINDOW {
        sleep(remaining - PRECISE_WINDOW).await;
    }
    debug!("进入精确等待");

    loop {
        let left = remaining_until(local_now(), target);
        if left.is_zero() {
            break;
        }
        sleep(left.min(Duration::from_millis(5))).await;
    }
}
