use chrono::NaiveDateTime;

/// 一次预约提交（从动作日志中解析出来）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingAttempt {
    /// 点击提交的时间（毫秒精度）
    pub timestamp: NaiveDateTime,
    pub court: u8,
    /// 预约的日期，保持日志里的写法（MM/DD/YYYY）
    pub booking_date: String,
    /// 场次开始时间 HH:MM
    pub time: String,
    pub email: String,
    pub alias: String,
}

impl BookingAttempt {
    /// `HH:MM:SS.mmm` 形式的提交时间
    pub fn time_str(&self) -> String {
        self.timestamp.format("%H:%M:%S%.3f").to_string()
    }
}
