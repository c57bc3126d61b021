//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责会话资源和提交时机，是整个预约流程的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `submit_scheduler` - 定时提交调度器
//! - 管理运行生命周期（预检、准备、等待、提交、清理）
//! - 按优先级逐个准备会话
//! - 持有所有浏览器会话
//!
//! ### `assignment` - 账号分配
//! - 目标场次排序、账号池、失败换号
//!
//! ### `heartbeat` - 会话心跳
//!
//! ### `report_runner` - 对账报告（日志 + 邮箱 → 报告文件）
//!
//! ### `timing` - 提交时刻、错峰暂停、预约日期
//!
//! ## 层次关系
//!
//! ```text
//! submit_scheduler (处理 Vec<BookingTarget>)
//!     ↓
//! workflow::BookingFlow (准备单个会话)
//!     ↓
//! services (能力层：登录 / 填表 / 预检)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod assignment;
pub mod heartbeat;
pub mod report_runner;
pub mod submit_scheduler;
pub mod timing;

// 重新导出主要类型
pub use assignment::{
    booking_targets, fill_slot, fill_targets, AccountPool, BookingTarget, SlotOutcome,
};
pub use heartbeat::Heartbeat;
pub use report_runner::{run_report, ReportOptions};
pub use submit_scheduler::App;
pub use timing::{booking_dates, next_submit_time, should_pause};
