//! # Court Permit Booker
//!
//! 定时提交网球场地申请，并用日志和邮件对账的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构，另加一个离线对账层：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 每个会话一个独立浏览器进程
//! - `infrastructure/` - `PageDriver` 持有 Page，只暴露"等、点、填、选、读"能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `LoginService` / `PermitForm` - 登录和填表
//! - `check_network` - 网络预检
//! - `Mailbox` / `Summarizer` / `ReportWriter` - 读邮件、LLM 总结、写报告
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"准备一个会话"的完整流程
//! - `BookingCtx` - 上下文封装（会话号 + 账号 + 场次 + 日期）
//! - `BookingFlow` - 流程编排（登录 → 填表 → 停在提交按钮前）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/submit_scheduler` - 逐个准备、心跳、定时提交、清理
//! - `orchestrator/report_runner` - 对账报告
//!
//! ### 对账层（Reconcile）
//! - `reconcile/` - 解析动作日志、分类邮件、判定结果、生成报告
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod reconcile;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::launch_session_browser;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Locator, PageDriver};
pub use models::{Account, BookingPlan, CourtSlot};
pub use orchestrator::{run_report, App, ReportOptions};
pub use workflow::{BookingCtx, BookingFlow, PreparedSession};
