//! 日志工具模块
//!
//! 提供日志初始化和阶段横幅的辅助函数

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::models::log_markers::{submit_line, SUBMISSION_PHASE};
use crate::models::CourtSlot;

/// 日志时间戳格式（对账时按这个格式解析）
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// 初始化日志
///
/// - 控制台：默认 info，可用 `RUST_LOG` 覆盖
/// - 动作日志文件：追加写入，本 crate 的 debug 日志全部保留，不带颜色
///
/// # 参数
/// - `action_log_file`: 动作日志路径
/// - `verbose`: 控制台是否显示 debug 日志
pub fn init(action_log_file: &str, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(action_log_file)
        .with_context(|| format!("无法打开日志文件: {}", action_log_file))?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let console_layer = fmt::layer()
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_target(false)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(EnvFilter::new("warn,court_permit_booker=debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志系统初始化失败")?;
    Ok(())
}

/// 只输出到控制台的日志（report 命令用，不写动作日志）
pub fn init_console(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
                .with_target(false)
                .with_filter(filter),
        )
        .try_init()
        .context("日志系统初始化失败")?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `mode`: 运行模式
/// - `accounts`: 账号数量
/// - `priorities`: 场次优先级数量
pub fn log_startup(mode: &str, accounts: usize, priorities: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", mode);
    info!("👤 账号数: {} | 🎾 场次优先级: {}", accounts, priorities);
    info!("{}", "=".repeat(60));
}

/// 阶段横幅
pub fn log_phase(title: &str) {
    info!("\n{}", "=".repeat(60));
    info!("{}", title);
    info!("{}", "=".repeat(60));
}

/// 到点，进入提交阶段（对账时以这一行作为提交基准时刻）
pub fn log_submission_phase() {
    info!("{}", SUBMISSION_PHASE);
}

/// 记录一次提交点击，格式见 [`submit_line`]
pub fn log_submit_click(instance: usize, total: usize, slot: &CourtSlot, date: NaiveDate, email: &str) {
    info!("{}", submit_line(instance, total, slot, date, email));
}

/// 准备阶段完成
///
/// # 参数
/// - `ready`: 就绪会话数
/// - `failed`: 准备失败次数
/// - `slots`: 目标场次数
pub fn log_preparation_complete(ready: usize, failed: usize, slots: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 准备完成: 就绪 {} 个会话 / 目标场次 {} / 失败 {} 次", ready, slots, failed);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `clicked`: 成功点击提交的会话数
/// - `click_errors`: 点击失败数
/// - `close_errors`: 关闭浏览器失败数
/// - `log_file_path`: 动作日志路径
pub fn print_final_stats(clicked: usize, click_errors: usize, close_errors: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 本次运行统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已点击提交: {}", clicked);
    info!("❌ 点击失败: {}", click_errors);
    info!("🧹 关闭失败: {}", close_errors);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
