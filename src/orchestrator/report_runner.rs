//! 对账报告 - 编排层
//!
//! 日志 + 邮箱 → 对账 → 文字报告（可选 LLM 总结）→ 打印并写文件

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::load_booking_plan;
use crate::models::plan::parse_clock;
use crate::reconcile::{reconcile, render_report, BookingLogParser};
use crate::services::{GmailMailbox, JsonMailbox, LlmProvider, Mailbox, ReportWriter, Summarizer};
use crate::utils::logging::log_phase;

/// 供应商放号时刻（计划文件不可用时）
const DEFAULT_RELEASE_TIME: &str = "08:00:00";

/// report 命令的参数
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub date: NaiveDate,
    /// 设置后追加 LLM 总结
    pub provider: Option<LlmProvider>,
    pub api_key: Option<String>,
    pub log_file: PathBuf,
    /// 为空时写到 `summary_dir/booking_summary_YYYYMMDD.txt`
    pub output: Option<PathBuf>,
    /// 离线邮件导出文件，优先于 Gmail
    pub mail_export: Option<PathBuf>,
}

/// 生成对账报告，返回报告全文
pub async fn run_report(config: &Config, options: &ReportOptions) -> Result<String> {
    log_phase(&format!("📊 对账报告: {}", options.date));

    let log_data = BookingLogParser::new(&options.log_file)
        .parse(options.date)
        .await
        .with_context(|| format!("解析动作日志失败: {}", options.log_file.display()))?;

    let mailbox = select_mailbox(config, options);
    let decisions = match mailbox {
        Some(mailbox) => mailbox
            .fetch_decisions(options.date)
            .await
            .context("读取邮件失败")?,
        None => {
            warn!("⚠️ 没有可用的邮箱（未设置 GMAIL_ACCESS_TOKEN 或 --mail-export），所有账号将显示为未确认");
            Vec::new()
        }
    };

    let day = reconcile(&log_data, &decisions);
    let release_time = release_time(config).await;
    let mut report = render_report(&day, release_time);

    if let Some(provider) = options.provider {
        let summarizer = Summarizer::new(config, provider, options.api_key.clone());
        let narrative = summarizer.summarize(&day, &report).await;
        report.push_str("\n\n");
        report.push_str(&"=".repeat(80));
        report.push_str("\nAI SUMMARY\n");
        report.push_str(&"=".repeat(80));
        report.push('\n');
        report.push_str(&narrative);
        report.push('\n');
    }

    println!("{}", report);

    let writer = ReportWriter::new(&config.summary_dir);
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| writer.default_path(options.date));
    writer
        .write(&output, &report)
        .await
        .with_context(|| format!("写入报告失败: {}", output.display()))?;
    info!("✓ 报告已保存至: {}", output.display());

    Ok(report)
}

fn select_mailbox(config: &Config, options: &ReportOptions) -> Option<Box<dyn Mailbox>> {
    let export = options
        .mail_export
        .clone()
        .or_else(|| config.mail_export_file.as_ref().map(PathBuf::from));
    if let Some(path) = export {
        return Some(Box::new(JsonMailbox::new(path)));
    }
    GmailMailbox::from_config(config)
        .ok()
        .map(|gmail| Box::new(gmail) as Box<dyn Mailbox>)
}

/// 计划文件里的放号时刻；读不到计划时使用默认值
async fn release_time(config: &Config) -> NaiveTime {
    let from_plan = match load_booking_plan(Path::new(&config.plan_file)).await {
        Ok(plan) => plan.release_time().ok(),
        Err(e) => {
            info!("未读取预约计划 ({:#})，放号时刻按 {}", e, DEFAULT_RELEASE_TIME);
            None
        }
    };
    from_plan
        .or_else(|| parse_clock(DEFAULT_RELEASE_TIME).ok())
        .unwrap_or(NaiveTime::MIN)
}
