use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use court_permit_booker::services::LlmProvider;
use court_permit_booker::utils::logging;
use court_permit_booker::{run_report, App, Config, ReportOptions};

/// 网球场地申请定时提交与结果对账
#[derive(Parser, Debug)]
#[command(name = "court-permit-booker", version, about)]
struct Cli {
    /// 预约计划 TOML 文件（覆盖 PLAN_FILE）
    #[arg(long, global = true)]
    plan: Option<String>,

    /// 无头模式运行浏览器
    #[arg(long, global = true)]
    headless: bool,

    /// 控制台显示 debug 日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 准备会话，到点自动提交
    Book,
    /// 准备会话后等待手动提交，按回车关闭
    Prepare,
    /// 用动作日志和邮件生成对账报告
    Report {
        /// 要分析的日期 YYYY-MM-DD（默认今天）
        #[arg(long)]
        date: Option<NaiveDate>,

        /// 追加 LLM 总结
        #[arg(long, value_enum)]
        provider: Option<LlmProvider>,

        /// LLM API key（默认读取 OPENAI_API_KEY / ANTHROPIC_API_KEY）
        #[arg(long)]
        api_key: Option<String>,

        /// 动作日志文件（默认 ACTION_LOG_FILE）
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// 报告输出路径
        #[arg(long)]
        output: Option<PathBuf>,

        /// 离线邮件导出 JSON
        #[arg(long)]
        mail_export: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let mut config = Config::from_env();
    if let Some(plan) = cli.plan {
        config.plan_file = plan;
    }
    if cli.headless {
        config.headless = true;
    }
    let verbose = cli.verbose || config.verbose_logging;

    match cli.command {
        Command::Book => {
            logging::init(&config.action_log_file, verbose)?;
            App::initialize(config).await?.run_book().await?;
        }
        Command::Prepare => {
            logging::init(&config.action_log_file, verbose)?;
            App::initialize(config).await?.run_manual().await?;
        }
        Command::Report {
            date,
            provider,
            api_key,
            log_file,
            output,
            mail_export,
        } => {
            logging::init_console(verbose)?;
            let options = ReportOptions {
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                provider,
                api_key,
                log_file: log_file.unwrap_or_else(|| PathBuf::from(&config.action_log_file)),
                output,
                mail_export,
            };
            run_report(&config, &options)
                .await
                .context("生成对账报告失败")?;
        }
    }

    Ok(())
}
