//! 定时提交调度器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个预约流程的入口，负责会话资源和提交时机。
//!
//! ## 核心流程
//!
//! 1. **网络预检**：站点不可达时直接退出，不启动任何浏览器
//! 2. **逐个准备**：按优先级一个目标一个目标地准备，失败换号重试
//! 3. **心跳保持**：等待期间定期读取每个会话的页面
//! 4. **定时提交**：到点后依次点击提交，每几次暂停一下
//! 5. **延迟清理**：等待片刻后关闭所有浏览器
//!
//! 无论哪条路径退出，所有启动过的浏览器都会被关闭。

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::log_markers::SCRIPT_STARTED;
use crate::models::{load_booking_plan, BookingPlan};
use crate::orchestrator::assignment::{booking_targets, fill_targets, AccountPool, SlotOutcome};
use crate::orchestrator::heartbeat::Heartbeat;
use crate::orchestrator::timing::{
    booking_dates, local_now, next_submit_time, should_pause, wait_until,
};
use crate::services::check_network;
use crate::utils::logging::{
    log_phase, log_preparation_complete, log_startup, log_submission_phase, log_submit_click,
    print_final_stats,
};
use crate::workflow::{BookingCtx, BookingFlow, PreparedSession};

/// 网络预检超时
const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(10);

/// 提交前多少秒停掉心跳，避免心跳和提交抢同一个页面
const HEARTBEAT_GUARD_SECS: i64 = 3;

/// 应用主结构
pub struct App {
    config: Config,
    plan: BookingPlan,
    flow: BookingFlow,
}

impl App {
    /// 初始化应用：加载并校验预约计划
    pub async fn initialize(config: Config) -> Result<Self> {
        let plan = load_booking_plan(Path::new(&config.plan_file))
            .await
            .with_context(|| format!("加载预约计划失败: {}", config.plan_file))?;
        Ok(Self::with_plan(config, plan))
    }

    pub fn with_plan(config: Config, plan: BookingPlan) -> Self {
        let flow = BookingFlow::new(&config, &plan);
        Self { config, plan, flow }
    }

    /// 定时自动提交
    pub async fn run_book(&self) -> Result<()> {
        info!("{}", SCRIPT_STARTED);
        log_startup(
            "定时自动提交",
            self.plan.accounts.len(),
            self.plan.priorities.len(),
        );

        let submit_time = self.plan.submit_time()?;
        let target = next_submit_time(local_now(), submit_time);
        info!("🎯 提交时刻: {}", target.format("%Y-%m-%d %H:%M:%S"));

        let dates = booking_dates(target.date(), &self.plan);
        if dates.is_empty() {
            warn!("⚠️ {} 没有预约规则，程序结束", target.date().format("%A"));
            return Ok(());
        }

        check_network(&self.config.preflight_url, PREFLIGHT_TIMEOUT)
            .await
            .context("网络预检失败，未启动任何浏览器")?;

        let sessions = self.prepare_sessions(&dates).await?;
        if sessions.is_empty() {
            warn!("⚠️ 没有任何会话准备成功，程序结束");
            return Ok(());
        }

        let heartbeat = Heartbeat::start(
            sessions.iter().map(|s| s.probe()).collect(),
            self.config.heartbeat_interval,
        );

        let interrupted = tokio::select! {
            _ = wait_until(target - chrono::Duration::seconds(HEARTBEAT_GUARD_SECS)) => false,
            _ = tokio::signal::ctrl_c() => true,
        };
        heartbeat.stop().await;

        if interrupted {
            warn!("⚠️ 收到中断信号，放弃提交");
            let close_errors = close_all(sessions).await;
            print_final_stats(0, 0, close_errors, &self.config.action_log_file);
            return Ok(());
        }

        wait_until(target).await;
        log_submission_phase();
        let (clicked, click_errors) = self.fire(&sessions).await;

        info!("⏱  {} 秒后关闭浏览器", self.config.close_delay.as_secs());
        sleep(self.config.close_delay).await;
        let close_errors = close_all(sessions).await;

        print_final_stats(clicked, click_errors, close_errors, &self.config.action_log_file);
        Ok(())
    }

    /// 手动模式：准备好会话后等待操作员按回车，然后全部关闭
    pub async fn run_manual(&self) -> Result<()> {
        info!("{}", SCRIPT_STARTED);
        log_startup(
            "手动准备",
            self.plan.accounts.len(),
            self.plan.priorities.len(),
        );

        let today = local_now().date();
        let dates = booking_dates(today, &self.plan);
        if dates.is_empty() {
            warn!("⚠️ {} 没有预约规则，程序结束", today.format("%A"));
            return Ok(());
        }

        check_network(&self.config.preflight_url, PREFLIGHT_TIMEOUT)
            .await
            .context("网络预检失败，未启动任何浏览器")?;

        let sessions = self.prepare_sessions(&dates).await?;
        if sessions.is_empty() {
            warn!("⚠️ 没有任何会话准备成功，程序结束");
            return Ok(());
        }

        let heartbeat = Heartbeat::start(
            sessions.iter().map(|s| s.probe()).collect(),
            self.config.heartbeat_interval,
        );

        log_phase("🖐  所有会话已就绪，请在浏览器中手动提交，完成后按回车关闭");
        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        tokio::select! {
            read = stdin.read_line(&mut line) => {
                if let Err(e) = read {
                    warn!("读取输入失败: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => warn!("⚠️ 收到中断信号"),
        }

        heartbeat.stop().await;
        let close_errors = close_all(sessions).await;
        print_final_stats(0, 0, close_errors, &self.config.action_log_file);
        Ok(())
    }

    /// 按优先级逐个准备所有目标，按目标顺序返回就绪的会话
    async fn prepare_sessions(&self, dates: &[NaiveDate]) -> Result<Vec<PreparedSession>> {
        let targets = booking_targets(&self.plan, dates);
        log_phase(&format!(
            "🔧 准备阶段: {} 个日期，{} 个目标场次",
            dates.len(),
            targets.len()
        ));

        let pool = Mutex::new(AccountPool::shuffled(self.plan.accounts.clone()));
        let mut index = 0;

        let outcomes = fill_targets(&pool, &targets, self.config.max_slot_retries, |account, target| {
            index += 1;
            let ctx = BookingCtx::new(index, &account, target.slot.clone(), target.date);
            let flow = &self.flow;
            async move { flow.prepare(&account, ctx).await }
        })
        .await;
        // 每个账号只用一次：用过的号数减去成功数就是失败次数
        let ready = outcomes
            .iter()
            .filter(|o| matches!(o, SlotOutcome::Prepared(_)))
            .count();
        let failures = index - ready;

        let mut sessions = Vec::new();
        for (idx, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                SlotOutcome::Prepared(session) => sessions.push(session),
                SlotOutcome::Exhausted { tries } => {
                    warn!("目标 #{} 用了 {} 个账号仍未准备成功", idx + 1, tries)
                }
                SlotOutcome::NoAccount => info!("目标 #{} 没有可用账号", idx + 1),
            }
        }

        log_preparation_complete(sessions.len(), failures, targets.len());
        Ok(sessions)
    }

    /// 依次点击提交，返回 (成功, 失败) 次数
    async fn fire(&self, sessions: &[PreparedSession]) -> (usize, usize) {
        let total = sessions.len();
        let mut clicked = 0;
        let mut errors = 0;

        for (i, session) in sessions.iter().enumerate() {
            let ctx = session.ctx();
            log_submit_click(i + 1, total, &ctx.slot, ctx.date, &ctx.email);

            match session.submit().await {
                Ok(()) => clicked += 1,
                Err(e) => {
                    errors += 1;
                    error!("{} ❌ 点击提交失败: {}", ctx, e);
                }
            }

            if should_pause(i, total, self.config.stagger_every) {
                sleep(self.config.stagger_pause).await;
            }
        }
        (clicked, errors)
    }
}

/// 关闭所有会话，返回关闭失败的数量
async fn close_all(sessions: Vec<PreparedSession>) -> usize {
    info!("🧹 关闭 {} 个浏览器会话...", sessions.len());
    let results = futures::future::join_all(sessions.into_iter().map(|s| async move {
        let label = s.ctx().to_string();
        s.close().await.map_err(|e| (label, e))
    }))
    .await;

    let mut errors = 0;
    for result in results {
        if let Err((label, e)) = result {
            errors += 1;
            warn!("{} 关闭浏览器失败: {}", label, e);
        }
    }
    errors
}
