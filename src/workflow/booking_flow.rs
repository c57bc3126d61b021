//! 预约准备流程 - 流程层
//!
//! 核心职责：定义"准备一个会话"的完整流程
//!
//! 流程顺序：
//! 1. 启动独立浏览器
//! 2. 登录
//! 3. 新建申请 → 选场地 → 日期时间 → 问题页
//! 4. 滚动到提交按钮，停下等待
//!
//! 任何一步失败都会关闭浏览器再返回错误。

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::browser::launch_session_browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::models::{Account, BookingPlan};
use crate::services::{LoginService, PermitForm};
use crate::workflow::booking_ctx::BookingCtx;
use crate::workflow::session::PreparedSession;

/// 预约准备流程
///
/// - 编排登录和填表的顺序
/// - 不决定用哪个账号订哪个场次
/// - 不关心提交时机
pub struct BookingFlow {
    config: Config,
    login_service: LoginService,
    permit_form: PermitForm,
}

impl BookingFlow {
    pub fn new(config: &Config, plan: &BookingPlan) -> Self {
        Self {
            config: config.clone(),
            login_service: LoginService::new(config.login_url.clone()),
            permit_form: PermitForm::new(plan.courts.clone()),
        }
    }

    /// 准备一个会话，停在最终提交按钮前
    ///
    /// # 返回
    /// 成功返回持有浏览器的 `PreparedSession`；失败时浏览器已关闭
    pub async fn prepare(&self, account: &Account, ctx: BookingCtx) -> Result<PreparedSession> {
        info!("{} 🔧 开始准备会话", ctx);

        let (browser, page) = launch_session_browser(&self.config, ctx.session_index)
            .await
            .with_context(|| format!("{} 启动浏览器失败", ctx))?;
        let driver = PageDriver::new(page, self.config.element_timeout);

        match self.fill(&driver, account, &ctx).await {
            Ok(()) => {
                info!("{} ✓ 会话已就绪，等待提交", ctx);
                Ok(PreparedSession::new(ctx, driver, browser))
            }
            Err(e) => {
                if e.is_expected_unavailable() {
                    warn!("{} ⚠️ {}", ctx, e);
                }
                if let Err(close_err) = browser.close().await {
                    warn!("{} 关闭失败会话时出错: {}", ctx, close_err);
                }
                Err(anyhow::Error::new(e).context(format!("{} 准备会话失败", ctx)))
            }
        }
    }

    async fn fill(&self, driver: &PageDriver, account: &Account, ctx: &BookingCtx) -> AppResult<()> {
        self.login_service.login(driver, account).await?;

        let form = &self.permit_form;
        form.start_new_permit(driver).await?;
        form.select_court(driver, &ctx.slot).await?;
        form.set_date_and_time(driver, ctx.date, &ctx.slot).await?;
        form.continue_to_questions(driver).await?;
        form.fill_permit_questions(driver).await?;
        form.scroll_to_submit(driver).await
    }
}
