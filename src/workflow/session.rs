//! 已准备好的会话
//!
//! 表单已填完、停在最终提交按钮前的浏览器会话。

use tracing::debug;

use crate::browser::BrowserSession;
use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::services::PermitForm;
use crate::workflow::booking_ctx::BookingCtx;

/// 等待提交的会话
///
/// 持有浏览器进程；只能通过 `close` 释放。
pub struct PreparedSession {
    ctx: BookingCtx,
    driver: PageDriver,
    browser: BrowserSession,
}

impl PreparedSession {
    pub(crate) fn new(ctx: BookingCtx, driver: PageDriver, browser: BrowserSession) -> Self {
        Self {
            ctx,
            driver,
            browser,
        }
    }

    pub fn ctx(&self) -> &BookingCtx {
        &self.ctx
    }

    /// 给心跳任务用的页面句柄（与会话共享同一个页面）
    pub fn probe(&self) -> SessionProbe {
        SessionProbe {
            label: self.ctx.to_string(),
            driver: self.driver.clone(),
        }
    }

    /// 点击最终提交按钮，不检查结果
    pub async fn submit(&self) -> AppResult<()> {
        PermitForm::click_final_submit(&self.driver).await
    }

    /// 心跳：读取页面标题，防止会话空闲超时
    pub async fn touch(&self) -> AppResult<Option<String>> {
        self.probe().touch().await
    }

    /// 关闭浏览器
    pub async fn close(self) -> AppResult<()> {
        debug!("{} 关闭会话", self.ctx);
        self.browser.close().await
    }
}

/// 心跳任务持有的轻量句柄
#[derive(Clone)]
pub struct SessionProbe {
    pub label: String,
    driver: PageDriver,
}

impl SessionProbe {
    pub async fn touch(&self) -> AppResult<Option<String>> {
        let title = self.driver.title().await?;
        debug!("{} 💓 {}", self.label, title.as_deref().unwrap_or("(无标题)"));
        Ok(title)
    }
}
