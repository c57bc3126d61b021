//! 登录服务 - 业务能力层
//!
//! 只负责"登录一个账号"能力

use std::time::Duration;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::infrastructure::{Locator, PageDriver};
use crate::models::Account;
use crate::services::selectors;

/// 登录后等待控制台出现的时间
const DASHBOARD_TIMEOUT: Duration = Duration::from_secs(10);

pub struct LoginService {
    login_url: String,
}

impl LoginService {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }

    /// 登录账号，直到看到 "New Permit" 按钮为止
    pub async fn login(&self, driver: &PageDriver, account: &Account) -> AppResult<()> {
        debug!("[{}] 打开登录页", account.email);
        driver.goto(&self.login_url).await?;

        debug!("[{}] 填写登录信息", account.email);
        driver
            .type_text(&Locator::id(selectors::LOGIN_EMAIL_ID), &account.email)
            .await?;
        driver
            .type_text(&Locator::id(selectors::LOGIN_PASSWORD_ID), &account.password)
            .await?;

        debug!("[{}] 点击登录按钮", account.email);
        driver
            .click(&Locator::xpath(selectors::LOGIN_BUTTON_XPATH))
            .await?;

        driver
            .wait_present(&Locator::xpath(selectors::NEW_PERMIT_XPATH), DASHBOARD_TIMEOUT)
            .await
            .map_err(|_| AppError::LoginFailed {
                email: account.email.clone(),
                reason: "点击登录后没有进入控制台".to_string(),
            })?;

        info!("✓ 登录成功: {}", account.email);
        Ok(())
    }
}
