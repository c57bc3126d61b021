//! 申请表服务 - 业务能力层
//!
//! 按固定顺序填写场地申请表，停在最终提交按钮之前。
//! 不关心账号轮换，也不关心提交时机。

use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::{Locator, PageDriver};
use crate::models::log_markers::BOOKING_DATE_FORMAT;
use crate::models::{CourtInfo, CourtSlot};
use crate::services::selectors;

/// 点击 "New Permit" 的尝试次数
const NEW_PERMIT_ATTEMPTS: usize = 3;

pub struct PermitForm {
    courts: Vec<CourtInfo>,
    overlay_timeout: Duration,
}

impl PermitForm {
    pub fn new(courts: Vec<CourtInfo>) -> Self {
        Self {
            courts,
            overlay_timeout: Duration::from_secs(10),
        }
    }

    /// 打开新的申请表并填写活动名称
    pub async fn start_new_permit(&self, driver: &PageDriver) -> AppResult<()> {
        debug!("打开新的申请表");
        let overlay = Locator::css(selectors::BLOCK_OVERLAY_CSS);
        let new_permit = Locator::xpath(selectors::NEW_PERMIT_XPATH);

        for attempt in 1..=NEW_PERMIT_ATTEMPTS {
            if !driver.wait_gone(&overlay, self.overlay_timeout).await? {
                debug!("第 {}/{} 次: 遮罩层 10 秒内未消失", attempt, NEW_PERMIT_ATTEMPTS);
            }

            match driver.click(&new_permit).await {
                Ok(()) => {
                    debug!("已点击 New Permit 按钮");
                    break;
                }
                Err(e) if attempt < NEW_PERMIT_ATTEMPTS => {
                    warn!(
                        "第 {}/{} 次点击 New Permit 失败: {}，稍后重试...",
                        attempt, NEW_PERMIT_ATTEMPTS, e
                    );
                    sleep(Duration::from_secs(2)).await;
                }
                Err(e) => return Err(e),
            }
        }

        driver
            .type_text(&Locator::id(selectors::ACTIVITY_ID), selectors::ACTIVITY_TEXT)
            .await
    }

    /// 选择场地：站点下拉框 → Add Facility → 勾选设施复选框
    pub async fn select_court(&self, driver: &PageDriver, slot: &CourtSlot) -> AppResult<()> {
        debug!("选择场地 {}", slot.court);
        let court = self
            .courts
            .iter()
            .find(|c| c.number == slot.court)
            .ok_or_else(|| AppError::CourtUnavailable {
                court: slot.court,
                reason: "预约计划中没有这个场地".to_string(),
            })?;

        driver
            .select_by_text(&Locator::id(selectors::SITE_SELECT_ID), &court.site_name)
            .await?;
        // 等设施列表刷新
        sleep(Duration::from_secs(1)).await;

        debug!("点击 Add Facility");
        driver.click(&Locator::id(selectors::ADD_FACILITY_ID)).await?;

        driver
            .ensure_checked(&Locator::id(&court.facility_id))
            .await
            .map_err(|e| match e {
                AppError::ElementTimeout { .. } => AppError::CourtUnavailable {
                    court: slot.court,
                    reason: "设施复选框不存在或元素 ID 已变更".to_string(),
                },
                other => other,
            })
    }

    /// 填写日期和开始/结束小时
    pub async fn set_date_and_time(
        &self,
        driver: &PageDriver,
        date: NaiveDate,
        slot: &CourtSlot,
    ) -> AppResult<()> {
        let formatted_date = date.format(BOOKING_DATE_FORMAT).to_string();
        debug!("填写日期 {}", formatted_date);
        driver
            .type_text(&Locator::id(selectors::EVENT_DATE_ID), &formatted_date)
            .await?;
        driver.click_body().await?;
        sleep(Duration::from_millis(500)).await;

        let (start_hour, end_hour) = slot
            .start_hour()
            .zip(slot.end_hour())
            .ok_or_else(|| AppError::invalid_plan(format!("无法解析场次时间: {}", slot.time)))?;
        info!("设置时间 {}:00-{}:00", start_hour, end_hour);

        driver
            .select_by_value(&Locator::name(selectors::START_HOUR_NAME), &start_hour.to_string())
            .await?;
        driver
            .select_by_value(&Locator::name(selectors::END_HOUR_NAME), &end_hour.to_string())
            .await?;
        sleep(Duration::from_millis(200)).await;
        Ok(())
    }

    /// 点击 Continue 进入问题页
    pub async fn continue_to_questions(&self, driver: &PageDriver) -> AppResult<()> {
        driver
            .click(&Locator::css(selectors::CONTINUE_BUTTON_CSS))
            .await?;
        sleep(Duration::from_secs(2)).await;
        Ok(())
    }

    /// 填写问题页的固定答案并勾选条款
    pub async fn fill_permit_questions(&self, driver: &PageDriver) -> AppResult<()> {
        debug!("填写申请问题");
        for (id, answer) in selectors::PERMIT_TEXT_ANSWERS {
            driver.type_text(&Locator::id(*id), answer).await?;
        }
        for (id, answer) in selectors::PERMIT_DROPDOWN_ANSWERS {
            driver.select_by_text(&Locator::id(*id), answer).await?;
        }
        driver
            .ensure_checked(&Locator::id(selectors::ACCEPT_TERMS_ID))
            .await?;
        sleep(Duration::from_millis(200)).await;
        debug!("申请问题填写完成");
        Ok(())
    }

    /// 滚动到底部，确认提交按钮已可点击
    pub async fn scroll_to_submit(&self, driver: &PageDriver) -> AppResult<()> {
        driver.scroll_to_bottom().await?;
        sleep(Duration::from_millis(200)).await;
        driver
            .wait_clickable(&Locator::xpath(selectors::FINAL_SUBMIT_XPATH))
            .await
    }

    /// 点击最终提交按钮（不等待、不检查结果）
    pub async fn click_final_submit(driver: &PageDriver) -> AppResult<()> {
        driver
            .js_click(&Locator::xpath(selectors::FINAL_SUBMIT_XPATH))
            .await
    }
}
