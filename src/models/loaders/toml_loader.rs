use crate::error::AppError;
use crate::models::plan::BookingPlan;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载预约计划并校验
pub async fn load_booking_plan(plan_file_path: &Path) -> Result<BookingPlan> {
    let content = fs::read_to_string(plan_file_path)
        .await
        .with_context(|| format!("无法读取预约计划: {}", plan_file_path.display()))?;

    let plan = parse_booking_plan(&content, &plan_file_path.display().to_string())?;

    tracing::info!(
        "成功加载预约计划: {} 个账号, {} 个场次优先级, {} 条星期规则",
        plan.accounts.len(),
        plan.priorities.len(),
        plan.booking_rules.len()
    );

    Ok(plan)
}

/// 解析 TOML 文本为预约计划
///
/// # 参数
/// - `content`: TOML 文本
/// - `origin`: 来源（用于错误信息）
pub fn parse_booking_plan(content: &str, origin: &str) -> Result<BookingPlan, AppError> {
    let plan: BookingPlan = toml::from_str(content).map_err(|source| AppError::TomlParse {
        path: origin.to_string(),
        source,
    })?;

    plan.validate()?;
    Ok(plan)
}
