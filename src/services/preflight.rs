//! 网络预检
//!
//! 在启动任何浏览器之前确认预约站点可达

use std::time::Duration;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// 检查目标站点是否可达
///
/// 只要服务器有响应（任何状态码）就算可达；连接失败或超时则返回错误。
pub async fn check_network(url: &str, timeout: Duration) -> AppResult<()> {
    debug!("网络预检: {}", url);
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::NetworkUnavailable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("✓ 网络预检通过: {} ({})", url, response.status());
    Ok(())
}
