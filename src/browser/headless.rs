use std::path::{Path, PathBuf};

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 一个独立的浏览器进程
///
/// 每个会话都有自己的用户数据目录，互不干扰；关闭时一并删除。
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    index: usize,
    profile_dir: PathBuf,
}

impl BrowserSession {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// 关闭浏览器，等待进程退出，再删除用户数据目录
    pub async fn close(mut self) -> AppResult<()> {
        debug!("关闭浏览器会话 #{}", self.index);
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器会话 #{} 退出失败: {}", self.index, e);
        }
        self.handler.abort();
        remove_profile_dir(&self.profile_dir).await;
        closed?;
        Ok(())
    }
}

/// 启动一个会话用的浏览器，并打开空白页
///
/// # 参数
/// - `config`: 配置（可执行文件、是否无头）
/// - `session_index`: 会话编号（用于日志和独立的用户数据目录）
pub async fn launch_session_browser(
    config: &Config,
    session_index: usize,
) -> AppResult<(BrowserSession, Page)> {
    info!("🚀 启动浏览器会话 #{}...", session_index);

    let profile_dir = session_profile_dir(session_index);
    let mut builder = BrowserConfig::builder()
        .user_data_dir(&profile_dir)
        .args(vec![
            "--no-sandbox",             // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage",  // 防止共享内存不足
            "--disable-background-timer-throttling",
            "--disable-renderer-backgrounding",
        ]);

    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    if let Some(executable) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(executable));
    }

    let launched = match builder.build() {
        Ok(browser_config) => Browser::launch(browser_config)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e),
    };
    let (browser, mut handler) = match launched {
        Ok(launched) => launched,
        Err(e) => {
            error!("启动浏览器失败: {}", e);
            remove_profile_dir(&profile_dir).await;
            return Err(AppError::BrowserLaunch {
                session: session_index,
                message: e,
            });
        }
    };
    debug!("浏览器会话 #{} 启动成功", session_index);

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let session = BrowserSession {
        browser,
        handler: handler_task,
        index: session_index,
        profile_dir,
    };

    let page = match session.browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("创建页面失败: {}", e);
            // 不留下孤儿进程
            let _ = session.close().await;
            return Err(e.into());
        }
    };

    Ok((session, page))
}

/// 会话的用户数据目录（按进程号 + 会话号区分）
pub fn session_profile_dir(session_index: usize) -> PathBuf {
    std::env::temp_dir().join(format!(
        "court-permit-booker-{}-{}",
        std::process::id(),
        session_index
    ))
}

/// 删除会话的用户数据目录；目录不存在不算错误
pub async fn remove_profile_dir(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!("已删除用户数据目录: {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("删除用户数据目录失败 {}: {}", dir.display(), e),
    }
}
