//! 报告写入服务 - 业务能力层
//!
//! 只负责"把报告写成文件"能力，不关心报告内容

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::AppResult;

/// 报告写入服务
pub struct ReportWriter {
    summary_dir: PathBuf,
}

impl ReportWriter {
    /// 写到指定目录
    pub fn new(summary_dir: impl Into<PathBuf>) -> Self {
        Self {
            summary_dir: summary_dir.into(),
        }
    }

    /// 默认文件路径：`<目录>/booking_summary_YYYYMMDD.txt`
    pub fn default_path(&self, date: NaiveDate) -> PathBuf {
        self.summary_dir
            .join(format!("booking_summary_{}.txt", date.format("%Y%m%d")))
    }

    /// 写入报告，父目录不存在时自动创建
    ///
    /// # 参数
    /// - `path`: 目标文件
    /// - `content`: 报告全文
    pub async fn write(&self, path: &Path, content: &str) -> AppResult<()> {
        debug!("写入报告: {} ({} 字节)", path.display(), content.len());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new("summaries")
    }
}
