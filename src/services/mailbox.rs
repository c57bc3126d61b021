//! 邮箱服务 - 业务能力层
//!
//! 只读：按发件人和日期窗口取出供应商邮件，交给分类器判断结果。
//!
//! ## 实现
//! - `GmailMailbox`: Gmail REST API（需要现成的 access token）
//! - `JsonMailbox`: 导出的 JSON 文件，离线运行和测试用

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::EmailDecision;
use crate::reconcile::email_classifier::{decision_from_headers, parse_mail_date};

/// 单次查询最多取回的邮件数
const MAX_RESULTS: u32 = 100;

/// 邮箱抽象
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// 取回 `[date, date + 1)` 内收到的供应商邮件
    async fn fetch_decisions(&self, date: NaiveDate) -> AppResult<Vec<EmailDecision>>;
}

/// Gmail 搜索语句
pub fn gmail_query(sender: &str, date: NaiveDate) -> String {
    let next = date.succ_opt().unwrap_or(date);
    format!(
        "from:{} after:{} before:{}",
        sender,
        date.format("%Y/%m/%d"),
        next.format("%Y/%m/%d")
    )
}

// ========== Gmail ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    internal_date: Option<String>,
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

impl Message {
    fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// 收到时间：优先 internalDate（毫秒时间戳），其次 Date 头
    fn received(&self) -> Option<NaiveDateTime> {
        self.internal_date
            .as_deref()
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.with_timezone(&Local).naive_local())
            .or_else(|| self.header("Date").and_then(parse_mail_date))
    }
}

/// Gmail REST 邮箱
pub struct GmailMailbox {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    sender: String,
}

impl GmailMailbox {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
            sender: sender.into(),
        }
    }

    /// 从配置创建；没有 access token 时返回错误
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let token = config
            .gmail_access_token
            .clone()
            .ok_or_else(|| AppError::Mailbox("未设置 GMAIL_ACCESS_TOKEN".to_string()))?;
        Ok(Self::new(
            config.gmail_api_base_url.clone(),
            token,
            config.mail_sender.clone(),
        ))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Mailbox(format!("Gmail 返回 {}: {}", status, body)));
        }
        Ok(response.json::<T>().await?)
    }

    async fn list_message_ids(&self, query: &str) -> AppResult<Vec<String>> {
        let url = format!("{}/users/me/messages", self.base_url);
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query.to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let page: MessageList = self.get_json(&url, &params).await?;
            ids.extend(page.messages.into_iter().map(|m| m.id));

            match page.next_page_token {
                Some(token) if ids.len() < MAX_RESULTS as usize => page_token = Some(token),
                _ => break,
            }
        }
        Ok(ids)
    }

    async fn get_message(&self, id: &str) -> AppResult<Message> {
        let url = format!("{}/users/me/messages/{}", self.base_url, id);
        let params = [
            ("format", "metadata".to_string()),
            ("metadataHeaders", "Subject".to_string()),
            ("metadataHeaders", "To".to_string()),
            ("metadataHeaders", "Date".to_string()),
        ];
        self.get_json(&url, &params).await
    }
}

#[async_trait]
impl Mailbox for GmailMailbox {
    async fn fetch_decisions(&self, date: NaiveDate) -> AppResult<Vec<EmailDecision>> {
        let query = gmail_query(&self.sender, date);
        info!("📬 查询邮件: {}", query);

        let ids = self.list_message_ids(&query).await?;
        debug!("找到 {} 封邮件", ids.len());

        let mut decisions = Vec::with_capacity(ids.len());
        for id in ids {
            let message = self.get_message(&id).await?;
            let to = message.header("To").unwrap_or_default();
            let subject = message.header("Subject").unwrap_or_default();

            match decision_from_headers(to, subject, message.received()) {
                Some(decision) => decisions.push(decision),
                None => warn!("邮件 {} 无法识别收件人: {:?}", id, to),
            }
        }

        info!("✓ 共解析 {} 封结果邮件", decisions.len());
        Ok(decisions)
    }
}

// ========== JSON 导出文件 ==========

/// 导出文件中的一封邮件
#[derive(Debug, Clone, Deserialize)]
pub struct ExportedMail {
    pub to: String,
    pub subject: String,
    /// RFC 2822 或 `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub date: Option<String>,
}

/// 从 JSON 导出文件读取的邮箱
pub struct JsonMailbox {
    path: PathBuf,
}

impl JsonMailbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// 把导出的邮件按日期过滤后分类；没有日期的邮件保留
pub fn decisions_from_export(mails: &[ExportedMail], date: NaiveDate) -> Vec<EmailDecision> {
    mails
        .iter()
        .filter_map(|mail| {
            let received = mail.date.as_deref().and_then(parse_mail_date);
            if received.is_some_and(|r| r.date() != date) {
                return None;
            }
            decision_from_headers(&mail.to, &mail.subject, received)
        })
        .collect()
}

#[async_trait]
impl Mailbox for JsonMailbox {
    async fn fetch_decisions(&self, date: NaiveDate) -> AppResult<Vec<EmailDecision>> {
        info!("📬 读取邮件导出文件: {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mails: Vec<ExportedMail> = serde_json::from_str(&content)?;
        let decisions = decisions_from_export(&mails, date);
        info!("✓ {} 封邮件中 {} 封属于 {}", mails.len(), decisions.len(), date);
        Ok(decisions)
    }
}
