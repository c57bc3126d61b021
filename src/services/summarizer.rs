//! LLM 总结服务 - 业务能力层
//!
//! 把对账结果交给 LLM 写一段给人看的总结。
//!
//! ## 技术栈
//! - OpenAI: `async-openai` crate
//! - Anthropic: `reqwest` 直接调用 Messages API
//!
//! 没有 API key 或调用失败时返回本地生成的简要总结，不会让报告失败。

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::reconcile::{percent, AccountOutcome, ReconciledDay};

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 1000;
const ANTHROPIC_VERSION: &str = "2023-06-01";
const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that creates clear, concise summaries of tennis court booking results.";

/// LLM 提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LlmProvider {
    #[value(name = "openai")]
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    /// 未显式提供 key 时读取的环境变量
    pub fn key_env(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(default)]
    text: Option<String>,
}

/// LLM 总结服务
pub struct Summarizer {
    provider: LlmProvider,
    api_key: Option<String>,
    model_name: String,
    api_base_url: String,
}

impl Summarizer {
    /// 创建总结服务；`api_key` 为空时读取对应环境变量
    pub fn new(config: &Config, provider: LlmProvider, api_key: Option<String>) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var(provider.key_env()).ok())
            .filter(|k| !k.trim().is_empty());
        let (model_name, api_base_url) = match provider {
            LlmProvider::OpenAi => (
                config.openai_model_name.clone(),
                config.openai_api_base_url.clone(),
            ),
            LlmProvider::Anthropic => (
                config.anthropic_model_name.clone(),
                config.anthropic_api_base_url.clone(),
            ),
        };

        Self {
            provider,
            api_key,
            model_name,
            api_base_url,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// 生成总结
    ///
    /// # 参数
    /// - `day`: 对账结果
    /// - `report`: 已生成的文字报告，作为 LLM 的上下文
    ///
    /// # 返回
    /// LLM 的总结；没有 key 或调用失败时返回本地总结
    pub async fn summarize(&self, day: &ReconciledDay, report: &str) -> String {
        let Some(key) = self.api_key.as_deref() else {
            info!("未配置 {}，使用本地总结", self.provider.key_env());
            return fallback_summary(day);
        };

        let prompt = build_prompt(day, report);
        debug!("调用 LLM，模型: {}，提示词 {} 字符", self.model_name, prompt.len());

        let result = match self.provider {
            LlmProvider::OpenAi => self.send_openai(key, &prompt).await,
            LlmProvider::Anthropic => self.send_anthropic(key, &prompt).await,
        };

        match result {
            Ok(text) => {
                info!("✓ LLM 总结生成成功");
                text
            }
            Err(e) => {
                warn!("LLM 总结失败: {}，改用本地总结", e);
                fallback_summary(day)
            }
        }
    }

    async fn send_openai(&self, key: &str, prompt: &str) -> AppResult<String> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(key)
            .with_api_base(&self.api_base_url);
        let client = Client::with_config(openai_config);

        let llm_err = |message: String| AppError::Llm {
            model: self.model_name.clone(),
            message,
        };

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()
            .map_err(|e| llm_err(e.to_string()))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| llm_err(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build()
            .map_err(|e| llm_err(e.to_string()))?;

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| llm_err(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .ok_or_else(|| llm_err("LLM 返回内容为空".to_string()))
    }

    async fn send_anthropic(&self, key: &str, prompt: &str) -> AppResult<String> {
        let body = json!({
            "model": self.model_name,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = reqwest::Client::new()
            .post(format!("{}/messages", self.api_base_url))
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm {
                model: self.model_name.clone(),
                message: format!("HTTP {}: {}", status, text),
            });
        }

        let parsed: AnthropicResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| AppError::Llm {
                model: self.model_name.clone(),
                message: "LLM 返回内容为空".to_string(),
            })
    }
}

/// 构建提示词
pub fn build_prompt(day: &ReconciledDay, report: &str) -> String {
    let outcomes: Vec<_> = day
        .accounts
        .values()
        .map(|a| {
            json!({
                "account": a.alias,
                "attempts": a.attempts.len(),
                "outcome": a.outcome.label(),
                "approved": a.counts.approved,
                "rejected": a.counts.rejected,
                "canceled": a.counts.canceled,
                "pending": a.counts.pending,
            })
        })
        .collect();
    let outcomes_json = serde_json::to_string_pretty(&outcomes).unwrap_or_default();

    format!(
        r#"Please generate a comprehensive daily summary of tennis court booking results for {date}.

Reconciled report:
{report}

Per-account outcomes:
{outcomes}

Please create a summary that includes:
1. Overall success rate and key statistics
2. Performance by court (which courts were most/least successful)
3. Accounts that never received a confirmation or decision
4. Top performing accounts
5. Recommendations for the submit second, based on the timing analysis
6. Any concerning patterns or issues

Format the summary in a clear, easy-to-read manner with sections and bullet points where appropriate."#,
        date = day.date.format("%Y-%m-%d"),
        report = report,
        outcomes = outcomes_json,
    )
}

/// 不调用 LLM 的简要总结
pub fn fallback_summary(day: &ReconciledDay) -> String {
    let total = day.total_attempts();
    let approved: usize = day
        .accounts
        .values()
        .filter(|a| a.outcome == AccountOutcome::Approved)
        .map(|a| a.attempts.len())
        .sum();
    let failed: usize = day
        .accounts
        .values()
        .filter(|a| matches!(a.outcome, AccountOutcome::Rejected | AccountOutcome::Canceled))
        .map(|a| a.attempts.len())
        .sum();

    let mut summary = format!(
        "Tennis Court Booking Summary for {}\n{}\n\nOverall Statistics:\n- Total Attempts: {}\n- Successful: {}\n- Failed: {}\n- Success Rate: {:.1}%\n\nCourt Performance:\n",
        day.date.format("%Y-%m-%d"),
        "=".repeat(50),
        total,
        approved,
        failed,
        percent(approved, total)
    );

    for (court, stats) in &day.by_court {
        summary.push_str(&format!(
            "- Court {}: {} attempts, {} successes ({:.1}%)\n",
            court,
            stats.attempts,
            stats.successes,
            stats.rate()
        ));
    }

    summary.push_str(&format!(
        "\nSubmission confirmations: {} received\n",
        day.total_confirmations()
    ));
    if !day.unmatched_aliases.is_empty() {
        summary.push_str(&format!(
            "\nEmails without logged submissions: {}\n",
            day.unmatched_aliases.join(", ")
        ));
    }
    summary
}
