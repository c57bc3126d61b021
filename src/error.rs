use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    // ========== 浏览器相关 ==========
    /// 启动浏览器失败
    #[error("启动浏览器失败 (会话 #{session}): {message}")]
    BrowserLaunch { session: usize, message: String },

    /// CDP 调用失败（导航、执行脚本等）
    #[error("浏览器操作失败: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// 等待元素超时
    #[error("等待元素超时 ({timeout_ms}ms): {locator}")]
    ElementTimeout { locator: String, timeout_ms: u64 },

    /// 页面状态不符合预期
    #[error("页面状态异常: {0}")]
    UnexpectedPage(String),

    /// 场地不可用或元素 ID 已变更
    #[error("场地 {court} 不可用: {reason}")]
    CourtUnavailable { court: u8, reason: String },

    /// 登录失败
    #[error("登录失败 ({email}): {reason}")]
    LoginFailed { email: String, reason: String },

    // ========== 配置相关 ==========
    /// 预约计划校验失败
    #[error("预约计划无效: {0}")]
    InvalidPlan(String),

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    // ========== 网络 / 外部服务 ==========
    /// 网络预检失败
    #[error("网络不可用 ({url}): {reason}")]
    NetworkUnavailable { url: String, reason: String },

    /// 邮箱读取失败
    #[error("邮箱读取失败: {0}")]
    Mailbox(String),

    /// LLM 调用失败
    #[error("LLM错误 (模型: {model}): {message}")]
    Llm { model: String, message: String },

    /// HTTP 请求失败
    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),

    // ========== 其他 ==========
    /// 正则表达式无效
    #[error("正则表达式错误: {0}")]
    Regex(#[from] regex::Error),

    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 文件读写失败
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 创建元素超时错误
    pub fn element_timeout(locator: impl ToString, timeout_ms: u64) -> Self {
        AppError::ElementTimeout {
            locator: locator.to_string(),
            timeout_ms,
        }
    }

    /// 创建预约计划错误
    pub fn invalid_plan(message: impl Into<String>) -> Self {
        AppError::InvalidPlan(message.into())
    }

    /// 是否属于"场地不可用"类的预期失败（只记 warn，不算异常）
    pub fn is_expected_unavailable(&self) -> bool {
        matches!(self, AppError::CourtUnavailable { .. })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
