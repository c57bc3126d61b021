use std::time::Duration;

/// 程序配置
///
/// 运行参数（浏览器、超时、节奏、日志、邮箱、LLM）。
/// 账号和场地优先级属于预约计划，见 `models::plan`。
#[derive(Clone, Debug)]
pub struct Config {
    /// 预约计划 TOML 文件
    pub plan_file: String,
    /// 登录页面 URL
    pub login_url: String,
    /// 网络预检 URL
    pub preflight_url: String,
    /// 浏览器可执行文件（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<String>,
    /// 是否无头模式
    pub headless: bool,
    /// 等待元素的超时时间
    pub element_timeout: Duration,
    /// 心跳间隔
    pub heartbeat_interval: Duration,
    /// 每提交多少个后暂停一次（0 表示不暂停）
    pub stagger_every: usize,
    /// 暂停时长
    pub stagger_pause: Duration,
    /// 全部提交后等待多久再关闭浏览器
    pub close_delay: Duration,
    /// 同一场次因失败而换号重试的最大次数
    pub max_slot_retries: usize,
    /// 预约动作日志（对账时解析的文件）
    pub action_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 邮箱配置 ---
    pub mail_sender: String,
    pub gmail_api_base_url: String,
    pub gmail_access_token: Option<String>,
    /// 离线邮件导出文件（设置后优先使用）
    pub mail_export_file: Option<String>,
    // --- LLM 配置 ---
    pub openai_api_base_url: String,
    pub openai_model_name: String,
    pub anthropic_api_base_url: String,
    pub anthropic_model_name: String,
    /// 汇总文件目录
    pub summary_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plan_file: "booking_plan.toml".to_string(),
            login_url: "https://rioc.civicpermits.com/".to_string(),
            preflight_url: "https://rioc.civicpermits.com/".to_string(),
            chrome_executable: None,
            headless: false,
            element_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(30),
            stagger_every: 3,
            stagger_pause: Duration::from_secs(1),
            close_delay: Duration::from_secs(5),
            max_slot_retries: 2,
            action_log_file: "auto_booker_action.log".to_string(),
            verbose_logging: false,
            mail_sender: "donotreply@notify.civicpermits.com".to_string(),
            gmail_api_base_url: "https://gmail.googleapis.com/gmail/v1".to_string(),
            gmail_access_token: None,
            mail_export_file: None,
            openai_api_base_url: "https://api.openai.com/v1".to_string(),
            openai_model_name: "gpt-4-turbo-preview".to_string(),
            anthropic_api_base_url: "https://api.anthropic.com/v1".to_string(),
            anthropic_model_name: "claude-3-sonnet-20240229".to_string(),
            summary_dir: "summaries".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            plan_file: env_or("PLAN_FILE", default.plan_file),
            login_url: env_or("LOGIN_URL", default.login_url),
            preflight_url: env_or("PREFLIGHT_URL", default.preflight_url),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(default.chrome_executable),
            headless: env_parse("HEADLESS", default.headless),
            element_timeout: env_secs("ELEMENT_TIMEOUT_SECS", default.element_timeout),
            heartbeat_interval: env_secs("HEARTBEAT_INTERVAL_SECS", default.heartbeat_interval),
            stagger_every: env_parse("STAGGER_EVERY", default.stagger_every),
            stagger_pause: env_millis("STAGGER_PAUSE_MS", default.stagger_pause),
            close_delay: env_secs("CLOSE_DELAY_SECS", default.close_delay),
            max_slot_retries: env_parse("MAX_SLOT_RETRIES", default.max_slot_retries),
            action_log_file: env_or("ACTION_LOG_FILE", default.action_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging),
            mail_sender: env_or("MAIL_SENDER", default.mail_sender),
            gmail_api_base_url: env_or("GMAIL_API_BASE_URL", default.gmail_api_base_url),
            gmail_access_token: std::env::var("GMAIL_ACCESS_TOKEN").ok().or(default.gmail_access_token),
            mail_export_file: std::env::var("MAIL_EXPORT_FILE").ok().or(default.mail_export_file),
            openai_api_base_url: env_or("OPENAI_API_BASE_URL", default.openai_api_base_url),
            openai_model_name: env_or("OPENAI_MODEL_NAME", default.openai_model_name),
            anthropic_api_base_url: env_or("ANTHROPIC_API_BASE_URL", default.anthropic_api_base_url),
            anthropic_model_name: env_or("ANTHROPIC_MODEL_NAME", default.anthropic_model_name),
            summary_dir: env_or("SUMMARY_DIR", default.summary_dir),
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_secs(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn env_millis(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
