//! 业务能力层
//!
//! 每个服务只负责一种能力，不关心流程顺序：
//! - 登录、填表、网络预检（预约侧）
//! - 邮箱读取、LLM 总结、报告写入（对账侧）

pub mod login_service;
pub mod mailbox;
pub mod permit_form;
pub mod preflight;
pub mod report_writer;
pub mod selectors;
pub mod summarizer;

pub use login_service::LoginService;
pub use mailbox::{GmailMailbox, JsonMailbox, Mailbox};
pub use permit_form::PermitForm;
pub use preflight::check_network;
pub use report_writer::ReportWriter;
pub use summarizer::{LlmProvider, Summarizer};
