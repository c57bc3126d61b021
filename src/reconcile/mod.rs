//! 结果对账层
//!
//! 动作日志 + 邮件 → 每个账号的结果 → 文字报告

pub mod email_classifier;
pub mod log_parser;
pub mod reconciler;
pub mod report;

pub use email_classifier::{classify_subject, decision_from_headers, recipient_alias};
pub use log_parser::{parse_log_line, parse_log_lines, BookingLogParser, LogData};
pub use reconciler::{percent, reconcile, AccountOutcome, AccountResult, DecisionCounts, ReconciledDay, SlotStats};
pub use report::{render_report, SweetSpot, TimingAnalysis, TimingBucket};
