use std::fmt;

use chrono::NaiveDateTime;

/// 邮件标题的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionCategory {
    Approved,
    Rejected,
    Canceled,
    Pending,
    Unknown,
}

impl DecisionCategory {
    /// 该分类对应的邮件类型
    pub fn kind(self) -> EmailKind {
        match self {
            DecisionCategory::Approved
            | DecisionCategory::Rejected
            | DecisionCategory::Canceled => EmailKind::FinalDecision,
            DecisionCategory::Pending => EmailKind::SubmissionConfirmation,
            DecisionCategory::Unknown => EmailKind::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DecisionCategory::Approved => "approved",
            DecisionCategory::Rejected => "rejected",
            DecisionCategory::Canceled => "canceled",
            DecisionCategory::Pending => "pending",
            DecisionCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DecisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 邮件类型：提交确认 / 最终决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailKind {
    SubmissionConfirmation,
    FinalDecision,
    Unknown,
}

/// 一封供应商发来的结果邮件
#[derive(Debug, Clone)]
pub struct EmailDecision {
    /// 收件人别名
    pub alias: String,
    pub category: DecisionCategory,
    pub subject: String,
    /// 收到时间（本地时间）
    pub received: Option<NaiveDateTime>,
}

impl EmailDecision {
    pub fn kind(&self) -> EmailKind {
        self.category.kind()
    }
}
