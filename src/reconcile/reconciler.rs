//! 日志与邮件对账
//!
//! 同一个账号一天内的所有提交共享同一组邮件，无法区分哪封邮件对应哪次提交，
//! 所以结果按账号判定，再落到该账号的每一次提交上。

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::models::{BookingAttempt, DecisionCategory, EmailDecision, EmailKind};
use crate::reconcile::log_parser::LogData;

/// 一个账号当天的邮件计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionCounts {
    pub approved: usize,
    pub rejected: usize,
    pub canceled: usize,
    pub pending: usize,
    pub unknown: usize,
    /// 提交确认邮件数
    pub confirmations: usize,
    /// 最终决定邮件数
    pub final_decisions: usize,
}

impl DecisionCounts {
    pub fn from_decisions<'a>(decisions: impl IntoIterator<Item = &'a EmailDecision>) -> Self {
        let mut counts = Self::default();
        for decision in decisions {
            match decision.category {
                DecisionCategory::Approved => counts.approved += 1,
                DecisionCategory::Rejected => counts.rejected += 1,
                DecisionCategory::Canceled => counts.canceled += 1,
                DecisionCategory::Pending => counts.pending += 1,
                DecisionCategory::Unknown => counts.unknown += 1,
            }
            match decision.kind() {
                EmailKind::SubmissionConfirmation => counts.confirmations += 1,
                EmailKind::FinalDecision => counts.final_decisions += 1,
                EmailKind::Unknown => {}
            }
        }
        counts
    }
}

/// 账号级别的对账结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountOutcome {
    /// 没收到提交确认：提交没有到达服务器
    NoConfirmation,
    /// 有确认，还没有最终决定
    ConfirmedPending,
    Approved,
    /// 无法处理：提交太晚
    Rejected,
    /// 已取消：提交太早
    Canceled,
    Mixed,
}

impl AccountOutcome {
    /// 判定表，按顺序匹配
    pub fn classify(counts: &DecisionCounts) -> Self {
        let DecisionCounts {
            approved,
            rejected,
            canceled,
            confirmations,
            final_decisions,
            ..
        } = *counts;

        if confirmations == 0 {
            AccountOutcome::NoConfirmation
        } else if final_decisions == 0 {
            AccountOutcome::ConfirmedPending
        } else if approved > 0 && rejected == 0 && canceled == 0 {
            AccountOutcome::Approved
        } else if approved == 0 && rejected > 0 && canceled == 0 {
            AccountOutcome::Rejected
        } else if approved == 0 && canceled > 0 && rejected == 0 {
            AccountOutcome::Canceled
        } else {
            AccountOutcome::Mixed
        }
    }

    /// 报告中使用的标记
    pub fn glyph(self) -> &'static str {
        match self {
            AccountOutcome::Approved => "✅",
            AccountOutcome::Rejected | AccountOutcome::Canceled => "❌",
            AccountOutcome::NoConfirmation => "🚫",
            AccountOutcome::ConfirmedPending | AccountOutcome::Mixed => "❓",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccountOutcome::NoConfirmation => "no confirmation",
            AccountOutcome::ConfirmedPending => "confirmed, no decision",
            AccountOutcome::Approved => "approved",
            AccountOutcome::Rejected => "rejected (too late)",
            AccountOutcome::Canceled => "canceled (too early)",
            AccountOutcome::Mixed => "mixed",
        }
    }
}

impl fmt::Display for AccountOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 一个账号的提交与邮件
#[derive(Debug, Clone)]
pub struct AccountResult {
    pub alias: String,
    pub attempts: Vec<BookingAttempt>,
    pub emails: Vec<EmailDecision>,
    pub counts: DecisionCounts,
    pub outcome: AccountOutcome,
}

/// 成功率统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStats {
    pub attempts: usize,
    pub successes: usize,
}

impl SlotStats {
    /// 成功率（百分比），没有提交时为 0
    pub fn rate(&self) -> f64 {
        percent(self.successes, self.attempts)
    }
}

/// 百分比，分母为 0 时返回 0
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// 一天的对账结果
#[derive(Debug, Clone)]
pub struct ReconciledDay {
    pub date: NaiveDate,
    pub submission_time: Option<NaiveDateTime>,
    pub accounts: BTreeMap<String, AccountResult>,
    pub by_court: BTreeMap<u8, SlotStats>,
    pub by_time: BTreeMap<String, SlotStats>,
    /// 有邮件但日志里没有提交记录的别名
    pub unmatched_aliases: Vec<String>,
}

impl ReconciledDay {
    pub fn total_attempts(&self) -> usize {
        self.accounts.values().map(|a| a.attempts.len()).sum()
    }

    pub fn total_confirmations(&self) -> usize {
        self.sum(|c| c.confirmations)
    }

    pub fn total_decisions(&self) -> usize {
        self.sum(|c| c.final_decisions)
    }

    pub fn total_approved(&self) -> usize {
        self.sum(|c| c.approved)
    }

    pub fn total_rejected(&self) -> usize {
        self.sum(|c| c.rejected)
    }

    pub fn total_canceled(&self) -> usize {
        self.sum(|c| c.canceled)
    }

    fn sum(&self, field: impl Fn(&DecisionCounts) -> usize) -> usize {
        self.accounts.values().map(|a| field(&a.counts)).sum()
    }

    /// 所有提交按时间排序，附带所属账号
    pub fn attempts_by_time(&self) -> Vec<(&AccountResult, &BookingAttempt)> {
        let mut rows: Vec<_> = self
            .accounts
            .values()
            .flat_map(|account| account.attempts.iter().map(move |a| (account, a)))
            .collect();
        rows.sort_by_key(|(_, attempt)| attempt.timestamp);
        rows
    }

    /// 指定结果的账号别名（已排序）
    pub fn aliases_with(&self, outcome: AccountOutcome) -> Vec<&str> {
        self.accounts
            .values()
            .filter(|a| a.outcome == outcome)
            .map(|a| a.alias.as_str())
            .collect()
    }

    /// 已确认成功的预约
    pub fn approved_bookings(&self) -> Vec<(&str, &BookingAttempt)> {
        self.accounts
            .values()
            .filter(|a| a.outcome == AccountOutcome::Approved)
            .flat_map(|a| a.attempts.iter().map(move |attempt| (a.alias.as_str(), attempt)))
            .collect()
    }
}

/// 把日志中的提交与邮件结果按账号别名对上
pub fn reconcile(log: &LogData, decisions: &[EmailDecision]) -> ReconciledDay {
    let mut emails_by_alias: BTreeMap<&str, Vec<EmailDecision>> = BTreeMap::new();
    for decision in decisions {
        emails_by_alias
            .entry(decision.alias.as_str())
            .or_default()
            .push(decision.clone());
    }

    let mut accounts = BTreeMap::new();
    let mut by_court: BTreeMap<u8, SlotStats> = BTreeMap::new();
    let mut by_time: BTreeMap<String, SlotStats> = BTreeMap::new();

    for (alias, attempts) in &log.by_account {
        let emails = emails_by_alias.remove(alias.as_str()).unwrap_or_default();
        let counts = DecisionCounts::from_decisions(&emails);
        let outcome = AccountOutcome::classify(&counts);
        debug!("账号 {}: {:?} → {}", alias, counts, outcome);

        for attempt in attempts {
            let court = by_court.entry(attempt.court).or_default();
            let time = by_time.entry(attempt.time.clone()).or_default();
            court.attempts += 1;
            time.attempts += 1;
            if outcome == AccountOutcome::Approved {
                court.successes += 1;
                time.successes += 1;
            }
        }

        accounts.insert(
            alias.clone(),
            AccountResult {
                alias: alias.clone(),
                attempts: attempts.clone(),
                emails,
                counts,
                outcome,
            },
        );
    }

    let unmatched_aliases: Vec<String> = emails_by_alias.keys().map(|a| a.to_string()).collect();
    if !unmatched_aliases.is_empty() {
        warn!(
            "⚠️  {} 个别名有邮件但日志中没有提交记录: {}",
            unmatched_aliases.len(),
            unmatched_aliases.join(", ")
        );
    }

    ReconciledDay {
        date: log.date,
        submission_time: log.submission_time,
        accounts,
        by_court,
        by_time,
        unmatched_aliases,
    }
}
