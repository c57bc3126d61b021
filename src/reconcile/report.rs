//! 文字报告与时机分析

use std::fmt::Write as _;

use chrono::{NaiveDateTime, NaiveTime};

use crate::reconcile::reconciler::{percent, AccountOutcome, ReconciledDay};

const RULE: usize = 80;

/// 某一类结果的提交时间范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingBucket {
    pub earliest: NaiveDateTime,
    pub earliest_alias: String,
    pub latest: NaiveDateTime,
    pub latest_alias: String,
    pub count: usize,
}

impl TimingBucket {
    fn new(at: NaiveDateTime, alias: &str) -> Self {
        Self {
            earliest: at,
            earliest_alias: alias.to_string(),
            latest: at,
            latest_alias: alias.to_string(),
            count: 0,
        }
    }

    fn add(&mut self, at: NaiveDateTime, alias: &str) {
        if at < self.earliest {
            self.earliest = at;
            self.earliest_alias = alias.to_string();
        }
        if at > self.latest {
            self.latest = at;
            self.latest_alias = alias.to_string();
        }
        self.count += 1;
    }
}

/// 太早（取消）与太晚（无法处理）之间的窗口
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweetSpot {
    /// 最后一次取消早于第一次拒绝
    Gap {
        last_canceled: NaiveDateTime,
        first_rejected: NaiveDateTime,
        gap_ms: i64,
    },
    /// 有比拒绝更晚的取消，看不出窗口
    Overlap,
    /// 缺少取消或拒绝数据
    Undetermined,
}

/// 提交时机分析
#[derive(Debug, Clone)]
pub struct TimingAnalysis {
    pub canceled: Option<TimingBucket>,
    pub approved: Option<TimingBucket>,
    pub rejected: Option<TimingBucket>,
    pub sweet_spot: SweetSpot,
    pub recommendations: Vec<String>,
    /// 最早成功提交相对放号时刻的偏移（秒）
    pub optimal_offset_secs: Option<f64>,
}

impl TimingAnalysis {
    pub fn analyze(day: &ReconciledDay, release_time: NaiveTime) -> Self {
        let mut canceled: Option<TimingBucket> = None;
        let mut approved: Option<TimingBucket> = None;
        let mut rejected: Option<TimingBucket> = None;

        for (account, attempt) in day.attempts_by_time() {
            let bucket = match account.outcome {
                AccountOutcome::Canceled => &mut canceled,
                AccountOutcome::Approved => &mut approved,
                AccountOutcome::Rejected => &mut rejected,
                _ => continue,
            };
            bucket
                .get_or_insert_with(|| TimingBucket::new(attempt.timestamp, &account.alias))
                .add(attempt.timestamp, &account.alias);
        }

        let sweet_spot = match (&canceled, &rejected) {
            (Some(c), Some(r)) if c.latest < r.earliest => SweetSpot::Gap {
                last_canceled: c.latest,
                first_rejected: r.earliest,
                gap_ms: (r.earliest - c.latest).num_milliseconds(),
            },
            (Some(_), Some(_)) => SweetSpot::Overlap,
            _ => SweetSpot::Undetermined,
        };

        let canceled_count = canceled.as_ref().map_or(0, |b| b.count);
        let rejected_count = rejected.as_ref().map_or(0, |b| b.count);
        let mut recommendations = Vec::new();
        match (canceled_count, rejected_count) {
            (0, 0) => {}
            (c, 0) if c > 0 => recommendations
                .push("All failed submissions were too early. Need to delay significantly.".into()),
            (0, r) if r > 0 => recommendations
                .push("All failed submissions were too late. Need to submit earlier.".into()),
            (c, r) if c > r => recommendations
                .push("Submissions are generally too early. Consider delaying.".into()),
            (c, r) if r > c => recommendations
                .push("Submissions are generally too late. Consider submitting earlier.".into()),
            _ => recommendations.push(
                "Too-early and too-late failures are balanced. Keep the current submit second."
                    .into(),
            ),
        }

        let optimal_offset_secs = approved.as_ref().map(|b| {
            let release = b.earliest.date().and_time(release_time);
            (b.earliest - release).num_milliseconds() as f64 / 1000.0
        });
        if let Some(offset) = optimal_offset_secs {
            recommendations.push(format!(
                "Optimal submission time appears to be {} + {:.3} seconds",
                release_time.format("%H:%M:%S"),
                offset
            ));
        }

        Self {
            canceled,
            approved,
            rejected,
            sweet_spot,
            recommendations,
            optimal_offset_secs,
        }
    }
}

fn time_str(at: &NaiveDateTime) -> String {
    at.format("%H:%M:%S%.3f").to_string()
}

fn join(aliases: &[&str]) -> String {
    aliases.join(", ")
}

/// 生成给人看的文字报告
pub fn render_report(day: &ReconciledDay, release_time: NaiveTime) -> String {
    let mut out = String::new();
    // 写入 String 不会失败
    let _ = write_report(&mut out, day, release_time);
    out
}

fn write_report(out: &mut String, day: &ReconciledDay, release_time: NaiveTime) -> std::fmt::Result {
    let total = day.total_attempts();
    let confirmations = day.total_confirmations();
    let decisions = day.total_decisions();
    let rejected = day.total_rejected();
    let canceled = day.total_canceled();

    writeln!(out, "TENNIS BOOKING SUMMARY - {}", day.date.format("%Y-%m-%d"))?;
    writeln!(out, "{}", "=".repeat(RULE))?;
    writeln!(out)?;
    writeln!(out, "OVERALL RESULTS:")?;
    writeln!(out, "- Total booking attempts: {}", total)?;
    if let Some(at) = day.submission_time {
        writeln!(out, "- Submission phase started: {}", time_str(&at))?;
    }
    writeln!(
        out,
        "- Submission confirmations received: {}/{} ({:.1}%)",
        confirmations,
        total,
        percent(confirmations, total)
    )?;
    writeln!(
        out,
        "- Final decisions received: {}/{} ({:.1}%)",
        decisions,
        total,
        percent(decisions, total)
    )?;
    writeln!(out, "- Confirmed successful: {}", day.total_approved())?;
    writeln!(
        out,
        "- Confirmed failed: {} (rejected: {}, canceled: {})",
        rejected + canceled,
        rejected,
        canceled
    )?;
    writeln!(out, "- Still pending/unknown: {}", total.saturating_sub(decisions))?;

    writeln!(out)?;
    writeln!(out, "SUBMISSION RESULTS (ordered by time):")?;
    writeln!(
        out,
        "Legend: ✅=Approved ❌=Failed (too late/too early) 🚫=No confirmation ❓=Pending/Mixed"
    )?;
    for (i, (account, attempt)) in day.attempts_by_time().into_iter().enumerate() {
        writeln!(
            out,
            "{:2}. {} {} {:>10} → Court {} at {} on {}",
            i + 1,
            attempt.time_str(),
            account.outcome.glyph(),
            account.alias,
            attempt.court,
            attempt.time,
            attempt.booking_date
        )?;
    }

    let approved_accounts = day.aliases_with(AccountOutcome::Approved);
    let rejected_accounts = day.aliases_with(AccountOutcome::Rejected);
    let canceled_accounts = day.aliases_with(AccountOutcome::Canceled);
    let pending_accounts = day.aliases_with(AccountOutcome::ConfirmedPending);
    let silent_accounts = day.aliases_with(AccountOutcome::NoConfirmation);
    let mixed_accounts = day.aliases_with(AccountOutcome::Mixed);

    writeln!(out)?;
    writeln!(out, "ACCOUNT SUMMARY:")?;
    let groups = [
        (&approved_accounts, "✅ Submission Confirmed + Approved"),
        (&rejected_accounts, "❌ Submission Confirmed + Unable to Process (too late)"),
        (&canceled_accounts, "❌ Submission Confirmed + Cancelled (too early)"),
        (&pending_accounts, "❓ Submission Confirmed + No Decision (pending)"),
        (&silent_accounts, "🚫 No Submission Confirmation (technical failure)"),
        (&mixed_accounts, "❓ Mixed results (multiple outcomes)"),
    ];
    for (aliases, title) in groups {
        if !aliases.is_empty() {
            writeln!(out, "{}: {}", title, join(aliases))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "BY COURT SUCCESS RATE:")?;
    for (court, stats) in &day.by_court {
        writeln!(
            out,
            "  Court {}: {}/{} ({:.0}%)",
            court,
            stats.successes,
            stats.attempts,
            stats.rate()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "BY TIME SLOT SUCCESS RATE:")?;
    for (time, stats) in &day.by_time {
        writeln!(
            out,
            "  {}: {}/{} ({:.0}%)",
            time,
            stats.successes,
            stats.attempts,
            stats.rate()
        )?;
    }

    let bookings = day.approved_bookings();
    if !bookings.is_empty() {
        writeln!(out)?;
        writeln!(out, "CONFIRMED BOOKINGS:")?;
        for (alias, attempt) in bookings {
            writeln!(
                out,
                "  ✅ {} → Court {} at {} on {}",
                alias, attempt.court, attempt.time, attempt.booking_date
            )?;
        }
    }

    if !silent_accounts.is_empty() || !pending_accounts.is_empty() {
        writeln!(out)?;
        writeln!(out, "EMAIL TRACKING ANALYSIS:")?;
        if !silent_accounts.is_empty() {
            writeln!(out, "🚫 No submission confirmation: {}", join(&silent_accounts))?;
            writeln!(
                out,
                "   These accounts likely had technical failures - submissions never reached the server."
            )?;
        }
        if !pending_accounts.is_empty() {
            writeln!(out, "❓ Confirmed but no decision: {}", join(&pending_accounts))?;
            writeln!(
                out,
                "   These submissions were received but no final decision email arrived yet."
            )?;
        }
    }

    if !day.unmatched_aliases.is_empty() {
        writeln!(out)?;
        writeln!(out, "EMAILS WITHOUT LOGGED SUBMISSIONS:")?;
        writeln!(out, "  {}", day.unmatched_aliases.join(", "))?;
    }

    write_timing(out, &TimingAnalysis::analyze(day, release_time))
}

fn write_timing(out: &mut String, timing: &TimingAnalysis) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "🎯 TIMING ANALYSIS - FINDING THE SWEET SPOT:")?;
    writeln!(out, "{}", "=".repeat(60))?;

    let buckets = [
        (&timing.canceled, "❌ CANCELLED (Too Early):"),
        (&timing.approved, "✅ APPROVED (Perfect Timing):"),
        (&timing.rejected, "❌ REJECTED/Unable to Process (Too Late):"),
    ];
    for (bucket, title) in buckets {
        if let Some(b) = bucket {
            writeln!(out)?;
            writeln!(out, "{}", title)?;
            writeln!(out, "   Earliest: {} ({})", time_str(&b.earliest), b.earliest_alias)?;
            writeln!(out, "   Latest:   {} ({})", time_str(&b.latest), b.latest_alias)?;
            writeln!(out, "   Count:    {} submissions", b.count)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "🎯 SWEET SPOT ANALYSIS:")?;
    match &timing.sweet_spot {
        SweetSpot::Gap {
            last_canceled,
            first_rejected,
            gap_ms,
        } => {
            writeln!(out, "   Gap detected between too early and too late:")?;
            writeln!(out, "   Last cancelled: {}", time_str(last_canceled))?;
            writeln!(out, "   First rejected: {}", time_str(first_rejected))?;
            writeln!(out, "   Sweet spot window: {}ms", gap_ms)?;
        }
        SweetSpot::Overlap => {
            writeln!(out, "   ⚠️  OVERLAP DETECTED - No clear sweet spot!")?;
            writeln!(
                out,
                "   Some submissions were cancelled while others submitted earlier were rejected."
            )?;
        }
        SweetSpot::Undetermined => {
            writeln!(out, "   Not enough too-early/too-late data to locate a window.")?;
        }
    }

    if let Some(b) = &timing.approved {
        writeln!(out)?;
        writeln!(out, "   ✅ Successful timing window:")?;
        writeln!(out, "   From: {}", time_str(&b.earliest))?;
        writeln!(out, "   To:   {}", time_str(&b.latest))?;
    }

    writeln!(out)?;
    writeln!(out, "💡 RECOMMENDATIONS:")?;
    if timing.recommendations.is_empty() {
        writeln!(out, "   - No failed or approved submissions to learn from.")?;
    }
    for line in &timing.recommendations {
        writeln!(out, "   - {}", line)?;
    }
    Ok(())
}
