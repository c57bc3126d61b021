//! 账号分配
//!
//! 决定"哪个账号去订哪个场次"，以及失败后换号重试。
//! 不碰浏览器：真正的准备动作由调用方以闭包传入。

use std::collections::VecDeque;
use std::future::Future;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tracing::warn;

use crate::models::{Account, BookingPlan, CourtSlot};

/// 一个预约目标：日期 + 场次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingTarget {
    pub date: NaiveDate,
    pub slot: CourtSlot,
}

/// 按日期顺序、每个日期内按优先级顺序列出所有目标
pub fn booking_targets(plan: &BookingPlan, dates: &[NaiveDate]) -> Vec<BookingTarget> {
    dates
        .iter()
        .flat_map(|date| {
            plan.priorities.iter().map(move |slot| BookingTarget {
                date: *date,
                slot: slot.clone(),
            })
        })
        .collect()
}

/// 本次运行可用的账号
///
/// 每个账号只会被取出一次，取出后不再放回（无论成功失败）。
#[derive(Debug, Default)]
pub struct AccountPool {
    accounts: VecDeque<Account>,
}

impl AccountPool {
    /// 按给定顺序建池
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: accounts.into(),
        }
    }

    /// 打乱顺序后建池
    pub fn shuffled(mut accounts: Vec<Account>) -> Self {
        accounts.shuffle(&mut rand::thread_rng());
        Self::new(accounts)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// 取出第一个愿意订这个场次的账号
    pub fn take_for(&mut self, slot: &CourtSlot) -> Option<Account> {
        let position = self.accounts.iter().position(|a| a.accepts(slot))?;
        self.accounts.remove(position)
    }
}

/// 单个目标的准备结果
#[derive(Debug)]
pub enum SlotOutcome<T> {
    /// 准备成功
    Prepared(T),
    /// 用掉了 `tries` 个账号仍然失败
    Exhausted { tries: usize },
    /// 没有可用账号
    NoAccount,
}

/// 为一个场次准备会话，失败时换下一个账号重试
///
/// # 参数
/// - `pool`: 共享账号池
/// - `slot`: 目标场次
/// - `max_retries`: 首次失败后最多再换几个账号
/// - `attempt`: 用一个账号做一次准备
pub async fn fill_slot<T, E, F, Fut>(
    pool: &Mutex<AccountPool>,
    slot: &CourtSlot,
    max_retries: usize,
    mut attempt: F,
) -> SlotOutcome<T>
where
    E: std::fmt::Display,
    F: FnMut(Account) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut tries = 0;
    loop {
        let Some(account) = pool.lock().await.take_for(slot) else {
            return if tries == 0 {
                SlotOutcome::NoAccount
            } else {
                SlotOutcome::Exhausted { tries }
            };
        };

        tries += 1;
        let email = account.email.clone();
        match attempt(account).await {
            Ok(prepared) => return SlotOutcome::Prepared(prepared),
            Err(e) => {
                warn!("[{} {}] 第 {} 次准备失败: {:#}", slot, email, tries, e);
                if tries > max_retries {
                    return SlotOutcome::Exhausted { tries };
                }
            }
        }
    }
}

/// 按目标顺序逐个准备，前一个目标（含换号重试）结束后才开始下一个
///
/// 返回的结果与 `targets` 一一对应。高优先级目标的重试总是先于低优先级目标取号。
pub async fn fill_targets<T, E, F, Fut>(
    pool: &Mutex<AccountPool>,
    targets: &[BookingTarget],
    max_retries: usize,
    mut attempt: F,
) -> Vec<SlotOutcome<T>>
where
    E: std::fmt::Display,
    F: FnMut(Account, &BookingTarget) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut outcomes = Vec::with_capacity(targets.len());
    for target in targets {
        let outcome = fill_slot(pool, &target.slot, max_retries, |account| {
            attempt(account, target)
        })
        .await;
        outcomes.push(outcome);
    }
    outcomes
}
