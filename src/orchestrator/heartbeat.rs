//! 会话心跳
//!
//! 后台任务定期读取每个会话的页面标题，防止等待期间会话超时。

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::workflow::SessionProbe;

/// 正在运行的心跳任务
pub struct Heartbeat {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Heartbeat {
    /// 启动心跳，第一次在 `period` 之后
    pub fn start(probes: Vec<SessionProbe>, period: Duration) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        info!("💓 心跳启动: {} 个会话，每 {} 秒一次", probes.len(), period.as_secs());

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        let mut alive = 0;
                        for probe in &probes {
                            match probe.touch().await {
                                Ok(_) => alive += 1,
                                Err(e) => warn!("{} 心跳失败: {}", probe.label, e),
                            }
                        }
                        debug!("心跳完成: {}/{} 个会话正常", alive, probes.len());
                    }
                }
            }
        });

        Self { stop_tx, handle }
    }

    /// 停止心跳并等待任务结束
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!("心跳任务异常退出: {}", e);
        }
        debug!("心跳已停止");
    }
}
