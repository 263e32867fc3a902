//! 扫描调度器
//!
//! 进程级组件，显式 start/stop 生命周期。tick 到达时执行一轮扫描；
//! 扫描在本任务内 await，所以同一调度器不会并发扫描，跨触发源的
//! 重入由 SweepService 的原子标志兜底。stop 会等在途扫描完成。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::services::{SweepRun, SweepService};

pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// 启动调度循环
    pub fn start(sweep: Arc<SweepService>, interval: Duration) -> Self {
        let (shutdown, mut rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 错过的 tick 顺延，不补发
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval 的首个 tick 立即完成，消费掉让首轮扫描等满一个周期
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = rx.changed() => break,
                    _ = ticker.tick() => {
                        match sweep.run().await {
                            SweepRun::Completed(report) => info!(
                                "Sweep {} done: scheduled-publish {}/{} queued {}, due-reminders {}/{} queued {}",
                                report.run_id,
                                report.scheduled_publish.dispatched,
                                report.scheduled_publish.candidates,
                                report.scheduled_publish.queued,
                                report.due_reminders.dispatched,
                                report.due_reminders.candidates,
                                report.due_reminders.queued,
                            ),
                            SweepRun::AlreadyRunning => {
                                warn!("Sweep tick skipped: previous sweep still running")
                            }
                        }
                    }
                }
            }
            debug!("Scheduler loop exited");
        });

        Self { shutdown, handle }
    }

    /// 停止调度循环，等在途扫描完成
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
        info!("Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SweepConfig;
    use crate::services::notifications::tests::fixture;

    #[tokio::test]
    async fn test_scheduler_ticks_and_stops() {
        let fx = fixture().await;
        let service = Arc::new(SweepService::new(
            fx.storage.clone(),
            fx.mailer.clone(),
            &SweepConfig::default(),
        ));

        let scheduler = Scheduler::start(service.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(120)).await;
        scheduler.stop().await;

        // 空数据库上扫描照常完成并记录
        let last = service.last_run().await.expect("at least one sweep ran");
        assert_eq!(last.scheduled_publish.candidates, 0);
        assert_eq!(last.due_reminders.candidates, 0);
    }

    #[tokio::test]
    async fn test_stop_without_tick_is_clean() {
        let fx = fixture().await;
        let service = Arc::new(SweepService::new(
            fx.storage.clone(),
            fx.mailer.clone(),
            &SweepConfig::default(),
        ));

        let scheduler = Scheduler::start(service.clone(), Duration::from_secs(3600));
        scheduler.stop().await;
        assert!(service.last_run().await.is_none());
    }
}
