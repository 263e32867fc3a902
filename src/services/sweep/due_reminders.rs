//! 截止提醒检查器
//!
//! 候选条件：deadline 落在 (now, now+window] 区间，active，且不是
//! 尚未到发布时间的定时课业。受众是未提交的学生。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::mailer::Mailer;
use crate::models::notifications::responses::CheckerReport;
use crate::services::notifications::due_soon;
use crate::storage::Storage;

pub async fn run(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    now: DateTime<Utc>,
    window: Duration,
    repeat: bool,
) -> Result<CheckerReport> {
    let candidates = storage.list_due_soon_classworks(now, window).await?;

    let mut report = CheckerReport {
        candidates: candidates.len(),
        ..Default::default()
    };
    debug!(
        "Due-reminder check at {}: {} candidate(s) within {}h",
        now,
        report.candidates,
        window.num_hours()
    );

    for item in candidates {
        match due_soon::notify_classwork_due_soon(storage, mailer, item.id, repeat).await {
            Ok(dispatch) => {
                report.dispatched += 1;
                report.queued += dispatch.queued;
            }
            Err(e) => {
                warn!("Due-reminder dispatch failed for classwork {}: {}", item.id, e);
                report.errors += 1;
            }
        }
    }

    Ok(report)
}
