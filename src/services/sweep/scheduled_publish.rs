//! 定时发布检查器
//!
//! 候选条件：active 且 scheduled 且 publish_at <= now。
//! Scheduled 到 Published 由时间谓词检测，不是存储的状态迁移。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::mailer::Mailer;
use crate::models::notifications::responses::CheckerReport;
use crate::services::notifications::classwork;
use crate::storage::Storage;

pub async fn run(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    now: DateTime<Utc>,
) -> Result<CheckerReport> {
    let candidates = storage.list_scheduled_ready_classworks(now).await?;

    let mut report = CheckerReport {
        candidates: candidates.len(),
        ..Default::default()
    };
    debug!(
        "Scheduled-publish check at {}: {} candidate(s)",
        now, report.candidates
    );

    for item in candidates {
        match classwork::notify_classwork_posted(storage, mailer, item.assignment_id, item.id)
            .await
        {
            Ok(dispatch) => {
                report.dispatched += 1;
                report.queued += dispatch.queued;
            }
            // 单个课业的数据错误（如悬空的授课分配）跳过，不影响其余候选
            Err(e) => {
                warn!(
                    "Scheduled-publish dispatch failed for classwork {}: {}",
                    item.id, e
                );
                report.errors += 1;
            }
        }
    }

    Ok(report)
}
