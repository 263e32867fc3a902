use serde::{Deserialize, Serialize};

use super::entities::NotificationKind;

/// 单个收件人的投递失败信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchFailure {
    pub recipient_id: i64,
    pub email: String,
    pub error: String,
}

/// 一次通知分发的结果
///
/// 单个收件人失败不会中断其余收件人，失败逐条记录在 failures 里。
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub kind: NotificationKind,
    pub entity_id: i64,
    // 解析出的受众人数（含被跳过者）
    pub audience: usize,
    // 实际入队的邮件数
    pub queued: usize,
    pub skipped_no_email: usize,
    pub skipped_already_notified: usize,
    pub skipped_author: usize,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn new(kind: NotificationKind, entity_id: i64) -> Self {
        Self {
            kind,
            entity_id,
            audience: 0,
            queued: 0,
            skipped_no_email: 0,
            skipped_already_notified: 0,
            skipped_author: 0,
            failures: Vec::new(),
        }
    }
}

/// 单个检查器在一轮扫描中的结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckerReport {
    // 选中的候选课业数
    pub candidates: usize,
    // 成功完成分发的候选数
    pub dispatched: usize,
    // 入队的邮件总数
    pub queued: usize,
    // 分发失败（记录并跳过）的候选数
    pub errors: usize,
}

/// 一轮扫描的汇总结果
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub run_id: uuid::Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    pub scheduled_publish: CheckerReport,
    pub due_reminders: CheckerReport,
}

/// GET /api/v1/sweep/status 响应
#[derive(Debug, Clone, Serialize)]
pub struct SweepStatusResponse {
    pub running: bool,
    pub last_run: Option<SweepReport>,
}

/// GET /api/v1/system/health 响应
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
}
