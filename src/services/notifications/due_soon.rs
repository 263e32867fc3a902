//! 截止提醒通知

use std::sync::Arc;

use tracing::info;

use super::deliver;
use crate::errors::{EduNotifyError, Result};
use crate::mailer::{Mailer, templates};
use crate::models::notifications::entities::NotificationKind;
use crate::models::notifications::responses::DispatchReport;
use crate::storage::Storage;

/// 向课业的未提交学生发送截止提醒
///
/// repeat 为 true 时跳过幂等记录，每次调用都重发（旧系统行为）。
pub async fn notify_classwork_due_soon(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    classwork_id: i64,
    repeat: bool,
) -> Result<DispatchReport> {
    let classwork = storage
        .get_classwork_by_id(classwork_id)
        .await?
        .ok_or_else(|| EduNotifyError::not_found(format!("课业不存在: {classwork_id}")))?;
    let ctx = storage
        .get_assignment_context(classwork.assignment_id)
        .await?
        .ok_or_else(|| {
            EduNotifyError::not_found(format!("授课分配不存在: {}", classwork.assignment_id))
        })?;

    let students = storage.list_unsubmitted_students(classwork_id).await?;

    let mut report = DispatchReport::new(NotificationKind::DueSoon, classwork_id);
    report.audience = students.len();

    for student in &students {
        let mail = templates::due_soon(&ctx, &classwork, student);
        deliver(storage, mailer, &mut report, student, mail, !repeat).await;
    }

    info!(
        "Due-soon reminder for classwork {} ({}): audience {}, queued {}",
        classwork_id, classwork.title, report.audience, report.queued
    );
    Ok(report)
}
