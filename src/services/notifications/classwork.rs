//! 课业发布通知

use std::sync::Arc;

use tracing::info;

use super::deliver;
use crate::errors::{EduNotifyError, Result};
use crate::mailer::{Mailer, templates};
use crate::models::notifications::entities::NotificationKind;
use crate::models::notifications::responses::DispatchReport;
use crate::storage::Storage;

/// 向 (课程, 班级) 的全部在读学生发送课业发布通知
pub async fn notify_classwork_posted(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    assignment_id: i64,
    classwork_id: i64,
) -> Result<DispatchReport> {
    let ctx = storage
        .get_assignment_context(assignment_id)
        .await?
        .ok_or_else(|| EduNotifyError::not_found(format!("授课分配不存在: {assignment_id}")))?;
    let classwork = storage
        .get_classwork_by_id(classwork_id)
        .await?
        .ok_or_else(|| EduNotifyError::not_found(format!("课业不存在: {classwork_id}")))?;

    let students = storage
        .list_enrolled_students(ctx.course.id, ctx.section.id)
        .await?;

    let mut report = DispatchReport::new(NotificationKind::ClassworkPosted, classwork_id);
    report.audience = students.len();

    for student in &students {
        let mail = templates::classwork_posted(&ctx, &classwork, student);
        deliver(storage, mailer, &mut report, student, mail, true).await;
    }

    info!(
        "Classwork {} ({}) notification: audience {}, queued {}, already notified {}",
        classwork_id, classwork.title, report.audience, report.queued,
        report.skipped_already_notified
    );
    Ok(report)
}
