//! 教师分配通知

use std::sync::Arc;

use tracing::info;

use super::deliver;
use crate::errors::{EduNotifyError, Result};
use crate::mailer::{Mailer, templates};
use crate::models::notifications::entities::NotificationKind;
use crate::models::notifications::responses::DispatchReport;
use crate::storage::Storage;

/// 向 (课程, 班级) 的在读学生通知新的授课教师
pub async fn notify_teacher_assigned(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    assignment_id: i64,
) -> Result<DispatchReport> {
    let ctx = storage
        .get_assignment_context(assignment_id)
        .await?
        .ok_or_else(|| EduNotifyError::not_found(format!("授课分配不存在: {assignment_id}")))?;

    let students = storage
        .list_enrolled_students(ctx.course.id, ctx.section.id)
        .await?;

    let mut report = DispatchReport::new(NotificationKind::TeacherAssigned, assignment_id);
    report.audience = students.len();

    for student in &students {
        let mail = templates::teacher_assigned(&ctx, student);
        deliver(storage, mailer, &mut report, student, mail, true).await;
    }

    info!(
        "Teacher assignment {} notification: audience {}, queued {}",
        assignment_id, report.audience, report.queued
    );
    Ok(report)
}
