//! 公告通知

use std::sync::Arc;

use tracing::info;

use super::deliver;
use crate::errors::{EduNotifyError, Result};
use crate::mailer::{Mailer, templates};
use crate::models::notifications::entities::NotificationKind;
use crate::models::notifications::responses::DispatchReport;
use crate::storage::Storage;

/// 向 (课程, 班级) 的在读学生发送公告通知，作者本人除外
pub async fn notify_announcement_posted(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    announcement_id: i64,
) -> Result<DispatchReport> {
    let announcement = storage
        .get_announcement_by_id(announcement_id)
        .await?
        .ok_or_else(|| EduNotifyError::not_found(format!("公告不存在: {announcement_id}")))?;
    let ctx = storage
        .get_assignment_context(announcement.assignment_id)
        .await?
        .ok_or_else(|| {
            EduNotifyError::not_found(format!("授课分配不存在: {}", announcement.assignment_id))
        })?;

    let students = storage
        .list_enrolled_students(ctx.course.id, ctx.section.id)
        .await?;

    let mut report = DispatchReport::new(NotificationKind::AnnouncementPosted, announcement_id);
    report.audience = students.len();

    for student in &students {
        // 作者自己发的公告不用再通知作者
        if student.id == announcement.author_id {
            report.skipped_author += 1;
            continue;
        }
        let mail = templates::announcement_posted(&ctx, &announcement, student);
        deliver(storage, mailer, &mut report, student, mail, true).await;
    }

    info!(
        "Announcement {} ({}) notification: audience {}, queued {}",
        announcement_id, announcement.title, report.audience, report.queued
    );
    Ok(report)
}
