//! 课件发布通知

use std::sync::Arc;

use tracing::info;

use super::deliver;
use crate::errors::{EduNotifyError, Result};
use crate::mailer::{Mailer, templates};
use crate::models::notifications::entities::NotificationKind;
use crate::models::notifications::responses::DispatchReport;
use crate::storage::Storage;

/// 向 (课程, 班级) 的全部在读学生发送课件发布通知
pub async fn notify_material_posted(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    material_id: i64,
) -> Result<DispatchReport> {
    let material = storage
        .get_material_by_id(material_id)
        .await?
        .ok_or_else(|| EduNotifyError::not_found(format!("课件不存在: {material_id}")))?;
    let ctx = storage
        .get_assignment_context(material.assignment_id)
        .await?
        .ok_or_else(|| {
            EduNotifyError::not_found(format!("授课分配不存在: {}", material.assignment_id))
        })?;

    let students = storage
        .list_enrolled_students(ctx.course.id, ctx.section.id)
        .await?;

    let mut report = DispatchReport::new(NotificationKind::MaterialPosted, material_id);
    report.audience = students.len();

    for student in &students {
        let mail = templates::material_posted(&ctx, &material, student);
        deliver(storage, mailer, &mut report, student, mail, true).await;
    }

    info!(
        "Material {} ({}) notification: audience {}, queued {}",
        material_id, material.title, report.audience, report.queued
    );
    Ok(report)
}
