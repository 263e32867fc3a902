//! 通知分发服务
//!
//! 每种事件一个子模块，形状一致：加载触发实体和授课分配上下文，
//! 解析受众（选课学生，公告排除作者），逐个收件人建模板、入队。
//! 单个收件人的失败记录在报告里，不中断其余收件人。

pub mod announcement;
pub mod classwork;
pub mod due_soon;
pub mod material;
pub mod teacher_assignment;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::{EduNotifyError, Result};
use crate::mailer::{Mailer, OutboundEmail};
use crate::models::notifications::responses::{DispatchFailure, DispatchReport};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate_email;

/// 单个收件人的投递步骤
///
/// 顺序：先邮箱检查，再幂等记录（dedupe 时），最后入队。
/// mark_notified 在入队前写入，保证两轮扫描不会重复入队；
/// 入队后的投递失败只记录、不重试。
pub(crate) async fn deliver(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    report: &mut DispatchReport,
    recipient: &User,
    mail: OutboundEmail,
    dedupe: bool,
) {
    if !recipient.has_email() || validate_email(&recipient.email).is_err() {
        debug!(
            "Recipient {} has no usable email, skipping {} notification",
            recipient.id, report.kind
        );
        report.skipped_no_email += 1;
        return;
    }

    if dedupe {
        match storage
            .mark_notified(report.kind, report.entity_id, recipient.id)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                report.skipped_already_notified += 1;
                return;
            }
            Err(e) => {
                report.failures.push(DispatchFailure {
                    recipient_id: recipient.id,
                    email: recipient.email.clone(),
                    error: e.to_string(),
                });
                return;
            }
        }
    }

    match mailer.send(mail).await {
        Ok(()) => report.queued += 1,
        Err(e) => report.failures.push(DispatchFailure {
            recipient_id: recipient.id,
            email: recipient.email.clone(),
            error: e.to_string(),
        }),
    }
}

pub struct NotificationService {
    storage: Option<Arc<dyn Storage>>,
    mailer: Option<Arc<dyn Mailer>>,
}

impl NotificationService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            mailer: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_mailer(&self, request: &HttpRequest) -> Arc<dyn Mailer> {
        if let Some(mailer) = &self.mailer {
            mailer.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Mailer>>>()
                .expect("Mailer not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 手动触发路径的统一响应转换：错误向调用方抛出
    fn respond(result: Result<DispatchReport>) -> ActixResult<HttpResponse> {
        match result {
            Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report, "通知已入队"))),
            Err(e @ EduNotifyError::NotFound(_)) => Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::NotFound, e.message()))),
            Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("通知分发失败: {e}"),
            ))),
        }
    }

    pub async fn notify_material(
        &self,
        request: &HttpRequest,
        material_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let mailer = self.get_mailer(request);
        Self::respond(material::notify_material_posted(&storage, &mailer, material_id).await)
    }

    pub async fn notify_announcement(
        &self,
        request: &HttpRequest,
        announcement_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let mailer = self.get_mailer(request);
        Self::respond(
            announcement::notify_announcement_posted(&storage, &mailer, announcement_id).await,
        )
    }

    pub async fn notify_classwork(
        &self,
        request: &HttpRequest,
        classwork_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let mailer = self.get_mailer(request);

        // 先解析课业拿到授课分配 ID，再走统一分发路径
        let classwork = match storage.get_classwork_by_id(classwork_id).await {
            Ok(Some(classwork)) => classwork,
            Ok(None) => {
                return Self::respond(Err(EduNotifyError::not_found(format!(
                    "课业不存在: {classwork_id}"
                ))));
            }
            Err(e) => return Self::respond(Err(e)),
        };
        Self::respond(
            classwork::notify_classwork_posted(
                &storage,
                &mailer,
                classwork.assignment_id,
                classwork_id,
            )
            .await,
        )
    }

    pub async fn notify_classwork_due_soon(
        &self,
        request: &HttpRequest,
        classwork_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let mailer = self.get_mailer(request);
        let repeat = AppConfig::get().sweep.repeat_reminders;
        Self::respond(
            due_soon::notify_classwork_due_soon(&storage, &mailer, classwork_id, repeat).await,
        )
    }

    pub async fn notify_teacher_assigned(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let mailer = self.get_mailer(request);
        Self::respond(
            teacher_assignment::notify_teacher_assigned(&storage, &mailer, assignment_id).await,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mailer::testing::RecordingMailer;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::testing::*;

    pub(crate) struct Fixture {
        pub sea: SeaOrmStorage,
        pub storage: Arc<dyn Storage>,
        pub recorder: Arc<RecordingMailer>,
        pub mailer: Arc<dyn Mailer>,
        pub assignment: i64,
        pub course: i64,
        pub section: i64,
        pub teacher: i64,
    }

    impl Fixture {
        /// 建一个在读学生
        pub async fn enroll_student(&self, username: &str, email: &str) -> i64 {
            let id = seed_user(&self.sea, username, email, "student").await;
            seed_enrollment(&self.sea, id, self.course, self.section).await;
            id
        }

        pub async fn classwork(
            &self,
            deadline: Option<i64>,
            scheduled: bool,
            publish_at: Option<i64>,
        ) -> i64 {
            seed_classwork(
                &self.sea,
                ClassworkSeed {
                    assignment_id: self.assignment,
                    created_by: self.teacher,
                    deadline,
                    scheduled,
                    publish_at,
                    active: true,
                },
            )
            .await
        }
    }

    pub(crate) async fn fixture() -> Fixture {
        fixture_with_mailer(Arc::new(RecordingMailer::new())).await
    }

    pub(crate) async fn fixture_with_mailer(recorder: Arc<RecordingMailer>) -> Fixture {
        let sea = memory_storage().await;
        let teacher = seed_user(&sea, "teacher1", "t1@school.edu", "teacher").await;
        let course = seed_course(&sea, "MATH101", "Algebra").await;
        let section = seed_section(&sea, "A").await;
        let assignment = seed_assignment(&sea, teacher, course, section).await;

        Fixture {
            storage: Arc::new(sea.clone()),
            sea,
            mailer: recorder.clone(),
            recorder,
            assignment,
            course,
            section,
            teacher,
        }
    }

    #[tokio::test]
    async fn test_classwork_posted_reaches_enrolled_students() {
        let fx = fixture().await;
        fx.enroll_student("student1", "s1@school.edu").await;
        fx.enroll_student("student2", "s2@school.edu").await;
        let classwork = fx.classwork(None, false, None).await;

        let report =
            classwork::notify_classwork_posted(&fx.storage, &fx.mailer, fx.assignment, classwork)
                .await
                .unwrap();

        assert_eq!(report.audience, 2);
        assert_eq!(report.queued, 2);
        let recipients = fx.recorder.recipients();
        assert!(recipients.contains(&"s1@school.edu".to_string()));
        assert!(recipients.contains(&"s2@school.edu".to_string()));
    }

    #[tokio::test]
    async fn test_classwork_posted_is_idempotent() {
        let fx = fixture().await;
        fx.enroll_student("student1", "s1@school.edu").await;
        let classwork = fx.classwork(None, false, None).await;

        let first =
            classwork::notify_classwork_posted(&fx.storage, &fx.mailer, fx.assignment, classwork)
                .await
                .unwrap();
        let second =
            classwork::notify_classwork_posted(&fx.storage, &fx.mailer, fx.assignment, classwork)
                .await
                .unwrap();

        assert_eq!(first.queued, 1);
        assert_eq!(second.queued, 0);
        assert_eq!(second.skipped_already_notified, 1);
        assert_eq!(fx.recorder.recipients().len(), 1);
    }

    #[tokio::test]
    async fn test_announcement_excludes_author() {
        let fx = fixture().await;
        // 作者也是在读学生
        let author = fx.enroll_student("student1", "s1@school.edu").await;
        fx.enroll_student("student2", "s2@school.edu").await;
        let announcement = seed_announcement(&fx.sea, fx.assignment, author).await;

        let report =
            announcement::notify_announcement_posted(&fx.storage, &fx.mailer, announcement)
                .await
                .unwrap();

        assert_eq!(report.audience, 2);
        assert_eq!(report.skipped_author, 1);
        assert_eq!(report.queued, 1);
        assert_eq!(fx.recorder.recipients(), vec!["s2@school.edu".to_string()]);
    }

    #[tokio::test]
    async fn test_material_posted_reaches_enrolled_students() {
        let fx = fixture().await;
        fx.enroll_student("student1", "s1@school.edu").await;
        let material = seed_material(&fx.sea, fx.assignment, fx.teacher).await;

        let report = material::notify_material_posted(&fx.storage, &fx.mailer, material)
            .await
            .unwrap();

        assert_eq!(report.queued, 1);
        assert_eq!(fx.recorder.recipients(), vec!["s1@school.edu".to_string()]);
    }

    #[tokio::test]
    async fn test_due_soon_targets_unsubmitted_with_email_only() {
        let fx = fixture().await;
        let pending = fx.enroll_student("student1", "s1@school.edu").await;
        let done = fx.enroll_student("student2", "s2@school.edu").await;
        // 没有邮箱的未提交学生只计入 skipped_no_email
        let no_email = fx.enroll_student("student3", "").await;

        let classwork = fx
            .classwork(Some(chrono::Utc::now().timestamp() + 3600), false, None)
            .await;
        seed_submission(&fx.sea, classwork, pending, "not_submitted").await;
        seed_submission(&fx.sea, classwork, done, "submitted").await;
        seed_submission(&fx.sea, classwork, no_email, "not_submitted").await;

        let report = due_soon::notify_classwork_due_soon(&fx.storage, &fx.mailer, classwork, false)
            .await
            .unwrap();

        assert_eq!(report.audience, 2);
        assert_eq!(report.queued, 1);
        assert_eq!(report.skipped_no_email, 1);
        assert_eq!(fx.recorder.recipients(), vec!["s1@school.edu".to_string()]);
    }

    #[tokio::test]
    async fn test_due_soon_repeat_flag_resends() {
        let fx = fixture().await;
        let pending = fx.enroll_student("student1", "s1@school.edu").await;
        let classwork = fx
            .classwork(Some(chrono::Utc::now().timestamp() + 3600), false, None)
            .await;
        seed_submission(&fx.sea, classwork, pending, "not_submitted").await;

        // repeat_reminders = true：恢复每轮重发的旧行为
        for _ in 0..2 {
            due_soon::notify_classwork_due_soon(&fx.storage, &fx.mailer, classwork, true)
                .await
                .unwrap();
        }
        assert_eq!(fx.recorder.recipients().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_recipient_does_not_abort_batch() {
        let fx = fixture_with_mailer(Arc::new(RecordingMailer::failing_for("bad@school.edu"))).await;
        fx.enroll_student("student1", "bad@school.edu").await;
        fx.enroll_student("student2", "ok@school.edu").await;
        let classwork = fx.classwork(None, false, None).await;

        let report =
            classwork::notify_classwork_posted(&fx.storage, &fx.mailer, fx.assignment, classwork)
                .await
                .unwrap();

        assert_eq!(report.queued, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].email, "bad@school.edu");
        assert_eq!(fx.recorder.recipients(), vec!["ok@school.edu".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_assignment_is_not_found() {
        let fx = fixture().await;
        let err = teacher_assignment::notify_teacher_assigned(&fx.storage, &fx.mailer, 999)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }
}
