use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::NotificationService;

// 懒加载的全局 NotificationService 实例
static NOTIFICATION_SERVICE: Lazy<NotificationService> = Lazy::new(NotificationService::new_lazy);

// 手动触发课件发布通知
pub async fn notify_material(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE
        .notify_material(&req, path.into_inner())
        .await
}

// 手动触发公告通知
pub async fn notify_announcement(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE
        .notify_announcement(&req, path.into_inner())
        .await
}

// 手动触发课业发布通知
pub async fn notify_classwork(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE
        .notify_classwork(&req, path.into_inner())
        .await
}

// 手动触发截止提醒
pub async fn notify_classwork_due_soon(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE
        .notify_classwork_due_soon(&req, path.into_inner())
        .await
}

// 手动触发教师分配通知
pub async fn notify_teacher_assigned(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE
        .notify_teacher_assigned(&req, path.into_inner())
        .await
}

// 配置路由
pub fn configure_notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .service(
                web::resource("/materials/{id}").route(web::post().to(notify_material)),
            )
            .service(
                web::resource("/announcements/{id}").route(web::post().to(notify_announcement)),
            )
            .service(web::resource("/classworks/{id}").route(web::post().to(notify_classwork)))
            .service(
                web::resource("/classworks/{id}/due-soon")
                    .route(web::post().to(notify_classwork_due_soon)),
            )
            .service(
                web::resource("/assignments/{id}/teacher")
                    .route(web::post().to(notify_teacher_assigned)),
            ),
    );
}
