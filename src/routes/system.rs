use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::notifications::responses::HealthResponse;
use crate::models::{ApiResponse, AppStartTime};

// 健康检查
pub async fn health(req: HttpRequest) -> ActixResult<HttpResponse> {
    let uptime_seconds = req
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| {
            chrono::Utc::now()
                .signed_duration_since(start.start_datetime)
                .num_seconds()
        })
        .unwrap_or(0);

    let health = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(health, "查询成功")))
}

// 配置路由
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/system").service(web::resource("/health").route(web::get().to(health))),
    );
}
