use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::notifications::responses::SweepStatusResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{SweepRun, SweepService};

fn sweep_service(req: &HttpRequest) -> Arc<SweepService> {
    req.app_data::<web::Data<Arc<SweepService>>>()
        .expect("SweepService not found in app data")
        .get_ref()
        .clone()
}

// 手动执行一轮扫描
//
// 与定时路径共用重入保护；定时路径吞错误，这里把结果交还调用方。
pub async fn run_sweep(req: HttpRequest) -> ActixResult<HttpResponse> {
    let service = sweep_service(&req);

    match service.run().await {
        SweepRun::Completed(report) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(report, "扫描完成")))
        }
        SweepRun::AlreadyRunning => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::Conflict,
            "上一轮扫描尚未结束",
        ))),
    }
}

// 查询扫描状态
pub async fn sweep_status(req: HttpRequest) -> ActixResult<HttpResponse> {
    let service = sweep_service(&req);

    let status = SweepStatusResponse {
        running: service.is_running(),
        last_run: service.last_run().await,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(status, "查询成功")))
}

// 配置路由
pub fn configure_sweep_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sweep")
            .service(web::resource("/run").route(web::post().to(run_sweep)))
            .service(web::resource("/status").route(web::get().to(sweep_status))),
    );
}
