pub mod common;

pub mod classworks;
pub mod notifications;
pub mod sections;
pub mod submissions;
pub mod users;

pub use common::response::{ApiResponse, ErrorCode};

/// 程序启动时间（用于健康检查的运行时长）
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
