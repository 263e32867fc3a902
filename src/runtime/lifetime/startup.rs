use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::mailer::{Mailer, MailerPool, create_mailer_pool};
use crate::storage::Storage;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub mailer: Arc<dyn Mailer>,
    pub mailer_pool: MailerPool,
}

/// 检查 SMTP 必填项，缺了只告警不终止
///
/// 发送路径会对不完整配置返回 MailConfig 错误，调度循环照常跑。
fn check_smtp_config() {
    let smtp = &AppConfig::get().smtp;
    let mut missing = Vec::new();
    if smtp.host.trim().is_empty() {
        missing.push("host");
    }
    if smtp.username.trim().is_empty() {
        missing.push("username");
    }
    if smtp.password.trim().is_empty() {
        missing.push("password");
    }
    if smtp.from_name.trim().is_empty() {
        missing.push("from_name");
    }
    if !missing.is_empty() {
        warn!(
            "SMTP configuration incomplete (missing: {}), mail delivery will fail until configured",
            missing.join(", ")
        );
    }
}

/// 准备服务器启动的上下文
/// 包括存储和邮件投递队列
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    check_smtp_config();

    // 创建邮件投递队列
    let mailer_pool = create_mailer_pool();
    let mailer: Arc<dyn Mailer> = Arc::new(mailer_pool.handle());
    warn!("Mailer pool started");

    StartupContext {
        storage,
        mailer,
        mailer_pool,
    }
}
