//! 邮件投递模块
//!
//! SMTP 传输（lettre）+ 有界队列 + 投递工作协程。调度循环只负责
//! 入队，阻塞的 SMTP 发送全部发生在工作协程里。

mod queue;
mod smtp;
pub mod templates;

pub use queue::{MailerHandle, MailerPool};
pub use smtp::SmtpMailer;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;

/// 待投递邮件：一个收件人一封
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// 邮件投递接口
///
/// `SmtpMailer` 直接发送；`MailerHandle` 入队后由工作协程发送。
/// 分发层只依赖这个 trait，测试用记录型实现替换。
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutboundEmail) -> Result<()>;
}

/// 按全局配置构建 SMTP 传输和投递队列
pub fn create_mailer_pool() -> MailerPool {
    let config = AppConfig::get();
    let transport: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(config.smtp.clone()));
    MailerPool::start(
        transport,
        config.mailer.workers,
        config.mailer.queue_capacity,
    )
}

#[cfg(test)]
pub(crate) mod testing {
    //! 测试辅助：记录型邮件实现

    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutboundEmail>>,
        pub fail_for: Option<String>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }

        /// 对指定收件人返回投递错误
        pub fn failing_for(address: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_for: Some(address.to_string()),
            }
        }

        pub fn recipients(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|m| m.to.clone())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutboundEmail) -> Result<()> {
            if self.fail_for.as_deref() == Some(mail.to.as_str()) {
                return Err(crate::errors::EduNotifyError::mail_transport(format!(
                    "refused: {}",
                    mail.to
                )));
            }
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }
}
