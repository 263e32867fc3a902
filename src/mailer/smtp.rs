//! SMTP 传输（lettre）

use std::time::Duration;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::PoolConfig;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use once_cell::sync::OnceCell;
use tracing::debug;

use super::{Mailer, OutboundEmail};
use crate::config::SmtpConfig;
use crate::errors::{EduNotifyError, Result};

/// lettre SMTP 邮件发送器
///
/// 传输在第一次发送时惰性构建；配置不完整时 send 返回 MailConfig
/// 错误而不是 panic，调度循环据此继续运行。
pub struct SmtpMailer {
    settings: SmtpConfig,
    transport: OnceCell<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(settings: SmtpConfig) -> Self {
        Self {
            settings,
            transport: OnceCell::new(),
        }
    }

    /// 校验必填配置：host/username/password/from_name
    fn validate(&self) -> Result<()> {
        if self.settings.host.trim().is_empty() {
            return Err(EduNotifyError::mail_config("SMTP host is not set"));
        }
        if self.settings.username.trim().is_empty() {
            return Err(EduNotifyError::mail_config("SMTP username is not set"));
        }
        if self.settings.password.trim().is_empty() {
            return Err(EduNotifyError::mail_config("SMTP password is not set"));
        }
        if self.settings.from_name.trim().is_empty() {
            return Err(EduNotifyError::mail_config("SMTP from_name is not set"));
        }
        Ok(())
    }

    /// 惰性构建 lettre 传输
    fn transport(&self) -> Result<&AsyncSmtpTransport<Tokio1Executor>> {
        self.transport.get_or_try_init(|| {
            self.validate()?;

            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.settings.host)
                    .port(self.settings.port)
                    .timeout(Some(Duration::from_secs(self.settings.timeout)))
                    .pool_config(PoolConfig::new().max_size(self.settings.pool_size));

            if self.settings.use_tls {
                let tls = TlsParameters::builder(self.settings.host.clone())
                    .build()
                    .map_err(|e| {
                        EduNotifyError::mail_config(format!("TLS configuration failed: {e}"))
                    })?;
                builder = builder.tls(Tls::Required(tls));
            } else {
                builder = builder.tls(Tls::None);
            }

            let credentials = Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            );
            builder = builder
                .credentials(credentials)
                .authentication(vec![Mechanism::Plain, Mechanism::Login]);

            Ok(builder.build())
        })
    }

    fn from_mailbox(&self) -> Result<Mailbox> {
        let address = self.settings.username.parse().map_err(|e| {
            EduNotifyError::mail_config(format!("SMTP from address is invalid: {e}"))
        })?;
        Ok(Mailbox::new(Some(self.settings.from_name.clone()), address))
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutboundEmail) -> Result<()> {
        let transport = self.transport()?;

        let to: Mailbox = mail.to.parse()?;
        let message = Message::builder()
            .from(self.from_mailbox()?)
            .to(to)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body)?;

        transport.send(message).await?;
        debug!("Mail sent to {} ({})", mail.to, mail.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpConfig;

    fn mail() -> OutboundEmail {
        OutboundEmail {
            to: "s1@school.edu".to_string(),
            subject: "Test".to_string(),
            html_body: "<p>Test</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_host_is_config_error_not_panic() {
        let mailer = SmtpMailer::new(SmtpConfig::default());

        let err = mailer.send(mail()).await.unwrap_err();
        assert_eq!(err.code(), "E004");
        assert!(err.message().contains("host"));
    }

    #[tokio::test]
    async fn test_missing_from_name_is_config_error() {
        let settings = SmtpConfig {
            host: "smtp.school.edu".to_string(),
            username: "notify@school.edu".to_string(),
            password: "secret".to_string(),
            ..SmtpConfig::default()
        };
        let mailer = SmtpMailer::new(settings);

        let err = mailer.send(mail()).await.unwrap_err();
        assert_eq!(err.code(), "E004");
        assert!(err.message().contains("from_name"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_validation_error() {
        let settings = SmtpConfig {
            host: "smtp.school.edu".to_string(),
            username: "notify@school.edu".to_string(),
            password: "secret".to_string(),
            from_name: "EduNotify".to_string(),
            use_tls: false,
            ..SmtpConfig::default()
        };
        let mailer = SmtpMailer::new(settings);

        let err = mailer
            .send(OutboundEmail {
                to: "not an address".to_string(),
                ..mail()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E008");
    }
}
