//! 有界投递队列与工作协程池
//!
//! 队列满时入队等待（背压），不丢弃任务。关闭时先关队列再排空
//! 剩余邮件，保证进程退出前已入队的邮件都被尝试投递。

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Mailer, OutboundEmail};
use crate::errors::{EduNotifyError, Result};

/// 投递队列的发送端
///
/// 实现 `Mailer`：send 即入队，实际投递由工作协程完成。
#[derive(Clone)]
pub struct MailerHandle {
    tx: mpsc::Sender<OutboundEmail>,
}

#[async_trait::async_trait]
impl Mailer for MailerHandle {
    async fn send(&self, mail: OutboundEmail) -> Result<()> {
        self.tx
            .send(mail)
            .await
            .map_err(|_| EduNotifyError::mail_queue("Mail queue is closed"))
    }
}

/// 投递工作协程池
pub struct MailerPool {
    tx: mpsc::Sender<OutboundEmail>,
    workers: Vec<JoinHandle<()>>,
}

impl MailerPool {
    /// 启动 worker 个投递协程，队列容量 capacity
    pub fn start(transport: Arc<dyn Mailer>, workers: usize, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<OutboundEmail>(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..workers.max(1))
            .map(|worker_id| {
                let rx = rx.clone();
                let transport = transport.clone();
                tokio::spawn(async move {
                    loop {
                        // 锁只覆盖 recv，发送期间其他 worker 可以继续取任务
                        let job = { rx.lock().await.recv().await };
                        let Some(mail) = job else {
                            break;
                        };

                        let to = mail.to.clone();
                        let subject = mail.subject.clone();
                        match transport.send(mail).await {
                            Ok(()) => debug!("Mail delivered to {} ({})", to, subject),
                            // 单封失败只记录，不影响队列里其他邮件
                            Err(e) => warn!("Mail delivery to {} failed ({}): {}", to, subject, e),
                        }
                    }
                    debug!("Mail worker {} exited", worker_id);
                })
            })
            .collect();

        Self { tx, workers }
    }

    /// 获取入队句柄
    pub fn handle(&self) -> MailerHandle {
        MailerHandle {
            tx: self.tx.clone(),
        }
    }

    /// 关闭队列并等待剩余邮件投递完成
    pub async fn shutdown(self) {
        drop(self.tx);
        futures_util::future::join_all(self.workers).await;
        debug!("Mailer pool drained and stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::RecordingMailer;
    use super::*;

    #[tokio::test]
    async fn test_pool_delivers_queued_mail_before_shutdown() {
        let recorder = Arc::new(RecordingMailer::new());
        let pool = MailerPool::start(recorder.clone(), 2, 8);
        let handle = pool.handle();

        for i in 0..5 {
            handle
                .send(OutboundEmail {
                    to: format!("s{i}@school.edu"),
                    subject: "Hello".to_string(),
                    html_body: "<p>Hi</p>".to_string(),
                })
                .await
                .unwrap();
        }

        pool.shutdown().await;

        let mut recipients = recorder.recipients();
        recipients.sort();
        assert_eq!(recipients.len(), 5);
        assert_eq!(recipients[0], "s0@school.edu");
    }

    #[tokio::test]
    async fn test_send_after_shutdown_is_queue_error() {
        let recorder = Arc::new(RecordingMailer::new());
        let pool = MailerPool::start(recorder, 1, 1);
        let handle = pool.handle();
        pool.shutdown().await;

        let err = handle
            .send(OutboundEmail {
                to: "s1@school.edu".to_string(),
                subject: "Hello".to_string(),
                html_body: "<p>Hi</p>".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_one_failed_delivery_does_not_stop_workers() {
        let recorder = Arc::new(RecordingMailer::failing_for("bad@school.edu"));
        let pool = MailerPool::start(recorder.clone(), 1, 8);
        let handle = pool.handle();

        for to in ["ok1@school.edu", "bad@school.edu", "ok2@school.edu"] {
            handle
                .send(OutboundEmail {
                    to: to.to_string(),
                    subject: "Hello".to_string(),
                    html_body: "<p>Hi</p>".to_string(),
                })
                .await
                .unwrap();
        }
        pool.shutdown().await;

        let recipients = recorder.recipients();
        assert_eq!(recipients, vec!["ok1@school.edu", "ok2@school.edu"]);
    }
}
