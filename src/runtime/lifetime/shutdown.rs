use tokio::signal;
use tracing::warn;

/// 等待退出信号
///
/// 容器/systemd 下发 SIGTERM，交互终端发 Ctrl+C，两者都触发优雅退出。
pub async fn listen_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};

        let mut sigterm =
            unix_signal(SignalKind::terminate()).expect("Failed to listen for SIGTERM");
        tokio::select! {
            _ = signal::ctrl_c() => warn!("SIGINT received, initiating graceful shutdown..."),
            _ = sigterm.recv() => warn!("SIGTERM received, initiating graceful shutdown..."),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        warn!("Shutdown signal received, initiating graceful shutdown...");
    }
}
