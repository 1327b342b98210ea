use std::future::Future;
use std::io;

use tokio_util::sync::CancellationToken;

/// Wait for a console stop request and return its name.
#[cfg(target_os = "windows")]
pub async fn stop_signal() -> io::Result<&'static str> {
    let mut ctrl_break = tokio::signal::windows::ctrl_break()?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| "Ctrl+C"),
        _ = ctrl_break.recv() => Ok("Ctrl+Break"),
    }
}

#[cfg(not(target_os = "windows"))]
pub async fn stop_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "Ctrl+C")
}

/// Cancel `token` once `signal` fires. A listener that fails to install leaves the token alone.
pub async fn cancel_on<F>(signal: F, token: CancellationToken)
where
    F: Future<Output = io::Result<&'static str>>,
{
    match signal.await {
        Ok(name) => {
            log::info!("Received {}, finishing up", name);
            token.cancel();
        }
        Err(e) => log::error!("Failed to listen for stop signals: {}", e),
    }
}
