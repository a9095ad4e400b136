use anyhow::Result;

/// Resolves on SIGINT/SIGTERM (Ctrl-C on other platforms).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("shutdown: SIGTERM"),
            _ = sigint.recv() => tracing::info!("shutdown: SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("shutdown: Ctrl-C");
    }

    Ok(())
}
