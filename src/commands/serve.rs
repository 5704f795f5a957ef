use anyhow::{Context, Result};

use trendscope::config::Config;
use trendscope::server::DashboardServer;

/// Start the dashboard server and run until Ctrl+C
pub async fn serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind
            .parse()
            .with_context(|| format!("Invalid bind address: {bind}"))?;
    }

    let addr = config.server.bind_address;
    let server = DashboardServer::new(config).context("Failed to create dashboard server")?;

    println!("Dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop");

    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
            }
        })
        .await
        .context("Dashboard server failed")?;

    Ok(())
}
