use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = vibe_server::ServerConfig::from_env()?;
    tracing::info!(
        seed_demo = config.seed_demo,
        web_dist_dir = %config.web_dist_dir.display(),
        "starting vibe_server"
    );

    let server = vibe_server::start_server_until(config, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    })
    .await?;
    tracing::info!(addr = %server.addr, "vibe_server listening");
    server.wait().await
}
