use anyhow::Context as _;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::oneshot;

pub mod engine;
mod error;
mod mapping;
pub mod server;

const DEFAULT_WEB_DIST_DIR: &str = "web/dist";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Load the demo workspace on startup.
    pub seed_demo: bool,
    /// Static client build served for every path outside `/api`.
    pub web_dist_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            seed_demo: true,
            web_dist_dir: PathBuf::from(DEFAULT_WEB_DIST_DIR),
        }
    }
}

impl ServerConfig {
    /// Reads `VIBE_SERVER_ADDR`, `VIBE_SEED_DEMO` and `VIBE_WEB_DIST_DIR`.
    /// Unset or blank values keep their defaults; an unparsable address is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut out = Self::default();

        if let Some(addr) = env_value("VIBE_SERVER_ADDR") {
            out.addr = addr
                .parse()
                .with_context(|| format!("invalid VIBE_SERVER_ADDR {addr:?}"))?;
        }

        out.seed_demo = !env_value("VIBE_SEED_DEMO").is_some_and(|seed| {
            matches!(
                seed.to_ascii_lowercase().as_str(),
                "0" | "false" | "off" | "no"
            )
        });

        if let Some(dir) = env_value("VIBE_WEB_DIST_DIR") {
            out.web_dist_dir = PathBuf::from(dir);
        }

        Ok(out)
    }

    /// An empty store on an ephemeral port, for tests that need exact counts.
    pub fn empty() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            seed_demo: false,
            ..Self::default()
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// A running server. Dropping it aborts the server task; `shutdown` lets
/// in-flight requests finish first.
pub struct StartedServer {
    pub addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<anyhow::Result<()>>>,
}

impl StartedServer {
    /// Runs until the server stops on its own or its shutdown signal fires.
    pub async fn wait(mut self) -> anyhow::Result<()> {
        let handle = self.handle.take().context("server task already consumed")?;
        handle
            .await
            .context("server task panicked")?
            .context("server failed")?;
        Ok(())
    }

    /// Stops accepting connections and waits for open ones to drain.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(stop) = self.stop.take() {
            // The task may already be gone; `wait` reports why.
            let _ = stop.send(());
        }
        self.wait().await
    }
}

impl Drop for StartedServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<StartedServer> {
    start_server_until(config, std::future::pending()).await
}

/// Like [`start_server`], but also shuts down gracefully once `signal` resolves.
pub async fn start_server_until<F>(config: ServerConfig, signal: F) -> anyhow::Result<StartedServer>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.addr;
    let app: Router = server::router(config).await?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let actual = listener.local_addr().context("failed to read local addr")?;

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = stopped => {}
                    () = signal => {}
                }
                tracing::info!("shutting down");
            })
            .await
            .context("server failed")?;
        Ok(())
    });

    Ok(StartedServer {
        addr: actual,
        stop: Some(stop),
        handle: Some(handle),
    })
}
