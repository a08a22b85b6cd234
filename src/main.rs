use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ServiceExt,
    transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager},
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pollinations_rmcp::{Config, Dispatcher, PollinationsServer, Shutdown, Transport};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout belongs to the stdio transport
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(
        image_base = %config.image_base_url,
        text_base = %config.text_base_url,
        download_dir = %config.download_dir.display(),
        timeout_secs = config.request_timeout_secs,
        probe = config.probe_image_urls,
        "configuration loaded"
    );
    let dispatcher = Arc::new(Dispatcher::new(&config)?);

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.shutdown();
            }
        });
    }

    match config.transport {
        Transport::Stdio => serve_stdio(dispatcher, &shutdown).await,
        Transport::Http => serve_http(&config, dispatcher, &shutdown).await,
    }
}

async fn serve_stdio(dispatcher: Arc<Dispatcher>, shutdown: &Shutdown) -> Result<()> {
    let service = PollinationsServer::new(dispatcher)
        .serve_with_ct(rmcp::transport::stdio(), shutdown.token())
        .await?;
    info!("Pollinations MCP server running on stdio");
    let reason = service.waiting().await?;
    info!(?reason, "stdio transport closed");
    Ok(())
}

async fn serve_http(config: &Config, dispatcher: Arc<Dispatcher>, shutdown: &Shutdown) -> Result<()> {
    let bind_address = config.bind_address();
    let mcp_path = config.mcp_path();
    let service = StreamableHttpService::new(
        move || Ok(PollinationsServer::new(dispatcher.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service(&mcp_path, service);
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Pollinations MCP HTTP server started at http://{bind_address}{mcp_path}");

    let shutdown = shutdown.clone();
    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;
    info!("HTTP server stopped");
    Ok(())
}
