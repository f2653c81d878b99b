mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use mlscrape_scraper::{FetcherConfig, Marketplace};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState, LoadTestSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = mlscrape_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if config.proxy.is_none() {
        tracing::warn!("PROXY_HOST not set; marketplace requests go out directly");
    }

    let marketplace = Marketplace::from_config(FetcherConfig::from_app_config(&config))?;
    let load_test_client = reqwest::Client::builder()
        .no_proxy()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let app = build_app(AppState {
        marketplace: Arc::new(marketplace),
        load_test: LoadTestSettings {
            enabled: config.test_mode,
            base_url: config.load_test_base_url.clone(),
            requests: config.load_test_requests,
            client: load_test_client,
        },
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        test_mode = config.test_mode,
        "server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
