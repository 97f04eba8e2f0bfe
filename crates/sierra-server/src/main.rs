mod api;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sierra_core::{Clock, FetchStrategy, SystemClock, TtlCache};
use sierra_fetch::{DirectFetcher, PageFetcher, RenderFetcher};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(sierra_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let direct = DirectFetcher::new(
        config.fetch_timeout_secs,
        &config.user_agent,
        &config.inventory_base_url,
    )?;
    let page_fetcher = match config.fetch_strategy {
        FetchStrategy::Direct => PageFetcher::Direct(direct.clone()),
        FetchStrategy::Render => {
            let api_key = config
                .render_api_key
                .as_deref()
                .context("SIERRA_RENDER_API_KEY is required for the render strategy")?;
            PageFetcher::Render(RenderFetcher::new(
                config.fetch_timeout_secs,
                &config.user_agent,
                &config.render_base_url,
                api_key,
            )?)
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState {
        page_fetcher: Arc::new(page_fetcher),
        inventory_fetcher: Arc::new(direct),
        product_cache: Arc::new(TtlCache::new(config.product_ttl_secs, clock.clone())),
        inventory_cache: Arc::new(TtlCache::new(config.inventory_ttl_secs, clock.clone())),
        clock,
        config: Arc::clone(&config),
    };
    let app = build_app(state);

    tracing::info!(addr = %config.bind_addr, strategy = %config.fetch_strategy, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
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
