use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mauzo_core::forecast::ForecastEngine;
use mauzo_core::time::{Clock, SystemClock};

mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = mauzo_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let shop_offset = settings.utc_offset()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(shop_offset));
    let engine = ForecastEngine::with_options(clock, settings.forecast_options());

    let state = routes::AppState {
        engine: Arc::new(engine),
        shop_offset,
        default_horizon_days: settings.default_horizon_days,
        max_horizon_days: settings.max_horizon_days,
    };

    let app = routes::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(
        %addr,
        %shop_offset,
        duplicate_policy = settings.duplicate_policy.as_str(),
        legacy_fallback_flag = settings.legacy_fallback_flag,
        "api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &mauzo_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
