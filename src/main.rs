//! Touchline Back binary entrypoint wiring the booking wizard REST surface.

use std::{env, net::SocketAddr};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use config::{AppConfig, BackendMode};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_config = AppConfig::load();

    #[cfg(feature = "rest-store")]
    let rest_config = dao::booking_store::rest::RestConfig::from_env();
    #[cfg(not(feature = "rest-store"))]
    let rest_config: Option<()> = None;

    let backend_mode = if rest_config.is_some() {
        BackendMode::Configured
    } else {
        info!("no booking backend configured; running on heuristic fallbacks");
        BackendMode::Unconfigured
    };

    let app_state = AppState::new(app_config, backend_mode);

    #[cfg(feature = "rest-store")]
    if let Some(rest_config) = rest_config {
        use std::sync::Arc;

        use dao::booking_store::{BookingStore, rest::RestBookingStore};

        let supervisor_state = app_state.clone();
        tokio::spawn(services::storage_supervisor::run(
            supervisor_state,
            move || {
                let config = rest_config.clone();
                async move {
                    let store = RestBookingStore::connect(config).await?;
                    Ok(Arc::new(store) as Arc<dyn BookingStore>)
                }
            },
        ));
    }

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
