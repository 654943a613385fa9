//! Bingo admin back-office entrypoint wiring REST, SSE and the storage supervisor.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bingo_admin_back::{
    config::{AppConfig, StoreBackend},
    dao::{
        game_store::{GameStore, memory::InMemoryGameStore},
        storage::StorageError,
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());
    spawn_storage(app_state.clone(), StoreBackend::from_env()).await;

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

/// Install the selected storage backend, supervising remote ones in the background.
async fn spawn_storage(state: SharedState, backend: StoreBackend) {
    match backend {
        StoreBackend::Memory => {
            warn!("using the in-memory store; data is lost on restart");
            state.set_game_store(Arc::new(InMemoryGameStore::new())).await;
        }
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            use bingo_admin_back::dao::game_store::mongodb::{MongoConfig, MongoGameStore};

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoGameStore::connect(config).await?;
                Ok::<Arc<dyn GameStore>, StorageError>(Arc::new(store))
            }));
        }
        #[cfg(feature = "rest-store")]
        StoreBackend::PostgRest => {
            use bingo_admin_back::dao::game_store::postgrest::{RestConfig, RestGameStore};

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = RestConfig::from_env()?;
                let store = RestGameStore::connect(config).await?;
                Ok::<Arc<dyn GameStore>, StorageError>(Arc::new(store))
            }));
        }
        #[allow(unreachable_patterns)]
        other => {
            warn!(backend = ?other, "storage backend not compiled in; staying degraded");
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
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

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
