//! Tap rally backend entrypoint wiring the room store, REST routes and WebSocket channels.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tap_rally_back::{
    build_router,
    config::AppConfig,
    dao::room_store::{MemoryRoomStore, RoomStore},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = connect_store().await?;
    let app = build_router(AppState::new(config, store));

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the room store named by `ROOM_STORE` (`couch`, `mongo` or `memory`).
async fn connect_store() -> anyhow::Result<Arc<dyn RoomStore>> {
    let backend = env::var("ROOM_STORE").unwrap_or_default().to_lowercase();
    match backend.as_str() {
        #[cfg(feature = "couch-store")]
        "couch" => {
            use tap_rally_back::dao::room_store::couchdb::{CouchConfig, CouchRoomStore};

            let config = CouchConfig::from_env().context("reading CouchDB settings")?;
            let store = CouchRoomStore::connect(config)
                .await
                .context("connecting to CouchDB")?;
            info!("using CouchDB room store");
            Ok(Arc::new(store))
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use tap_rally_back::dao::room_store::mongodb::{MongoConfig, MongoRoomStore};

            let config = MongoConfig::from_env()
                .await
                .context("reading MongoDB settings")?;
            let store = MongoRoomStore::connect(config)
                .await
                .context("connecting to MongoDB")?;
            info!("using MongoDB room store");
            Ok(Arc::new(store))
        }
        "" | "memory" => {
            warn!("using in-memory room store; rooms will not survive a restart");
            Ok(Arc::new(MemoryRoomStore::new()))
        }
        other => anyhow::bail!("unsupported ROOM_STORE `{other}`"),
    }
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
