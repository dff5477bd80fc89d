use std::{net::SocketAddr, sync::Arc};

use anyhow::{bail, Context};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use shared::protocol::ServerEvent;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod icon_store;
mod matrix;

use api::{decode_request, handle_request, Dispatch};
use app_state::{AppState, Outbound};
use config::{load_settings, prepare_icons_path};
use icon_store::IconStore;
use matrix::MatrixCore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let size = settings.grid_size();
    if size.checked_cell_count().is_none() {
        bail!(
            "matrix dimensions {}x{} are empty or too large",
            size.width,
            size.height
        );
    }
    let icons_path = prepare_icons_path(&settings.icons_path)?;
    let icons = IconStore::open(icons_path, size);
    info!(
        width = size.width,
        height = size.height,
        icons_path = %icons.path().display(),
        "matrix authority ready"
    );

    let state = AppState::new(MatrixCore::new(size), icons);
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/pixels", get(pixels_gs3))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Current frame for the device bridge, as produced by `MatrixCore::csv_gs3`.
async fn pixels_gs3(State(state): State<Arc<AppState>>) -> String {
    state.matrix.lock().await.csv_gs3()
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

async fn ws_connection(state: Arc<AppState>, socket: WebSocket) {
    let connection = state.connection_id();
    let (mut sender, mut receiver) = socket.split();
    // Replies and broadcasts share one stream, in the order the matrix changed.
    let mut outbound = BroadcastStream::new(state.events.subscribe());

    let send_task = tokio::spawn(async move {
        while let Some(item) = outbound.next().await {
            let event = match item {
                Ok(Outbound { target, event }) => {
                    if target.is_some_and(|id| id != connection) {
                        continue;
                    }
                    event
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(connection, skipped, "ws: client lagging, events skipped");
                    continue;
                }
            };
            let text = match serde_json::to_string(&event) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let _turn = state.turn.lock().await;
        match decode_request(&text) {
            Ok(request) => {
                for dispatch in handle_request(&state, request).await {
                    state.publish(connection, dispatch);
                }
            }
            Err(err) => {
                warn!(connection, %err, "ws: rejecting request");
                state.publish(connection, Dispatch::Reply(ServerEvent::Error(err)));
            }
        }
    }

    send_task.abort();
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
