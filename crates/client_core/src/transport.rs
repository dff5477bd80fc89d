//! WebSocket adapter between a [`crate::MatrixSession`] and the authority.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use shared::protocol::{ClientRequest, ServerEvent};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ChannelError;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub server_url: String,
    pub reconnect_delay: Duration,
}

impl ChannelConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    Message(ServerEvent),
}

pub struct ChannelHandle {
    pub requests: mpsc::UnboundedSender<ClientRequest>,
    pub events: mpsc::UnboundedReceiver<ChannelEvent>,
    pub task: JoinHandle<()>,
}

/// Maps an `http(s)://host[:port]` server address to its `ws(s)://.../ws`
/// endpoint. WebSocket URLs are accepted as-is apart from the path.
pub fn websocket_url(server_url: &str) -> Result<Url, ChannelError> {
    let mut url = Url::parse(server_url).map_err(|source| ChannelError::InvalidUrl {
        url: server_url.to_string(),
        source,
    })?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(ChannelError::UnsupportedScheme(server_url.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| ChannelError::UnsupportedScheme(server_url.to_string()))?;
    url.set_path("/ws");
    url.set_query(None);
    Ok(url)
}

/// Starts the connection task. It reconnects forever with a fixed delay until
/// the returned event receiver is dropped.
pub fn spawn_channel(config: ChannelConfig) -> Result<ChannelHandle, ChannelError> {
    let url = websocket_url(&config.server_url)?;
    let (requests, requests_rx) = mpsc::unbounded_channel();
    let (events_tx, events) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_channel(
        url,
        config.reconnect_delay,
        requests_rx,
        events_tx,
    ));
    Ok(ChannelHandle {
        requests,
        events,
        task,
    })
}

async fn run_channel(
    url: Url,
    reconnect_delay: Duration,
    mut requests_rx: mpsc::UnboundedReceiver<ClientRequest>,
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
) {
    while !events_tx.is_closed() {
        match connect_async(url.as_str()).await {
            Ok((ws_stream, _)) => {
                // Anything queued while offline is superseded by the resync.
                while let Ok(stale) = requests_rx.try_recv() {
                    debug!(event = stale.event_name(), "channel: dropping request queued offline");
                }
                info!(%url, "channel: connected");
                if events_tx.send(ChannelEvent::Connected).is_err() {
                    return;
                }

                let (mut ws_writer, mut ws_reader) = ws_stream.split();
                loop {
                    tokio::select! {
                        request = requests_rx.recv() => {
                            let Some(request) = request else {
                                let _ = ws_writer.close().await;
                                return;
                            };
                            let text = match serde_json::to_string(&request) {
                                Ok(text) => text,
                                Err(err) => {
                                    warn!(event = request.event_name(), %err, "channel: failed to encode request");
                                    continue;
                                }
                            };
                            if let Err(err) = ws_writer.send(Message::Text(text)).await {
                                warn!(%err, "channel: websocket send failed");
                                break;
                            }
                        }
                        frame = ws_reader.next() => match frame {
                            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerEvent>(&text) {
                                Ok(event) => {
                                    if events_tx.send(ChannelEvent::Message(event)).is_err() {
                                        return;
                                    }
                                }
                                Err(err) => warn!(%err, "channel: invalid server event"),
                            },
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                warn!(%err, "channel: websocket receive failed");
                                break;
                            }
                        },
                    }
                }

                warn!(%url, "channel: disconnected");
                if events_tx.send(ChannelEvent::Disconnected).is_err() {
                    return;
                }
            }
            Err(err) => {
                debug!(%url, %err, "channel: connect failed");
            }
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
