use std::sync::atomic::{AtomicU64, Ordering};

use shared::protocol::ServerEvent;
use tokio::sync::{broadcast, Mutex};

use crate::{api::Dispatch, icon_store::IconStore, matrix::MatrixCore};

/// One item on the shared outbound stream. `target: None` goes to every
/// connection; `Some(id)` only to that connection.
#[derive(Debug, Clone)]
pub(crate) struct Outbound {
    pub(crate) target: Option<u64>,
    pub(crate) event: ServerEvent,
}

pub(crate) struct AppState {
    pub(crate) matrix: Mutex<MatrixCore>,
    pub(crate) icons: Mutex<IconStore>,
    pub(crate) events: broadcast::Sender<Outbound>,
    /// Held while a request is handled and its results are published, so the
    /// outbound stream follows the order in which the matrix changed.
    pub(crate) turn: Mutex<()>,
    next_connection: AtomicU64,
}

impl AppState {
    pub(crate) fn new(matrix: MatrixCore, icons: IconStore) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            matrix: Mutex::new(matrix),
            icons: Mutex::new(icons),
            events,
            turn: Mutex::new(()),
            next_connection: AtomicU64::new(1),
        }
    }

    pub(crate) fn connection_id(&self) -> u64 {
        self.next_connection.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn publish(&self, connection: u64, dispatch: Dispatch) {
        let outbound = match dispatch {
            Dispatch::Reply(event) => Outbound {
                target: Some(connection),
                event,
            },
            Dispatch::Broadcast(event) => Outbound {
                target: None,
                event,
            },
        };
        // No receivers only means no connection is open.
        let _ = self.events.send(outbound);
    }
}
