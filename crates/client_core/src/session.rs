use shared::{
    domain::GridSize,
    protocol::{ClientRequest, ServerEvent},
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    error::GridError,
    grid::GridModel,
    icons::{IconRegistry, SaveOutcome},
    transport::ChannelEvent,
    ClientEvent, ConnectionStatus, RequestSink,
};

/// One painter session: the grid, the icon registry, and the outbound pipe
/// they both write to.
///
/// Driven from a single loop; every inbound event and user action is handled
/// to completion before the next one.
pub struct MatrixSession<S: RequestSink> {
    grid: GridModel,
    icons: IconRegistry,
    status: ConnectionStatus,
    sink: S,
    events: broadcast::Sender<ClientEvent>,
}

impl<S: RequestSink> MatrixSession<S> {
    pub fn new(size: GridSize, sink: S) -> Result<Self, GridError> {
        let (events, _) = broadcast::channel(256);
        Ok(Self {
            grid: GridModel::initialize(size, events.clone())?,
            icons: IconRegistry::new(events.clone()),
            status: ConnectionStatus::Connecting,
            sink,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn icons(&self) -> &IconRegistry {
        &self.icons
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => self.on_connected(),
            ChannelEvent::Disconnected => self.on_disconnected(),
            ChannelEvent::Message(event) => self.handle_server_event(event),
        }
    }

    /// Resync: the authority does not push on connect, so ask for both
    /// snapshots every time the link comes (back) up.
    pub fn on_connected(&mut self) {
        if self.status == ConnectionStatus::Connected {
            return;
        }
        info!("session: connected, requesting state and icons");
        self.set_status(ConnectionStatus::Connected);
        self.sink.emit(ClientRequest::GetInitialState {});
        self.sink.emit(ClientRequest::GetIcons {});
    }

    pub fn on_disconnected(&mut self) {
        if self.status == ConnectionStatus::Disconnected {
            return;
        }
        warn!("session: disconnected");
        self.set_status(ConnectionStatus::Disconnected);
    }

    pub fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::StateUpdate(snapshot) => {
                if let Err(err) = self.grid.apply_remote_snapshot(snapshot) {
                    debug!(%err, "session: ignoring malformed state_update");
                }
            }
            ServerEvent::IconsList(items) => {
                debug!(count = items.len(), "session: icons list replaced");
                self.icons.replace_list(items);
            }
            ServerEvent::Error(err) => {
                warn!(code = ?err.code, message = %err.message, "session: authority reported error");
            }
        }
    }

    pub fn toggle(&mut self, x: usize, y: usize) -> Result<u8, GridError> {
        self.grid.toggle_local(x, y, &mut self.sink)
    }

    pub fn clear(&mut self) {
        self.grid.request_clear(&mut self.sink);
    }

    pub fn fill(&mut self) {
        self.grid.request_fill(&mut self.sink);
    }

    pub fn edit_icon_name(&mut self, text: impl Into<String>) {
        self.icons.edit_name(text);
    }

    pub fn save_icon(&mut self, candidate: &str) -> SaveOutcome {
        self.icons.request_save(candidate, &self.grid, &mut self.sink)
    }

    pub fn load_icon(&mut self, name: &str) {
        self.icons.request_load(name, &mut self.sink);
    }

    pub fn delete_icon(&mut self, name: &str) {
        self.icons.request_delete(name, &mut self.sink);
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
        let _ = self.events.send(ClientEvent::ConnectionChanged(status));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
