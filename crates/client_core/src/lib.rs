use shared::{domain::GridSize, protocol::ClientRequest};
use tokio::sync::mpsc;
use tracing::debug;

pub mod error;
pub mod grid;
pub mod icons;
pub mod names;
pub mod session;
pub mod transport;

pub use error::{ChannelError, GridError};
pub use grid::{GridModel, SnapshotApplied};
pub use icons::{IconRegistry, SaveOutcome, DEFAULT_ICON_NAME};
pub use session::MatrixSession;
pub use transport::{spawn_channel, ChannelConfig, ChannelEvent, ChannelHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Notifications for whatever UI layer drives the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    GridResized(GridSize),
    GridRedrawn,
    IconsUpdated { count: usize },
    /// `None` clears the error shown next to the icon name field.
    IconNameError(Option<String>),
    /// The name field should take focus and select its text.
    FocusIconName,
    ConnectionChanged(ConnectionStatus),
}

/// Outbound half of the channel. Emission is fire-and-forget.
pub trait RequestSink {
    fn emit(&mut self, request: ClientRequest);
}

impl RequestSink for Vec<ClientRequest> {
    fn emit(&mut self, request: ClientRequest) {
        self.push(request);
    }
}

impl RequestSink for mpsc::UnboundedSender<ClientRequest> {
    fn emit(&mut self, request: ClientRequest) {
        let event = request.event_name();
        if self.send(request).is_err() {
            debug!(event, "channel task stopped; request dropped");
        }
    }
}
