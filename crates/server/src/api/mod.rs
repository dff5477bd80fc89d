//! Painter request handling.
//!
//! Requests never get a correlated answer. Queries are answered to the
//! requesting connection only; every mutation is followed by a fresh snapshot
//! pushed to all connections.

use shared::{
    domain::PIXEL_ON,
    error::ApiError,
    protocol::{ClientRequest, ServerEvent},
};
use tracing::{debug, info};

use crate::app_state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Reply(ServerEvent),
    Broadcast(ServerEvent),
}

pub(crate) fn decode_request(text: &str) -> Result<ClientRequest, ApiError> {
    serde_json::from_str(text)
        .map_err(|err| ApiError::validation(format!("malformed request: {err}")))
}

pub(crate) async fn handle_request(state: &AppState, request: ClientRequest) -> Vec<Dispatch> {
    debug!(event = request.event_name(), "api: request");
    match request {
        ClientRequest::GetInitialState {} => vec![
            Dispatch::Reply(current_state(state).await),
            Dispatch::Reply(icons_list(state).await),
        ],
        ClientRequest::GetIcons {} => vec![Dispatch::Reply(icons_list(state).await)],
        ClientRequest::SetXy {
            x,
            y,
            value,
            toggle,
        } => {
            let applied = {
                let mut matrix = state.matrix.lock().await;
                match value {
                    Some(value) => matrix.set_xy(x, y, value),
                    None if toggle => matrix.toggle_xy(x, y),
                    None => matrix.set_xy(x, y, PIXEL_ON),
                }
            };
            if !applied {
                debug!(x, y, "api: set_xy outside grid ignored");
                return Vec::new();
            }
            vec![Dispatch::Broadcast(current_state(state).await)]
        }
        ClientRequest::SetFrame { frame } => {
            if let Err(err) = state.matrix.lock().await.set_frame(&frame) {
                return vec![Dispatch::Reply(ServerEvent::Error(err))];
            }
            vec![Dispatch::Broadcast(current_state(state).await)]
        }
        ClientRequest::Clear {} => {
            state.matrix.lock().await.clear();
            vec![Dispatch::Broadcast(current_state(state).await)]
        }
        ClientRequest::Fill {} => {
            state.matrix.lock().await.fill();
            vec![Dispatch::Broadcast(current_state(state).await)]
        }
        ClientRequest::SaveIcon { name, frame } => {
            let frame = if frame.is_empty() {
                state.matrix.lock().await.raw_frame()
            } else {
                frame
            };
            let saved = state.icons.lock().await.save(&name, &frame);
            match saved {
                Ok(_) => vec![Dispatch::Broadcast(icons_list(state).await)],
                Err(err) => vec![Dispatch::Reply(ServerEvent::Error(err))],
            }
        }
        ClientRequest::LoadIcon { name } => {
            let Some(frame) = state.icons.lock().await.load(&name) else {
                info!(%name, "api: load of unknown icon");
                return vec![Dispatch::Reply(ServerEvent::Error(ApiError::not_found(
                    format!("no icon named '{name}'"),
                )))];
            };
            if let Err(err) = state.matrix.lock().await.set_frame(&frame) {
                return vec![Dispatch::Reply(ServerEvent::Error(err))];
            }
            vec![Dispatch::Broadcast(current_state(state).await)]
        }
        ClientRequest::DeleteIcon { name } => {
            let removed = state.icons.lock().await.delete(&name);
            if removed {
                info!(%name, "api: icon deleted");
                vec![Dispatch::Broadcast(icons_list(state).await)]
            } else {
                Vec::new()
            }
        }
    }
}

async fn current_state(state: &AppState) -> ServerEvent {
    ServerEvent::StateUpdate(state.matrix.lock().await.state())
}

async fn icons_list(state: &AppState) -> ServerEvent {
    ServerEvent::IconsList(state.icons.lock().await.list_payload())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
