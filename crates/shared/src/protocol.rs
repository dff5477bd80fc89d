use serde::{Deserialize, Serialize};

use crate::{
    domain::{Frame, IconRecord, StateSnapshot},
    error::ApiError,
};

/// Messages sent from a painter client to the matrix authority.
///
/// Each message travels as one text frame shaped
/// `{"type": "<event name>", "payload": {...}}`. Empty payloads are still sent
/// as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientRequest {
    GetInitialState {},
    GetIcons {},
    /// Without `value` the authority flips the cell when `toggle` is set and
    /// lights it otherwise.
    SetXy {
        x: usize,
        y: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<u8>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        toggle: bool,
    },
    SetFrame {
        frame: Frame,
    },
    Clear {},
    Fill {},
    SaveIcon {
        name: String,
        frame: Frame,
    },
    LoadIcon {
        name: String,
    },
    DeleteIcon {
        name: String,
    },
}

impl ClientRequest {
    pub fn set_xy(x: usize, y: usize, value: u8) -> Self {
        Self::SetXy {
            x,
            y,
            value: Some(value),
            toggle: false,
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::GetInitialState {} => "get_initial_state",
            Self::GetIcons {} => "get_icons",
            Self::SetXy { .. } => "set_xy",
            Self::SetFrame { .. } => "set_frame",
            Self::Clear {} => "clear",
            Self::Fill {} => "fill",
            Self::SaveIcon { .. } => "save_icon",
            Self::LoadIcon { .. } => "load_icon",
            Self::DeleteIcon { .. } => "delete_icon",
        }
    }
}

/// Messages pushed by the matrix authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    StateUpdate(StateSnapshot),
    IconsList(Vec<IconRecord>),
    Error(ApiError),
}
