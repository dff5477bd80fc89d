use shared::{domain::IconRecord, protocol::ClientRequest};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    grid::GridModel,
    names::{is_name_space, normalize_name},
    ClientEvent, RequestSink,
};

/// Name submitted when the name field is empty or whitespace-only.
pub const DEFAULT_ICON_NAME: &str = "icon";

/// Result of a save attempt. Both outcomes leave the registry idle again;
/// a stored icon only shows up through the next `icons_list` push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Rejected { name: String },
    Submitted { name: String },
}

pub fn duplicate_name_message(name: &str) -> String {
    format!("An icon named \u{201c}{name}\u{201d} already exists. Choose another name.")
}

/// Client-side mirror of the authority's icon list plus the save form state.
pub struct IconRegistry {
    items: Vec<IconRecord>,
    draft_name: String,
    name_error: Option<String>,
    events: broadcast::Sender<ClientEvent>,
}

impl IconRegistry {
    pub fn new(events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            items: Vec::new(),
            draft_name: String::new(),
            name_error: None,
            events,
        }
    }

    pub fn items(&self) -> &[IconRecord] {
        &self.items
    }

    pub fn draft_name(&self) -> &str {
        &self.draft_name
    }

    pub fn name_error(&self) -> Option<&str> {
        self.name_error.as_deref()
    }

    pub fn replace_list(&mut self, items: Vec<IconRecord>) {
        self.items = items;
        let _ = self.events.send(ClientEvent::IconsUpdated {
            count: self.items.len(),
        });
        if !self.name_collides(&self.draft_name) {
            self.set_name_error(None);
        }
    }

    pub fn name_collides(&self, candidate: &str) -> bool {
        let candidate = normalize_name(candidate);
        self.items
            .iter()
            .any(|item| normalize_name(&item.name) == candidate)
    }

    /// Records the current contents of the name field. Clears a duplicate
    /// error once the text stops colliding, never raises one.
    pub fn edit_name(&mut self, text: impl Into<String>) {
        self.draft_name = text.into();
        if !self.name_collides(&self.draft_name) {
            self.set_name_error(None);
        }
    }

    pub fn request_save(
        &mut self,
        candidate: &str,
        grid: &GridModel,
        sink: &mut impl RequestSink,
    ) -> SaveOutcome {
        let trimmed = candidate.trim_matches(is_name_space);
        let name = if trimmed.is_empty() {
            DEFAULT_ICON_NAME
        } else {
            trimmed
        }
        .to_string();

        if self.name_collides(&name) {
            debug!(%name, "icons: save blocked, name already exists");
            self.draft_name = candidate.to_string();
            self.set_name_error(Some(duplicate_name_message(&name)));
            let _ = self.events.send(ClientEvent::FocusIconName);
            return SaveOutcome::Rejected { name };
        }

        self.set_name_error(None);
        info!(%name, "icons: requesting save");
        sink.emit(ClientRequest::SaveIcon {
            name: name.clone(),
            frame: grid.frame(),
        });
        self.draft_name = name.clone();
        SaveOutcome::Submitted { name }
    }

    pub fn request_load(&self, name: &str, sink: &mut impl RequestSink) {
        sink.emit(ClientRequest::LoadIcon {
            name: name.to_string(),
        });
    }

    pub fn request_delete(&self, name: &str, sink: &mut impl RequestSink) {
        sink.emit(ClientRequest::DeleteIcon {
            name: name.to_string(),
        });
    }

    fn set_name_error(&mut self, error: Option<String>) {
        if self.name_error == error {
            return;
        }
        self.name_error = error;
        let _ = self
            .events
            .send(ClientEvent::IconNameError(self.name_error.clone()));
    }
}

#[cfg(test)]
#[path = "tests/icons_tests.rs"]
mod tests;
