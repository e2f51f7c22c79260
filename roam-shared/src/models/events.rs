use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::Profile;

/// Row-level change pushed for a watched profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ProfileChange {
    Updated(Profile),
    Deleted(Uuid),
}

impl ProfileChange {
    pub fn profile_id(&self) -> Uuid {
        match self {
            ProfileChange::Updated(profile) => profile.id,
            ProfileChange::Deleted(id) => *id,
        }
    }
}

/// Payload emitted by the `profiles` change trigger on the `profile_changes`
/// channel. Only keys are sent; the row is re-read by the listener.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileNotification {
    pub op: String,
    pub id: Uuid,
}

impl ProfileNotification {
    /// Whether the current row must be read to build the change.
    pub fn needs_record(&self) -> bool {
        self.op == "UPDATE"
    }

    /// Builds the change from the row read after the notification. An update
    /// whose row is already gone is reported as a delete. Inserts are not
    /// interesting to a watcher of an existing row.
    pub fn into_change(self, current: Option<Profile>) -> Option<ProfileChange> {
        match (self.op.as_str(), current) {
            ("UPDATE", Some(profile)) => Some(ProfileChange::Updated(profile)),
            ("UPDATE", None) | ("DELETE", _) => Some(ProfileChange::Deleted(self.id)),
            _ => None,
        }
    }
}
