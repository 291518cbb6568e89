use serde::{Deserialize, Serialize};

use crate::room::models::{MessageKind, PresenceStatus};

/// Actions a client may send over its socket
///
/// Each action is routed to the dispatcher exactly like the matching
/// REST call, on behalf of the user the connection was opened for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    SendMessage {
        #[serde(rename = "type")]
        kind: MessageKind,
        content: String,
    },
    SetPresence {
        status: PresenceStatus,
    },
    MarkRead {
        #[serde(default)]
        message_id: Option<String>,
    },
}
