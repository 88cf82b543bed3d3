// Connection handshake.
//
// The first frame on a new connection is a `DialRequest` naming the room the
// dialer wants. The host answers with exactly one `DialReply`: `Accepted`
// carries the peer id the host assigned to this connection (the id every
// later action from it is attributed to), `Refused` carries a human-readable
// reason and is followed by the host closing the connection.
//
// Only after `Accepted` do `Envelope` frames flow, in both directions. The
// room id is shared out of band (a link, a chat message); knowing it is the
// only admission check.

use serde::{Deserialize, Serialize};

use crate::types::{PROTOCOL_VERSION, PeerId};

/// Refusal reason: the dialer asked for a different room.
pub const REFUSED_WRONG_ROOM: &str = "no such room";
/// Refusal reason: the room has no free connection slots.
pub const REFUSED_ROOM_FULL: &str = "room is full";
/// Refusal reason: incompatible protocol version.
pub const REFUSED_VERSION: &str = "protocol version mismatch";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialRequest {
    pub protocol_version: u32,
    pub room_id: PeerId,
}

impl DialRequest {
    /// A request for `room_id` at this build's protocol version.
    pub fn new(room_id: PeerId) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            room_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum DialReply {
    Accepted { peer_id: PeerId, room_id: PeerId },
    Refused { reason: String },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn dial_request_shape() {
        let value = serde_json::to_value(DialRequest::new(PeerId::new("K7XQ2M"))).unwrap();
        assert_eq!(
            value,
            json!({"protocolVersion": PROTOCOL_VERSION, "roomId": "K7XQ2M"})
        );
    }

    #[test]
    fn reply_shapes() {
        let accepted = DialReply::Accepted {
            peer_id: PeerId::new("K7XQ2M-1"),
            room_id: PeerId::new("K7XQ2M"),
        };
        assert_eq!(
            serde_json::to_value(&accepted).unwrap(),
            json!({"type": "ACCEPTED", "peerId": "K7XQ2M-1", "roomId": "K7XQ2M"})
        );
        let refused = DialReply::Refused {
            reason: REFUSED_ROOM_FULL.into(),
        };
        let back: DialReply =
            serde_json::from_value(serde_json::to_value(&refused).unwrap()).unwrap();
        assert_eq!(back, refused);
    }
}
