// codenames_protocol: wire protocol between the host and its peers.
//
// Shared by both ends of every connection. The host (`codenames_host`) decodes
// action messages and encodes sync messages; clients do the reverse. This
// crate has no networking of its own beyond byte framing over `Read`/`Write`.
//
// Module overview:
// - `types.rs`:     Protocol constants and re-exported identifiers.
// - `message.rs`:   `Message` (one variant per wire `type`, typed payloads)
//                   and `Envelope` (message + optional `senderId`).
// - `handshake.rs`: `DialRequest` / `DialReply`, the first exchange on a new
//                   connection, which checks the room id before any
//                   envelopes flow.
// - `framing.rs`:   4-byte big-endian length prefix, then a JSON payload.
//
// Design decisions:
// - **JSON on the wire.** The envelope shape (`{type, payload?, senderId?}`)
//   is fixed by the browser-era protocol and stays readable in logs.
// - **Full snapshots, never deltas.** `SYNC_STATE` and `SYNC_PLAYERS` always
//   carry the complete value, so receivers need no merge logic.
// - **`senderId` is advisory.** The host binds identity to the connection and
//   ignores this field on inbound messages.

pub mod framing;
pub mod handshake;
pub mod message;
pub mod types;

pub use framing::{MAX_FRAME_SIZE, read_frame, write_frame};
pub use handshake::{DialReply, DialRequest};
pub use message::{Envelope, Message};
pub use types::{PROTOCOL_VERSION, PeerId};

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use codenames_game::{GameState, Player, PlayerTeam, Role};

    use super::*;

    /// Encode, frame, unframe and decode an envelope.
    fn through_the_wire(envelope: &Envelope) -> Envelope {
        let json = serde_json::to_vec(envelope).unwrap();
        let mut wire = Vec::new();
        write_frame(&mut wire, &json).unwrap();

        let mut cursor = Cursor::new(&wire);
        let bytes = read_frame(&mut cursor).unwrap().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn sync_state_survives_framing() {
        let envelope = Envelope::new(Message::SyncState(GameState::lobby(123)));
        assert_eq!(through_the_wire(&envelope), envelope);
    }

    #[test]
    fn sync_players_survives_framing() {
        let envelope = Envelope::from_peer(
            Message::SyncPlayers(vec![Player {
                id: PeerId::new("ABCDEF"),
                name: "Host".into(),
                team: PlayerTeam::Red,
                role: Role::Spymaster,
                is_host: true,
            }]),
            PeerId::new("ABCDEF"),
        );
        assert_eq!(through_the_wire(&envelope), envelope);
    }

    #[test]
    fn handshake_then_envelopes_share_a_stream() {
        let mut wire = Vec::new();
        let dial = DialRequest::new(PeerId::new("ROOM42"));
        write_frame(&mut wire, &serde_json::to_vec(&dial).unwrap()).unwrap();
        let join = Envelope::new(Message::JoinRequest {
            name: "Alice".into(),
        });
        write_frame(&mut wire, &serde_json::to_vec(&join).unwrap()).unwrap();

        let mut cursor = Cursor::new(&wire);
        let first: DialRequest =
            serde_json::from_slice(&read_frame(&mut cursor).unwrap().unwrap()).unwrap();
        let second: Envelope =
            serde_json::from_slice(&read_frame(&mut cursor).unwrap().unwrap()).unwrap();
        assert_eq!(first, dial);
        assert_eq!(second, join);
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }
}
