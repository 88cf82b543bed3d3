// Transport-level errors.
//
// Everything that can go wrong between "I have an envelope" and "the other end
// has it": socket I/O, JSON encoding, and handshake outcomes. Game-rule
// violations are not errors at this level (see `codenames_game::Rejection`).

use std::io;

use derive_more::{Display, Error, From};

#[derive(Debug, Display, Error, From)]
pub enum TransportError {
    #[display("connection error: {_0}")]
    Io(#[error(source)] io::Error),
    #[display("malformed message: {_0}")]
    Codec(#[error(source)] serde_json::Error),
    /// The host turned the dial down.
    #[display("refused by host: {reason}")]
    #[from(ignore)]
    Refused { reason: String },
    /// The other end is gone.
    #[display("connection closed")]
    #[from(ignore)]
    Closed,
    #[display("handshake failed: {reason}")]
    #[from(ignore)]
    Handshake { reason: String },
}
