// Protocol-level constants and identifiers.
//
// `PeerId` is defined by the rules engine (players carry it) and re-exported
// here so that transport code can name it without depending on game logic
// directly.

pub use codenames_game::PeerId;

/// Bumped whenever the envelope or handshake shape changes incompatibly.
/// Dialers with a different version are refused during the handshake.
pub const PROTOCOL_VERSION: u32 = 1;
