// Game messages.
//
// One enum covers both directions. The host accepts `JOIN_REQUEST` and the
// `ACTION_*` family; clients accept only `SYNC_STATE` and `SYNC_PLAYERS`.
// Each side ignores the rest (see `codenames_host::session` and
// `codenames_host::replica`).
//
// Wire shape: `{"type": "ACTION_REVEAL", "payload": {"index": 4},
// "senderId": "ROOM42-1"}`. `payload` is omitted for variants that carry
// nothing, and `senderId` is omitted when unset. The adjacently tagged
// representation gives every variant a strongly typed payload, so a message
// that does not match its `type` fails to decode and never reaches the
// reducer.

use codenames_game::{GameAction, GameState, Player, PlayerTeam, Role};
use serde::{Deserialize, Serialize};

use crate::types::PeerId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// client → host: take a seat (or refresh the name on an existing one).
    JoinRequest { name: String },
    /// host → client: the full game state.
    SyncState(GameState),
    /// host → client: the full roster, in join order.
    SyncPlayers(Vec<Player>),
    ActionChangeTeam {
        team: PlayerTeam,
    },
    ActionChangeRole {
        team: PlayerTeam,
        role: Role,
    },
    ActionStartGame,
    ActionSubmitHint {
        word: String,
        count: u32,
    },
    ActionReveal {
        index: usize,
    },
    ActionEndTurn,
    ActionReset,
}

impl Message {
    /// The wire `type` string, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::JoinRequest { .. } => "JOIN_REQUEST",
            Message::SyncState(_) => "SYNC_STATE",
            Message::SyncPlayers(_) => "SYNC_PLAYERS",
            Message::ActionChangeTeam { .. } => "ACTION_CHANGE_TEAM",
            Message::ActionChangeRole { .. } => "ACTION_CHANGE_ROLE",
            Message::ActionStartGame => "ACTION_START_GAME",
            Message::ActionSubmitHint { .. } => "ACTION_SUBMIT_HINT",
            Message::ActionReveal { .. } => "ACTION_REVEAL",
            Message::ActionEndTurn => "ACTION_END_TURN",
            Message::ActionReset => "ACTION_RESET",
        }
    }

    /// The reducer action this message asks for, if it is one.
    pub fn game_action(&self) -> Option<GameAction> {
        match self {
            Message::ActionStartGame => Some(GameAction::StartGame),
            Message::ActionSubmitHint { word, count } => Some(GameAction::SubmitHint {
                word: word.clone(),
                count: *count,
            }),
            Message::ActionReveal { index } => Some(GameAction::Reveal { index: *index }),
            Message::ActionEndTurn => Some(GameAction::EndTurn),
            Message::ActionReset => Some(GameAction::Reset),
            _ => None,
        }
    }
}

/// A message plus the sender's self-declared id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub message: Message,
    #[serde(
        rename = "senderId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sender_id: Option<PeerId>,
}

impl Envelope {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            sender_id: None,
        }
    }

    pub fn from_peer(message: Message, sender: PeerId) -> Self {
        Self {
            message,
            sender_id: Some(sender),
        }
    }
}

impl From<Message> for Envelope {
    fn from(message: Message) -> Self {
        Envelope::new(message)
    }
}
