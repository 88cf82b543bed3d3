// Core enums and the peer identifier shared by every other module.
//
// Wire names are fixed by the JSON protocol: teams, roles, card kinds and
// phases serialize lowercase (`"red"`, `"spymaster"`, `"assassin"`,
// `"guessing"`), statuses snake_case (`"red_win"`). Changing a serde attribute
// here changes the protocol.
//
// `Team` is the two competing sides; `PlayerTeam` adds the spectator bench a
// player sits on before picking a side. Keeping them separate lets
// `GameState::current_turn` be a plain `Team` with no impossible spectator
// value.

use std::fmt;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Opaque connection identifier. Unique and stable for the lifetime of one
/// connection; the host's own id doubles as the room id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two competing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    #[display("red")]
    Red,
    #[display("blue")]
    Blue,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    /// The opposing team.
    pub fn other(self) -> Self {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

/// Where a player sits: on a team, or watching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerTeam {
    #[display("red")]
    Red,
    #[display("blue")]
    Blue,
    #[display("spectator")]
    Spectator,
}

impl PlayerTeam {
    /// The competing team, or `None` for spectators.
    pub fn team(self) -> Option<Team> {
        match self {
            PlayerTeam::Red => Some(Team::Red),
            PlayerTeam::Blue => Some(Team::Blue),
            PlayerTeam::Spectator => None,
        }
    }
}

impl From<Team> for PlayerTeam {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => PlayerTeam::Red,
            Team::Blue => PlayerTeam::Blue,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Reveals cards.
    #[display("operative")]
    Operative,
    /// Sees every card's kind and gives hints. At most one per team.
    #[display("spymaster")]
    Spymaster,
}

/// The hidden identity of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    #[display("red")]
    Red,
    #[display("blue")]
    Blue,
    #[display("neutral")]
    Neutral,
    #[display("assassin")]
    Assassin,
}

impl CardKind {
    /// The team this card belongs to, if any.
    pub fn team(self) -> Option<Team> {
        match self {
            CardKind::Red => Some(Team::Red),
            CardKind::Blue => Some(Team::Blue),
            CardKind::Neutral | CardKind::Assassin => None,
        }
    }
}

impl From<Team> for CardKind {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => CardKind::Red,
            Team::Blue => CardKind::Blue,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[display("lobby")]
    Lobby,
    #[display("playing")]
    Playing,
    #[display("red_win")]
    RedWin,
    #[display("blue_win")]
    BlueWin,
}

impl GameStatus {
    /// The terminal status for a win by `team`.
    pub fn won_by(team: Team) -> Self {
        match team {
            Team::Red => GameStatus::RedWin,
            Team::Blue => GameStatus::BlueWin,
        }
    }

    /// The team named by a terminal status.
    pub fn winner(self) -> Option<Team> {
        match self {
            GameStatus::RedWin => Some(Team::Red),
            GameStatus::BlueWin => Some(Team::Blue),
            GameStatus::Lobby | GameStatus::Playing => None,
        }
    }

    pub fn is_over(self) -> bool {
        self.winner().is_some()
    }
}

/// Sub-state of a turn while `status == Playing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    /// Waiting for the active spymaster's hint.
    #[display("hinting")]
    Hinting,
    /// Operatives are revealing cards against the current hint.
    #[display("guessing")]
    Guessing,
}
