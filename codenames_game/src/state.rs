// The replicated game state.
//
// `GameState` is what the host owns and what `SYNC_STATE` carries. Clients
// never mutate it; they replace their copy wholesale with each sync. Field
// names serialize camelCase to match the protocol (`currentTurn`,
// `lastUpdate`, ...).
//
// Fields are public because the state is a plain replicated value, but all
// host-side transitions go through the helpers below so the invariants hold:
// - `winner` is set only together with a terminal `status`
//   (`declare_winner`);
// - `Hinting` implies no hint and zero guesses (`pass_turn`, `begin`);
// - `last_update` strictly increases across accepted mutations (`touch`).
// `invariant_violation` checks all of them and is used by tests.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::types::{CardKind, GameStatus, Team, TurnPhase};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique within a board.
    pub word: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
    /// Only ever goes from false to true.
    pub revealed: bool,
}

/// A spymaster's clue: one word plus how many cards it points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub word: String,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub status: GameStatus,
    pub cards: Vec<Card>,
    pub current_turn: Team,
    pub turn_phase: TurnPhase,
    pub current_hint: Option<Hint>,
    pub guesses_made: u32,
    pub starting_team: Team,
    pub winner: Option<Team>,
    /// Milliseconds since the Unix epoch of the last accepted mutation.
    pub last_update: u64,
}

impl GameState {
    /// The state of a room before any game has been started.
    pub fn lobby(now: u64) -> Self {
        Self {
            status: GameStatus::Lobby,
            cards: Vec::new(),
            current_turn: Team::Red,
            turn_phase: TurnPhase::Hinting,
            current_hint: None,
            guesses_made: 0,
            starting_team: Team::Red,
            winner: None,
            last_update: now,
        }
    }

    /// Start play on a freshly dealt board.
    pub fn begin(&mut self, board: Board) {
        self.status = GameStatus::Playing;
        self.cards = board.cards;
        self.starting_team = board.starting_team;
        self.current_turn = board.starting_team;
        self.turn_phase = TurnPhase::Hinting;
        self.current_hint = None;
        self.guesses_made = 0;
        self.winner = None;
    }

    /// Hand the turn to the other team and wait for its hint.
    pub fn pass_turn(&mut self) {
        self.current_turn = self.current_turn.other();
        self.turn_phase = TurnPhase::Hinting;
        self.current_hint = None;
        self.guesses_made = 0;
    }

    /// End the game in favour of `team`.
    pub fn declare_winner(&mut self, team: Team) {
        self.status = GameStatus::won_by(team);
        self.winner = Some(team);
    }

    /// Stamp an accepted mutation. Never goes backwards, even if the wall
    /// clock does.
    pub fn touch(&mut self, now: u64) {
        self.last_update = now.max(self.last_update.saturating_add(1));
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Unrevealed cards left for `team`.
    pub fn remaining(&self, team: Team) -> usize {
        self.cards
            .iter()
            .filter(|c| !c.revealed && c.kind.team() == Some(team))
            .count()
    }

    /// Describe the first broken invariant, if any.
    pub fn invariant_violation(&self) -> Option<&'static str> {
        if self.winner != self.status.winner() {
            return Some("winner does not match status");
        }
        match self.turn_phase {
            TurnPhase::Guessing if self.current_hint.is_none() => {
                Some("guessing without a hint")
            }
            TurnPhase::Hinting if self.current_hint.is_some() => Some("hinting with a hint set"),
            TurnPhase::Hinting if self.guesses_made != 0 => Some("hinting with guesses counted"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lobby_state_is_consistent() {
        let state = GameState::lobby(1_000);
        assert_eq!(state.status, GameStatus::Lobby);
        assert!(state.cards.is_empty());
        assert_eq!(state.invariant_violation(), None);
    }

    #[test]
    fn touch_is_strictly_increasing() {
        let mut state = GameState::lobby(1_000);
        state.touch(500);
        assert_eq!(state.last_update, 1_001);
        state.touch(5_000);
        assert_eq!(state.last_update, 5_000);
        state.touch(5_000);
        assert_eq!(state.last_update, 5_001);
    }

    #[test]
    fn pass_turn_resets_hint_state() {
        let mut state = GameState::lobby(0);
        state.status = GameStatus::Playing;
        state.turn_phase = TurnPhase::Guessing;
        state.current_hint = Some(Hint {
            word: "OCEAN".into(),
            count: 2,
        });
        state.guesses_made = 1;

        state.pass_turn();
        assert_eq!(state.current_turn, Team::Blue);
        assert_eq!(state.turn_phase, TurnPhase::Hinting);
        assert_eq!(state.current_hint, None);
        assert_eq!(state.guesses_made, 0);
        assert_eq!(state.invariant_violation(), None);
    }

    #[test]
    fn declare_winner_sets_both_fields() {
        let mut state = GameState::lobby(0);
        state.declare_winner(Team::Blue);
        assert_eq!(state.status, GameStatus::BlueWin);
        assert_eq!(state.winner, Some(Team::Blue));
        assert_eq!(state.invariant_violation(), None);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let mut state = GameState::lobby(42);
        state.cards.push(Card {
            word: "MOON".into(),
            kind: CardKind::Assassin,
            revealed: false,
        });
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "lobby");
        assert_eq!(json["currentTurn"], "red");
        assert_eq!(json["turnPhase"], "hinting");
        assert!(json["currentHint"].is_null());
        assert_eq!(json["guessesMade"], 0);
        assert_eq!(json["startingTeam"], "red");
        assert!(json["winner"].is_null());
        assert_eq!(json["lastUpdate"], 42);
        assert_eq!(json["cards"][0]["type"], "assassin");
        assert_eq!(json["cards"][0]["revealed"], false);
    }
}
