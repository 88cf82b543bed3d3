// The authoritative reducer.
//
// `apply()` is the only way game state changes during play. It takes the
// acting peer (already bound to its connection by the host), validates the
// action against the current state and roster, and either mutates the state
// and returns what happened, or returns a `Rejection` and leaves the state
// exactly as it was. Every check runs before the first write, so a rejected
// action never leaves a half-applied state behind.
//
// Turn model: each turn is a hint phase followed by a guess phase. The number
// of reveals allowed per hint is data-driven through `GameRules`:
// `bonus_guesses = Some(b)` caps reveals at `hint.count + b` (classic rules
// use b = 1); `None` removes the cap so only a miss or `EndTurn` passes the
// turn, which is the plain reveal-until-you-miss variant.
//
// Roster changes (join, team, role, disconnect) are not game actions; the host
// session calls `Roster` directly for those. See `codenames_host::session`.

use codenames_prng::GameRng;
use serde::{Deserialize, Serialize};

use crate::board::generate_board;
use crate::rejection::Rejection;
use crate::roster::{Player, Roster};
use crate::state::{GameState, Hint};
use crate::types::{CardKind, PeerId, Role, Team, TurnPhase};
use crate::win::get_winner;
use crate::words::WordPool;

/// A player action that touches the game state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameAction {
    /// Host only. Deal a new board and begin play.
    StartGame,
    /// Active spymaster gives a clue.
    SubmitHint { word: String, count: u32 },
    /// Active operative uncovers a card.
    Reveal { index: usize },
    /// Active team stops guessing.
    EndTurn,
    /// Host only. Back to the lobby.
    Reset,
}

/// Host-chosen rule knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Extra reveals allowed beyond the hint count. `None` means unlimited.
    pub bonus_guesses: Option<u32>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            bonus_guesses: Some(1),
        }
    }
}

impl GameRules {
    /// Maximum correct reveals for `hint`, or `None` when unlimited.
    pub fn guess_limit(&self, hint: &Hint) -> Option<u32> {
        self.bonus_guesses.map(|bonus| hint.count.saturating_add(bonus))
    }
}

/// Everything `apply()` needs besides the state and roster.
pub struct ActionContext<'a> {
    pub rng: &'a mut GameRng,
    pub words: &'a WordPool,
    pub rules: GameRules,
    /// Wall-clock milliseconds, used to stamp `last_update`.
    pub now: u64,
}

/// What a reveal did to the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Same team keeps guessing.
    Continue,
    /// Turn went to the other team.
    TurnPassed,
    /// Game over.
    Won(Team),
}

/// Summary of an accepted action, for logging and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    Started {
        starting_team: Team,
    },
    HintGiven,
    Revealed {
        index: usize,
        kind: CardKind,
        outcome: RevealOutcome,
    },
    TurnEnded,
    Reset,
}

/// Validate `action` from `sender` and apply it to `state`.
pub fn apply(
    state: &mut GameState,
    roster: &Roster,
    sender: &PeerId,
    action: GameAction,
    ctx: &mut ActionContext<'_>,
) -> Result<Applied, Rejection> {
    let player = roster.require(sender)?;
    let applied = match action {
        GameAction::StartGame => start_game(state, roster, player, ctx)?,
        GameAction::SubmitHint { word, count } => submit_hint(state, player, word, count)?,
        GameAction::Reveal { index } => reveal(state, player, index, ctx.rules)?,
        GameAction::EndTurn => end_turn(state, player)?,
        GameAction::Reset => reset(state, player)?,
    };
    state.touch(ctx.now);
    Ok(applied)
}

fn start_game(
    state: &mut GameState,
    roster: &Roster,
    player: &Player,
    ctx: &mut ActionContext<'_>,
) -> Result<Applied, Rejection> {
    require_host(player)?;
    if Team::ALL.into_iter().any(|team| roster.count_on(team) == 0) {
        return Err(Rejection::TeamsIncomplete);
    }
    let board = generate_board(ctx.rng, ctx.words)?;
    let starting_team = board.starting_team;
    state.begin(board);
    Ok(Applied::Started { starting_team })
}

fn submit_hint(
    state: &mut GameState,
    player: &Player,
    word: String,
    count: u32,
) -> Result<Applied, Rejection> {
    require_turn(state, player, TurnPhase::Hinting)?;
    if player.role != Role::Spymaster {
        return Err(Rejection::NotSpymaster);
    }
    let word = word.trim();
    if word.is_empty() {
        return Err(Rejection::InvalidHint {
            reason: "hint word is empty",
        });
    }
    if word.chars().any(char::is_whitespace) {
        return Err(Rejection::InvalidHint {
            reason: "hint must be a single word",
        });
    }
    let folded = word.to_uppercase();
    if state
        .cards
        .iter()
        .any(|c| !c.revealed && c.word.to_uppercase() == folded)
    {
        return Err(Rejection::InvalidHint {
            reason: "hint is a word on the board",
        });
    }

    state.current_hint = Some(Hint {
        word: word.to_string(),
        count,
    });
    state.turn_phase = TurnPhase::Guessing;
    state.guesses_made = 0;
    Ok(Applied::HintGiven)
}

fn reveal(
    state: &mut GameState,
    player: &Player,
    index: usize,
    rules: GameRules,
) -> Result<Applied, Rejection> {
    require_turn(state, player, TurnPhase::Guessing)?;
    if player.role != Role::Operative {
        return Err(Rejection::NotOperative);
    }
    let len = state.cards.len();
    let card = state
        .cards
        .get_mut(index)
        .ok_or(Rejection::CardOutOfRange { index, len })?;
    if card.revealed {
        return Err(Rejection::AlreadyRevealed { index });
    }

    card.revealed = true;
    let kind = card.kind;
    let team = state.current_turn;

    let mut outcome = match kind {
        CardKind::Assassin => RevealOutcome::Won(team.other()),
        _ if kind.team() == Some(team) => {
            state.guesses_made += 1;
            let limit = state
                .current_hint
                .as_ref()
                .and_then(|hint| rules.guess_limit(hint));
            if limit.is_some_and(|limit| state.guesses_made >= limit) {
                state.pass_turn();
                RevealOutcome::TurnPassed
            } else {
                RevealOutcome::Continue
            }
        }
        // Neutral or the opponent's card.
        _ => {
            state.pass_turn();
            RevealOutcome::TurnPassed
        }
    };

    // Judged from the acting team's side, whoever holds the turn now.
    if let Some(winner) = get_winner(&state.cards, team) {
        outcome = RevealOutcome::Won(winner);
    }
    if let RevealOutcome::Won(winner) = outcome {
        state.declare_winner(winner);
    }

    Ok(Applied::Revealed {
        index,
        kind,
        outcome,
    })
}

fn end_turn(state: &mut GameState, player: &Player) -> Result<Applied, Rejection> {
    require_turn(state, player, TurnPhase::Guessing)?;
    state.pass_turn();
    Ok(Applied::TurnEnded)
}

fn reset(state: &mut GameState, player: &Player) -> Result<Applied, Rejection> {
    require_host(player)?;
    *state = GameState::lobby(state.last_update);
    Ok(Applied::Reset)
}

fn require_host(player: &Player) -> Result<(), Rejection> {
    if player.is_host {
        Ok(())
    } else {
        Err(Rejection::NotHost {
            peer: player.id.clone(),
        })
    }
}

/// Game in progress, in `phase`, and `player` sits on the active team.
fn require_turn(state: &GameState, player: &Player, phase: TurnPhase) -> Result<(), Rejection> {
    if !state.is_playing() {
        return Err(Rejection::NotPlaying {
            status: state.status,
        });
    }
    if state.turn_phase != phase {
        return Err(Rejection::WrongPhase {
            phase: state.turn_phase,
        });
    }
    if player.team.team() != Some(state.current_turn) {
        return Err(Rejection::NotYourTurn {
            current: state.current_turn,
        });
    }
    Ok(())
}
