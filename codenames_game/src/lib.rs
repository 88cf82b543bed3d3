// codenames_game: rules engine for the two-team word guessing game.
//
// Everything the host needs to own and mutate the canonical game lives here,
// with no I/O and no threads: the host crate (`codenames_host`) drives it from
// a single-threaded event loop, and clients only ever deserialize the data
// types it defines.
//
// Module overview:
// - `types.rs`:     Small shared enums (`Team`, `PlayerTeam`, `Role`,
//                   `CardKind`, `GameStatus`, `TurnPhase`) and the opaque
//                   `PeerId`.
// - `words.rs`:     `WordPool`: the built-in word list plus parsing of custom
//                   one-word-per-line lists.
// - `board.rs`:     Board generation: 25 distinct words, 9/8/1/7 kind split,
//                   starting team by coin flip, all drawn from a `GameRng`.
// - `win.rs`:       `get_winner`: assassin first, then team elimination.
// - `state.rs`:     `Card`, `Hint`, `GameState` and its small state-transition
//                   helpers (`pass_turn`, `declare_winner`, `touch`).
// - `roster.rs`:    `Player` and `Roster`: join/rename, lobby team and role
//                   changes, spymaster uniqueness, disconnect removal.
// - `game.rs`:      The reducer: `apply()` validates a `GameAction` against the
//                   state and roster, then mutates or rejects.
// - `rejection.rs`: `Rejection`, the diagnostic for a silently dropped action.
//
// Failure policy: an invalid action leaves the state untouched (by value) and
// returns `Err(Rejection)`. The host never sends rejections over the wire;
// they exist for logging and tests.

pub mod board;
pub mod game;
pub mod rejection;
pub mod roster;
pub mod state;
pub mod types;
pub mod win;
pub mod words;

pub use board::{Board, BoardError, GRID_SIZE, generate_board};
pub use game::{ActionContext, Applied, GameAction, GameRules, RevealOutcome, apply};
pub use rejection::Rejection;
pub use roster::{DEFAULT_PLAYER_NAME, Joined, MAX_NAME_CHARS, Player, Roster};
pub use state::{Card, GameState, Hint};
pub use types::{CardKind, GameStatus, PeerId, PlayerTeam, Role, Team, TurnPhase};
pub use win::get_winner;
pub use words::WordPool;
