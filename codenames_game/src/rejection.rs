// Why an action was dropped.
//
// The host never tells a peer that its action was refused; an invalid action
// simply produces no state change and no broadcast. `Rejection` is the
// in-process side of that: the reducer and roster return it so the host can
// log the reason at debug level and tests can assert on it.

use derive_more::{Display, Error};

use crate::board::BoardError;
use crate::types::{GameStatus, PeerId, Team, TurnPhase};

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum Rejection {
    #[display("{peer} is not in the roster")]
    UnknownPlayer { peer: PeerId },
    #[display("{peer} is not the host")]
    NotHost { peer: PeerId },
    #[display("teams can only change in the lobby (status is {status})")]
    NotInLobby { status: GameStatus },
    #[display("no game in progress (status is {status})")]
    NotPlaying { status: GameStatus },
    #[display("not allowed during the {phase} phase")]
    WrongPhase { phase: TurnPhase },
    #[display("it is {current}'s turn")]
    NotYourTurn { current: Team },
    #[display("only the active spymaster may give a hint")]
    NotSpymaster,
    #[display("only operatives may reveal cards")]
    NotOperative,
    #[display("both teams need at least one player")]
    TeamsIncomplete,
    #[display("card {index} is off the board ({len} cards)")]
    CardOutOfRange { index: usize, len: usize },
    #[display("card {index} is already revealed")]
    AlreadyRevealed { index: usize },
    #[display("invalid hint: {reason}")]
    InvalidHint { reason: &'static str },
    #[display("{team} already has a spymaster")]
    SpymasterTaken { team: Team },
    #[display("requested team does not match the player's seat")]
    TeamMismatch,
    #[display("message type is not accepted by the host")]
    Unexpected,
    #[display("{_0}")]
    Board(#[error(source)] BoardError),
}

impl From<BoardError> for Rejection {
    fn from(err: BoardError) -> Self {
        Rejection::Board(err)
    }
}
