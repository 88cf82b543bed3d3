// Win evaluation.
//
// Pure function of the board: the reducer calls it after every reveal and
// again as a final check before committing the turn outcome. Priority order
// matters when one reveal satisfies several rules at once: a revealed
// assassin always decides the game, even if the same board also shows one
// team fully uncovered.

use crate::state::Card;
use crate::types::{CardKind, Team};

/// The winning team for this board, if the game is decided.
///
/// `current_turn` is the team that made the latest reveal; it loses if that
/// reveal was the assassin.
pub fn get_winner(cards: &[Card], current_turn: Team) -> Option<Team> {
    if cards
        .iter()
        .any(|c| c.kind == CardKind::Assassin && c.revealed)
    {
        return Some(current_turn.other());
    }
    Team::ALL
        .into_iter()
        .find(|&team| all_revealed(cards, team))
}

/// True when `team` has at least one card and every one is revealed.
fn all_revealed(cards: &[Card], team: Team) -> bool {
    let mut own = cards.iter().filter(|c| c.kind.team() == Some(team)).peekable();
    own.peek().is_some() && own.all(|c| c.revealed)
}
