// Board generation.
//
// A board is `GRID_SIZE` cards in row-major order. The starting team gets one
// extra card to offset its first-move advantage: 9 for the starting team, 8
// for the other, 1 assassin, 7 neutral. Words are drawn without replacement
// from a `WordPool` by Fisher–Yates shuffle; the kind multiset is shuffled the
// same way and zipped positionally with the words.
//
// All randomness comes from the caller's `GameRng`, so a given seed always
// produces the same board (tests rely on this; production seeds from entropy).

use codenames_prng::GameRng;
use derive_more::{Display, Error};
use tracing::debug;

use crate::state::Card;
use crate::types::{CardKind, Team};
use crate::words::WordPool;

/// Number of cards on a board (5x5).
pub const GRID_SIZE: usize = 25;
/// Cards belonging to the team that moves first.
pub const STARTING_TEAM_CARDS: usize = 9;
/// Cards belonging to the team that moves second.
pub const OTHER_TEAM_CARDS: usize = 8;
pub const ASSASSIN_CARDS: usize = 1;
pub const NEUTRAL_CARDS: usize = 7;

/// A freshly dealt board and the team that moves first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub cards: Vec<Card>,
    pub starting_team: Team,
}

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// The word pool cannot fill a board without repeating a word.
    #[display("word pool has {available} distinct words, a board needs {needed}")]
    PoolTooSmall { needed: usize, available: usize },
}

/// Deal a new board.
pub fn generate_board(rng: &mut GameRng, pool: &WordPool) -> Result<Board, BoardError> {
    if pool.len() < GRID_SIZE {
        return Err(BoardError::PoolTooSmall {
            needed: GRID_SIZE,
            available: pool.len(),
        });
    }

    let mut words = pool.words().to_vec();
    rng.shuffle(&mut words);
    words.truncate(GRID_SIZE);

    let starting_team = if rng.coin_flip() {
        Team::Red
    } else {
        Team::Blue
    };

    let mut kinds = kind_multiset(starting_team);
    rng.shuffle(&mut kinds);

    let cards = words
        .into_iter()
        .zip(kinds)
        .map(|(word, kind)| Card {
            word,
            kind,
            revealed: false,
        })
        .collect();

    debug!(%starting_team, "dealt new board");
    Ok(Board {
        cards,
        starting_team,
    })
}

/// The unshuffled 9/8/1/7 kind distribution for a board.
fn kind_multiset(starting_team: Team) -> Vec<CardKind> {
    let mut kinds = Vec::with_capacity(GRID_SIZE);
    kinds.extend(std::iter::repeat_n(
        CardKind::from(starting_team),
        STARTING_TEAM_CARDS,
    ));
    kinds.extend(std::iter::repeat_n(
        CardKind::from(starting_team.other()),
        OTHER_TEAM_CARDS,
    ));
    kinds.extend(std::iter::repeat_n(CardKind::Assassin, ASSASSIN_CARDS));
    kinds.extend(std::iter::repeat_n(CardKind::Neutral, NEUTRAL_CARDS));
    kinds
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn count(cards: &[Card], kind: CardKind) -> usize {
        cards.iter().filter(|c| c.kind == kind).count()
    }

    #[test]
    fn distribution_holds_for_many_seeds() {
        let pool = WordPool::builtin();
        for seed in 0..200 {
            let mut rng = GameRng::new(seed);
            let board = generate_board(&mut rng, &pool).unwrap();
            let start = board.starting_team;

            assert_eq!(board.cards.len(), GRID_SIZE);
            assert_eq!(count(&board.cards, start.into()), STARTING_TEAM_CARDS);
            assert_eq!(count(&board.cards, start.other().into()), OTHER_TEAM_CARDS);
            assert_eq!(count(&board.cards, CardKind::Assassin), ASSASSIN_CARDS);
            assert_eq!(count(&board.cards, CardKind::Neutral), NEUTRAL_CARDS);

            let words: HashSet<&str> = board.cards.iter().map(|c| c.word.as_str()).collect();
            assert_eq!(words.len(), GRID_SIZE, "duplicate word with seed {seed}");
            assert!(board.cards.iter().all(|c| !c.revealed));
        }
    }

    #[test]
    fn starting_team_is_roughly_uniform() {
        let pool = WordPool::builtin();
        let mut rng = GameRng::new(314);
        let trials = 2_000;
        let red = (0..trials)
            .filter(|_| generate_board(&mut rng, &pool).unwrap().starting_team == Team::Red)
            .count();
        assert!(
            (900..1_100).contains(&red),
            "red started {red} of {trials} games"
        );
    }

    #[test]
    fn same_seed_same_board() {
        let pool = WordPool::builtin();
        let a = generate_board(&mut GameRng::new(77), &pool).unwrap();
        let b = generate_board(&mut GameRng::new(77), &pool).unwrap();
        assert_eq!(a, b);
        let c = generate_board(&mut GameRng::new(78), &pool).unwrap();
        assert_ne!(a.cards, c.cards);
    }

    #[test]
    fn exact_size_pool_uses_every_word() {
        let text: String = (0..GRID_SIZE).map(|i| format!("word{i}\n")).collect();
        let pool = WordPool::from_lines(&text);
        let board = generate_board(&mut GameRng::new(5), &pool).unwrap();
        let used: HashSet<&String> = board.cards.iter().map(|c| &c.word).collect();
        let all: HashSet<&String> = pool.words().iter().collect();
        assert_eq!(used, all);
    }

    #[test]
    fn small_pool_is_rejected() {
        let pool = WordPool::from_lines("one\ntwo\nthree\n");
        let err = generate_board(&mut GameRng::new(1), &pool).unwrap_err();
        assert_eq!(
            err,
            BoardError::PoolTooSmall {
                needed: GRID_SIZE,
                available: 3
            }
        );
    }
}
