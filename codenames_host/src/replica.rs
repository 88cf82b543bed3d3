// Client-side copy of the host's state.
//
// A replica never decides anything. It holds the last roster and game state
// the host sent and replaces each wholesale when a `SYNC_PLAYERS` or
// `SYNC_STATE` arrives; every other message type is ignored. There is no
// staleness check: TCP delivers a connection's frames in order, so the latest
// frame is always the latest state.
//
// The host's own terminal reads through a replica too (fed by the session's
// local view), so host and clients render from exactly the same data.
//
// The query helpers (`can_hint`, `can_reveal`, ...) only decide what a front
// end should offer. The host re-checks everything.

use codenames_game::{GameState, GameStatus, Player, PlayerTeam, Role, Team, TurnPhase};
use codenames_protocol::{Message, PeerId};

#[derive(Clone, Debug, Default)]
pub struct Replica {
    me: Option<PeerId>,
    players: Vec<Player>,
    state: Option<GameState>,
}

impl Replica {
    pub fn new(me: PeerId) -> Self {
        Self {
            me: Some(me),
            ..Self::default()
        }
    }

    /// Take in one message from the host. Returns whether anything was
    /// replaced.
    pub fn apply(&mut self, message: Message) -> bool {
        match message {
            Message::SyncState(state) => {
                self.state = Some(state);
                true
            }
            Message::SyncPlayers(players) => {
                self.players = players;
                true
            }
            _ => false,
        }
    }

    /// Forget everything. Used when the host goes away.
    pub fn clear(&mut self) {
        self.players.clear();
        self.state = None;
    }

    /// True once at least one state snapshot has arrived.
    pub fn is_synced(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn my_id(&self) -> Option<&PeerId> {
        self.me.as_ref()
    }

    pub fn me(&self) -> Option<&Player> {
        let me = self.me.as_ref()?;
        self.players.iter().find(|p| &p.id == me)
    }

    pub fn my_team(&self) -> Option<PlayerTeam> {
        self.me().map(|p| p.team)
    }

    pub fn is_host(&self) -> bool {
        self.me().is_some_and(|p| p.is_host)
    }

    /// Spymasters see every card's color; so does everyone once the game is
    /// over.
    pub fn sees_all_cards(&self) -> bool {
        let over = self.state.as_ref().is_some_and(|s| s.status.is_over());
        over || self.me().is_some_and(|p| p.role == Role::Spymaster)
    }

    /// The team whose turn it is, while a game is running.
    pub fn active_team(&self) -> Option<Team> {
        self.state
            .as_ref()
            .filter(|s| s.status == GameStatus::Playing)
            .map(|s| s.current_turn)
    }

    fn my_turn_as(&self, role: Role, phase: TurnPhase) -> bool {
        let (Some(state), Some(me)) = (self.state.as_ref(), self.me()) else {
            return false;
        };
        state.status == GameStatus::Playing
            && state.turn_phase == phase
            && me.team.team() == Some(state.current_turn)
            && me.role == role
    }

    pub fn can_hint(&self) -> bool {
        self.my_turn_as(Role::Spymaster, TurnPhase::Hinting)
    }

    pub fn can_reveal(&self) -> bool {
        self.my_turn_as(Role::Operative, TurnPhase::Guessing)
    }

    pub fn can_start(&self) -> bool {
        self.is_host()
            && Team::ALL
                .into_iter()
                .all(|team| self.players.iter().any(|p| p.team.team() == Some(team)))
    }
}
