// Player roster.
//
// One `Player` per connection, kept in join order (the order clients see in
// `SYNC_PLAYERS`). The host is bootstrapped into the roster when the session
// is created; everyone else enters through `join` on their first
// `JOIN_REQUEST` and leaves through `remove` when their connection closes.
//
// Team and role changes are lobby-only. Switching team always drops the
// player back to operative so a spymaster claim never follows a player to
// the other side. Spymaster uniqueness is checked here, at assignment; there
// is no standing invariant check elsewhere.

use serde::{Deserialize, Serialize};

use crate::rejection::Rejection;
use crate::types::{GameStatus, PeerId, PlayerTeam, Role, Team};

/// Name given to players who join with a blank name.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Longest accepted display name, in characters. Longer names are truncated.
pub const MAX_NAME_CHARS: usize = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PeerId,
    pub name: String,
    pub team: PlayerTeam,
    pub role: Role,
    pub is_host: bool,
}

/// Result of a join request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Joined {
    /// First join from this peer.
    New,
    /// The peer was already seated; its name was refreshed.
    Renamed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// A roster containing only the host.
    pub fn with_host(id: PeerId, name: &str) -> Self {
        Self {
            players: vec![Player {
                id,
                name: clean_name(name),
                team: PlayerTeam::Spectator,
                role: Role::Operative,
                is_host: true,
            }],
        }
    }

    /// Seat a new spectator, or rename an existing player (a reconnecting
    /// client resending its join).
    pub fn join(&mut self, id: PeerId, name: &str) -> Joined {
        let name = clean_name(name);
        if let Some(player) = self.get_mut(&id) {
            player.name = name;
            return Joined::Renamed;
        }
        self.players.push(Player {
            id,
            name,
            team: PlayerTeam::Spectator,
            role: Role::Operative,
            is_host: false,
        });
        Joined::New
    }

    /// Move a player to `team`, resetting their role to operative.
    pub fn change_team(
        &mut self,
        id: &PeerId,
        team: PlayerTeam,
        status: GameStatus,
    ) -> Result<(), Rejection> {
        require_lobby(status)?;
        let player = self.require_mut(id)?;
        player.team = team;
        player.role = Role::Operative;
        Ok(())
    }

    /// Change a player's role on their current team.
    ///
    /// `team` must be the team the player sits on. A spymaster request is
    /// refused when somebody else already holds that seat.
    pub fn change_role(
        &mut self,
        id: &PeerId,
        team: PlayerTeam,
        role: Role,
        status: GameStatus,
    ) -> Result<(), Rejection> {
        require_lobby(status)?;
        let current = self.require(id)?.team;
        if current != team {
            return Err(Rejection::TeamMismatch);
        }
        if role == Role::Spymaster {
            let Some(side) = team.team() else {
                return Err(Rejection::TeamMismatch);
            };
            if self.spymaster_of(side).is_some_and(|p| &p.id != id) {
                return Err(Rejection::SpymasterTaken { team: side });
            }
        }
        self.require_mut(id)?.role = role;
        Ok(())
    }

    /// Drop a disconnected player. No rebalancing happens.
    pub fn remove(&mut self, id: &PeerId) -> Option<Player> {
        let index = self.players.iter().position(|p| &p.id == id)?;
        Some(self.players.remove(index))
    }

    pub fn get(&self, id: &PeerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn get_mut(&mut self, id: &PeerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    /// Look up a player, or reject the action as coming from a stranger.
    pub fn require(&self, id: &PeerId) -> Result<&Player, Rejection> {
        self.get(id)
            .ok_or_else(|| Rejection::UnknownPlayer { peer: id.clone() })
    }

    fn require_mut(&mut self, id: &PeerId) -> Result<&mut Player, Rejection> {
        self.get_mut(id)
            .ok_or_else(|| Rejection::UnknownPlayer { peer: id.clone() })
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn spymaster_of(&self, team: Team) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.team.team() == Some(team) && p.role == Role::Spymaster)
    }

    /// Players seated on `team`, any role.
    pub fn count_on(&self, team: Team) -> usize {
        self.players
            .iter()
            .filter(|p| p.team.team() == Some(team))
            .count()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

fn require_lobby(status: GameStatus) -> Result<(), Rejection> {
    if status == GameStatus::Lobby {
        Ok(())
    } else {
        Err(Rejection::NotInLobby { status })
    }
}

fn clean_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return DEFAULT_PLAYER_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_CHARS).collect()
}
