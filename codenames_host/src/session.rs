// The host's session aggregate.
//
// `Session` is the one place authoritative state lives: the roster, the game
// state, the session rng and word pool, and the set of open sinks. `server.rs`
// drives it from a single thread; there is no internal locking and no global
// state.
//
// Routing rules:
// - The acting identity is always the `origin` the caller passes in: the
//   peer id bound to the connection at handshake, or the host's own id for
//   local input. Whatever `senderId` a peer wrote in its envelope is ignored.
// - `JOIN_REQUEST` seats (or renames) the origin and always broadcasts, so a
//   repeated join doubles as a resync request.
// - Team/role changes go straight to the `Roster`; game actions go through
//   `codenames_game::apply`.
// - `SYNC_*` messages are client-bound and are dropped here.
// - A rejected message changes nothing and sends nothing. The `Rejection` is
//   returned to the caller and logged at debug.
//
// Every accepted change is followed by a full broadcast: `SYNC_PLAYERS`, then
// `SYNC_STATE`, to every open sink and then to the host's local view. A sink
// that fails to take a message is logged and skipped; the reader thread for
// that connection reports the disconnect separately.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use codenames_game::{
    ActionContext, Applied, GameRules, GameState, Joined, Player, Rejection, RevealOutcome, Roster,
    WordPool,
};
use codenames_prng::GameRng;
use codenames_protocol::{Envelope, Message, PeerId};
use tracing::{debug, info, warn};

use crate::config::HostConfig;
use crate::transport::PeerSink;

/// Characters used in room codes. No 0/O or 1/I, so codes survive being
/// read aloud.
const ROOM_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const ROOM_CODE_LEN: usize = 6;

/// What an accepted message did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Handled {
    Joined(Joined),
    TeamChanged,
    RoleChanged,
    Game(Applied),
}

pub struct Session {
    room_id: PeerId,
    roster: Roster,
    state: GameState,
    rules: GameRules,
    words: WordPool,
    rng: GameRng,
    max_peers: usize,
    next_peer: u32,
    sinks: BTreeMap<PeerId, Box<dyn PeerSink>>,
    local_view: Option<Box<dyn PeerSink>>,
}

impl Session {
    pub fn new(config: &HostConfig) -> Self {
        let (mut rng, seed) = match config.seed {
            Some(seed) => (GameRng::new(seed), seed),
            None => GameRng::from_entropy(),
        };
        let room_id = mint_room_id(&mut rng);
        info!(room = %room_id, seed, "session created");
        Self {
            roster: Roster::with_host(room_id.clone(), &config.host_name),
            state: GameState::lobby(now_millis()),
            room_id,
            rules: config.rules,
            words: config.words.clone(),
            rng,
            max_peers: config.max_peers,
            next_peer: 0,
            sinks: BTreeMap::new(),
            local_view: None,
        }
    }

    /// The room code, which is also the host's own peer id.
    pub fn room_id(&self) -> &PeerId {
        &self.room_id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rules(&self) -> GameRules {
        self.rules
    }

    /// Open connections, not counting the host.
    pub fn peer_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.sinks.len() < self.max_peers
    }

    /// Hand out the next connection id: `<room>-1`, `<room>-2`, ...
    pub fn next_peer_id(&mut self) -> PeerId {
        self.next_peer += 1;
        PeerId::new(format!("{}-{}", self.room_id, self.next_peer))
    }

    /// Attach the host's own view. It receives every broadcast after the
    /// open sinks, and gets the current snapshot right away.
    pub fn set_local_view(&mut self, sink: Box<dyn PeerSink>) {
        self.local_view = Some(sink);
        self.broadcast();
    }

    /// A connection opened. Its sink joins the broadcast set; the peer is not
    /// in the roster until it sends `JOIN_REQUEST`.
    pub fn connect(&mut self, peer: PeerId, sink: Box<dyn PeerSink>) {
        debug!(%peer, "connection opened");
        if let Some(mut old) = self.sinks.insert(peer, sink) {
            old.close();
        }
    }

    /// A connection closed. Drops its sink and its seat, and broadcasts if
    /// the roster changed. The host's own seat is never removed this way.
    pub fn disconnect(&mut self, peer: &PeerId) -> Option<Player> {
        if let Some(mut sink) = self.sinks.remove(peer) {
            sink.close();
        }
        if peer == &self.room_id {
            return None;
        }
        let removed = self.roster.remove(peer)?;
        info!(%peer, name = %removed.name, "player left");
        self.broadcast();
        Some(removed)
    }

    /// Route one message from `origin`.
    pub fn handle(&mut self, origin: &PeerId, message: Message) -> Result<Handled, Rejection> {
        let kind = message.kind();
        let result = self.route(origin, message);
        match &result {
            Ok(handled) => {
                debug!(peer = %origin, kind, ?handled, "accepted");
                self.broadcast();
            }
            Err(rejection) => debug!(peer = %origin, kind, %rejection, "dropped"),
        }
        result
    }

    fn route(&mut self, origin: &PeerId, message: Message) -> Result<Handled, Rejection> {
        match message {
            Message::JoinRequest { name } => {
                let joined = self.roster.join(origin.clone(), &name);
                if joined == Joined::New {
                    info!(peer = %origin, %name, "player joined");
                }
                Ok(Handled::Joined(joined))
            }
            Message::ActionChangeTeam { team } => {
                self.roster.change_team(origin, team, self.state.status)?;
                Ok(Handled::TeamChanged)
            }
            Message::ActionChangeRole { team, role } => {
                self.roster
                    .change_role(origin, team, role, self.state.status)?;
                Ok(Handled::RoleChanged)
            }
            Message::SyncState(_) | Message::SyncPlayers(_) => Err(Rejection::Unexpected),
            other => {
                let action = other.game_action().ok_or(Rejection::Unexpected)?;
                let mut ctx = ActionContext {
                    rng: &mut self.rng,
                    words: &self.words,
                    rules: self.rules,
                    now: now_millis(),
                };
                let applied =
                    codenames_game::apply(&mut self.state, &self.roster, origin, action, &mut ctx)?;
                log_game_event(origin, &applied);
                Ok(Handled::Game(applied))
            }
        }
    }

    /// Send the full roster then the full state to everyone.
    fn broadcast(&mut self) {
        let players = Envelope::from_peer(
            Message::SyncPlayers(self.roster.players().to_vec()),
            self.room_id.clone(),
        );
        let state = Envelope::from_peer(
            Message::SyncState(self.state.clone()),
            self.room_id.clone(),
        );
        for (peer, sink) in &mut self.sinks {
            deliver_snapshot(peer, sink.as_mut(), &players, &state);
        }
        if let Some(local) = &mut self.local_view {
            deliver_snapshot(&self.room_id, local.as_mut(), &players, &state);
        }
    }

    /// Close every sink. Used on shutdown.
    pub fn close_all(&mut self) {
        for (_, mut sink) in std::mem::take(&mut self.sinks) {
            sink.close();
        }
    }
}

fn deliver_snapshot(peer: &PeerId, sink: &mut dyn PeerSink, players: &Envelope, state: &Envelope) {
    for envelope in [players, state] {
        if let Err(error) = sink.deliver(envelope) {
            warn!(%peer, %error, "sync delivery failed");
            return;
        }
    }
}

fn log_game_event(origin: &PeerId, applied: &Applied) {
    match applied {
        Applied::Started { starting_team } => {
            info!(peer = %origin, %starting_team, "game started");
        }
        Applied::Revealed {
            outcome: RevealOutcome::Won(team),
            ..
        } => info!(%team, "game won"),
        Applied::Reset => info!(peer = %origin, "back to lobby"),
        _ => {}
    }
}

fn mint_room_id(rng: &mut GameRng) -> PeerId {
    let code: String = (0..ROOM_CODE_LEN)
        .map(|_| char::from(ROOM_ALPHABET[rng.range_usize(0, ROOM_ALPHABET.len())]))
        .collect();
    PeerId::new(code)
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
