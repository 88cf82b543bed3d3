// End-to-end tests for the replicated game.
//
// Each test starts a real host, connects real `NetClient`s (through
// `TestGameClient`), and checks that every action travels client → host →
// reducer → broadcast and lands identically in every replica, the host's own
// view included.

use codenames_game::{CardKind, GameState, GameStatus, PlayerTeam, Role, Team, TurnPhase};
use codenames_host::{HostConfig, TransportError};
use codenames_protocol::handshake::REFUSED_WRONG_ROOM;
use codenames_protocol::{Message, PeerId};
use multiplayer_tests::{TestGameClient, TestHost};

fn test_config() -> HostConfig {
    HostConfig {
        seed: Some(2024),
        ..HostConfig::default()
    }
}

/// A host with four seated players: a spymaster and an operative per team.
struct Table {
    host: TestHost,
    red_spy: TestGameClient,
    red_op: TestGameClient,
    blue_spy: TestGameClient,
    blue_op: TestGameClient,
}

fn seat(host: &TestHost, name: &str, team: PlayerTeam, role: Role) -> TestGameClient {
    let mut client = TestGameClient::join(host.addr, &host.room(), name);
    client.send(Message::ActionChangeTeam { team });
    client.send(Message::ActionChangeRole { team, role });
    client.poll_until("seat", |view| {
        view.me().is_some_and(|me| me.team == team && me.role == role)
    });
    client
}

fn seated_table(config: HostConfig) -> Table {
    let host = TestHost::start(config);
    let red_spy = seat(&host, "Rae", PlayerTeam::Red, Role::Spymaster);
    let red_op = seat(&host, "Rob", PlayerTeam::Red, Role::Operative);
    let blue_spy = seat(&host, "Bea", PlayerTeam::Blue, Role::Spymaster);
    let blue_op = seat(&host, "Ben", PlayerTeam::Blue, Role::Operative);
    Table {
        host,
        red_spy,
        red_op,
        blue_spy,
        blue_op,
    }
}

impl Table {
    fn clients(&mut self) -> [&mut TestGameClient; 4] {
        [
            &mut self.red_spy,
            &mut self.red_op,
            &mut self.blue_spy,
            &mut self.blue_op,
        ]
    }

    /// Wait until every replica, host included, satisfies `done`.
    fn settle(&mut self, what: &str, done: impl Fn(&GameState) -> bool + Copy) {
        self.host
            .poll_until(what, |view| view.state().is_some_and(done));
        for client in self.clients() {
            client.poll_until(what, |view| view.state().is_some_and(done));
        }
    }

    fn start(&mut self) -> Team {
        self.host.send(Message::ActionStartGame);
        self.settle("game start", |s| s.status == GameStatus::Playing);
        self.host.view().state().unwrap().current_turn
    }

    fn spymaster(&mut self, team: Team) -> &mut TestGameClient {
        match team {
            Team::Red => &mut self.red_spy,
            Team::Blue => &mut self.blue_spy,
        }
    }

    fn operative(&mut self, team: Team) -> &mut TestGameClient {
        match team {
            Team::Red => &mut self.red_op,
            Team::Blue => &mut self.blue_op,
        }
    }

    fn stop(self) {
        self.host.stop();
    }
}

fn unrevealed(state: &GameState, kind: CardKind) -> Vec<usize> {
    state
        .cards
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind == kind && !c.revealed)
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Test scenarios
// ---------------------------------------------------------------------------

#[test]
fn wrong_room_is_refused() {
    let host = TestHost::start(test_config());
    let result = TestGameClient::try_connect(host.addr, &PeerId::new("ZZZZZZ"));
    match result {
        Err(TransportError::Refused { reason }) => assert_eq!(reason, REFUSED_WRONG_ROOM),
        Err(other) => panic!("expected a refusal, got {other}"),
        Ok(_) => panic!("connected to the wrong room"),
    }
    host.stop();
}

#[test]
fn join_syncs_roster_everywhere() {
    let mut host = TestHost::start(test_config());
    let mut alice = TestGameClient::join(host.addr, &host.room(), "Alice");
    let bob = TestGameClient::join(host.addr, &host.room(), "Bob");

    alice.poll_until("bob", |view| view.players().len() == 3);
    host.poll_until("bob", |view| view.players().len() == 3);

    assert_eq!(alice.view.players(), bob.view.players());
    assert_eq!(host.view().players(), bob.view.players());
    assert!(alice.view.players()[0].is_host);
    assert_eq!(alice.view.me().unwrap().name, "Alice");
    assert_eq!(bob.view.me().unwrap().team, PlayerTeam::Spectator);

    host.stop();
}

#[test]
fn full_game_to_a_win() {
    let mut table = seated_table(test_config());
    let team = table.start();

    let state = table.host.view().state().unwrap().clone();
    let own = unrevealed(&state, team.into());
    assert_eq!(own.len(), 9, "starting team holds nine cards");

    let count = u32::try_from(own.len()).unwrap();
    table.spymaster(team).send(Message::ActionSubmitHint {
        word: "EVERYTHING".into(),
        count,
    });
    table.settle("hint", |s| s.turn_phase == TurnPhase::Guessing);

    for (n, index) in own.iter().copied().enumerate() {
        table.operative(team).send(Message::ActionReveal { index });
        let expected = n + 1;
        table
            .operative(team)
            .poll_until("reveal", |view| {
                view.state()
                    .is_some_and(|s| s.cards.iter().filter(|c| c.revealed).count() == expected)
            });
    }

    table.settle("win", |s| s.status.is_over());
    let final_state = table.host.view().state().unwrap().clone();
    assert_eq!(final_state.winner, Some(team));
    assert_eq!(final_state.status, GameStatus::won_by(team));
    for client in table.clients() {
        assert_eq!(client.view.state(), Some(&final_state));
    }
    table.stop();
}

#[test]
fn assassin_loses_the_game() {
    let mut table = seated_table(test_config());
    let team = table.start();
    let state = table.host.view().state().unwrap().clone();
    let assassin = unrevealed(&state, CardKind::Assassin)[0];

    table.spymaster(team).send(Message::ActionSubmitHint {
        word: "DANGER".into(),
        count: 1,
    });
    table.settle("hint", |s| s.turn_phase == TurnPhase::Guessing);
    table
        .operative(team)
        .send(Message::ActionReveal { index: assassin });

    table.settle("game over", |s| s.status.is_over());
    assert_eq!(
        table.host.view().state().unwrap().winner,
        Some(team.other())
    );
    table.stop();
}

#[test]
fn misses_and_end_turn_pass_the_turn() {
    let mut table = seated_table(test_config());
    let team = table.start();
    let state = table.host.view().state().unwrap().clone();
    let neutral = unrevealed(&state, CardKind::Neutral)[0];

    table.spymaster(team).send(Message::ActionSubmitHint {
        word: "MAYBE".into(),
        count: 2,
    });
    table.settle("hint", |s| s.turn_phase == TurnPhase::Guessing);
    table
        .operative(team)
        .send(Message::ActionReveal { index: neutral });
    table.settle("miss", move |s| s.current_turn == team.other());

    let other = team.other();
    table.spymaster(other).send(Message::ActionSubmitHint {
        word: "NOTHING".into(),
        count: 1,
    });
    table.settle("second hint", |s| s.turn_phase == TurnPhase::Guessing);
    table.operative(other).send(Message::ActionEndTurn);
    table.settle("end turn", move |s| {
        s.current_turn == team && s.turn_phase == TurnPhase::Hinting
    });
    table.stop();
}

#[test]
fn racing_reveals_apply_once() {
    let mut table = seated_table(test_config());
    let team = table.start();
    let state = table.host.view().state().unwrap().clone();
    let target = unrevealed(&state, team.into())[0];

    table.spymaster(team).send(Message::ActionSubmitHint {
        word: "TWICE".into(),
        count: 3,
    });
    table.settle("hint", |s| s.turn_phase == TurnPhase::Guessing);

    // The same card twice in a row: the second is rejected by the host.
    table
        .operative(team)
        .send(Message::ActionReveal { index: target });
    table
        .operative(team)
        .send(Message::ActionReveal { index: target });
    table.settle("reveal", move |s| s.cards[target].revealed);

    // Only one guess was counted, and every replica agrees.
    let host_state = table.host.view().state().unwrap().clone();
    assert_eq!(host_state.guesses_made, 1);
    for client in table.clients() {
        client.poll_until("agreement", |view| view.state() == Some(&host_state));
    }
    table.stop();
}

#[test]
fn disconnect_mid_game_keeps_playing() {
    let mut table = seated_table(test_config());
    table.start();
    let before = table.host.view().state().unwrap().clone();

    table.blue_op.disconnect();
    table
        .host
        .poll_until("departure", |view| view.players().len() == 4);
    table
        .red_spy
        .poll_until("departure", |view| view.players().len() == 4);
    assert_eq!(table.host.view().state(), Some(&before));
    assert!(table.red_spy.view.players().iter().all(|p| p.name != "Ben"));
    table.stop();
}

#[test]
fn host_resets_to_lobby() {
    let mut table = seated_table(test_config());
    table.start();
    table.host.send(Message::ActionReset);
    table.settle("reset", |s| s.status == GameStatus::Lobby && s.cards.is_empty());

    // Seats survive the reset, so the same table can deal again.
    assert_eq!(table.host.view().players().len(), 5);
    table.start();
    table.stop();
}

#[test]
fn client_observes_host_loss() {
    let host = TestHost::start(test_config());
    let mut alice = TestGameClient::join(host.addr, &host.room(), "Alice");
    assert!(alice.view.is_synced());

    host.stop();
    let reason = alice.poll_until_host_lost();
    assert!(!reason.is_empty());
    assert!(!alice.view.is_synced());
}
