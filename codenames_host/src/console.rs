// Line-oriented terminal front end.
//
// Three pieces, kept apart so they can be tested without a terminal:
// - `parse_command` turns one input line into a `Command`, using the current
//   view only to fill in what the player did not type (their team for
//   `role`, a board position for `reveal <word>`).
// - `render_*` produce the roster and board as plain text. Card colors are
//   shown to spymasters, and to everyone once the game is over.
// - `run` is the loop the binary drives: read lines from a channel, send
//   actions through a `Seat`, and reprint the table whenever the view changes.
//
// A `Seat` is either the host's own handle or a `ClientSeat` wrapping a
// dialed connection. Both push actions to the same routing and read back
// through a `Replica`.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use codenames_game::{CardKind, GameState, GameStatus, Player, PlayerTeam, Role, Team, TurnPhase};
use codenames_protocol::{Message, PeerId};
use derive_more::{Display, Error};
use tracing::warn;

use crate::client::{ClientEvent, NetClient};
use crate::error::TransportError;
use crate::replica::Replica;
use crate::server::HostHandle;

const INPUT_TICK: Duration = Duration::from_millis(100);
const BOARD_COLUMNS: usize = 5;

pub const HELP: &str = "\
commands:
  team red|blue|spectator   switch team (lobby only)
  role operative|spymaster  switch role on your team (lobby only)
  name <name>               change your display name
  start                     deal a board and start (host only)
  hint <word> <count>       give a clue (spymaster)
  reveal <n|word>           uncover a card (operative)
  end                       stop guessing
  reset                     back to the lobby (host only)
  players | board | help | quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Send(Message),
    Players,
    Board,
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum CommandError {
    #[display("unknown command `{input}`, try `help`")]
    Unknown { input: String },
    #[display("usage: {usage}")]
    Usage { usage: &'static str },
    #[display("pick a team before choosing a role")]
    NoTeam,
    #[display("no card `{word}` on the board")]
    NoSuchCard { word: String },
}

/// Parse one input line. Blank lines give `Ok(None)`.
pub fn parse_command(line: &str, view: &Replica) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let message = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("team", [team]) => Message::ActionChangeTeam {
            team: parse_team(team).ok_or(CommandError::Usage {
                usage: "team red|blue|spectator",
            })?,
        },
        ("team", _) => {
            return Err(CommandError::Usage {
                usage: "team red|blue|spectator",
            });
        }
        ("role", [role]) => {
            let role = parse_role(role).ok_or(CommandError::Usage {
                usage: "role operative|spymaster",
            })?;
            let team = view
                .my_team()
                .filter(|t| *t != PlayerTeam::Spectator)
                .ok_or(CommandError::NoTeam)?;
            Message::ActionChangeRole { team, role }
        }
        ("role", _) => {
            return Err(CommandError::Usage {
                usage: "role operative|spymaster",
            });
        }
        ("name", [_, ..]) => Message::JoinRequest {
            name: args.join(" "),
        },
        ("name", []) => return Err(CommandError::Usage { usage: "name <name>" }),
        ("start", []) => Message::ActionStartGame,
        ("hint", [word, count]) => Message::ActionSubmitHint {
            word: (*word).to_string(),
            count: count.parse().map_err(|_| CommandError::Usage {
                usage: "hint <word> <count>",
            })?,
        },
        ("hint", _) => {
            return Err(CommandError::Usage {
                usage: "hint <word> <count>",
            });
        }
        ("reveal", [target]) => Message::ActionReveal {
            index: parse_card(target, view)?,
        },
        ("reveal", _) => {
            return Err(CommandError::Usage {
                usage: "reveal <n|word>",
            });
        }
        ("end", []) => Message::ActionEndTurn,
        ("reset", []) => Message::ActionReset,
        ("players", []) => return Ok(Some(Command::Players)),
        ("board", []) => return Ok(Some(Command::Board)),
        ("help" | "?", _) => return Ok(Some(Command::Help)),
        ("quit" | "exit", []) => return Ok(Some(Command::Quit)),
        _ => {
            return Err(CommandError::Unknown {
                input: line.trim().to_string(),
            });
        }
    };
    Ok(Some(Command::Send(message)))
}

fn parse_team(text: &str) -> Option<PlayerTeam> {
    match text.to_ascii_lowercase().as_str() {
        "red" | "r" => Some(PlayerTeam::Red),
        "blue" | "b" => Some(PlayerTeam::Blue),
        "spectator" | "spec" | "s" => Some(PlayerTeam::Spectator),
        _ => None,
    }
}

fn parse_role(text: &str) -> Option<Role> {
    match text.to_ascii_lowercase().as_str() {
        "operative" | "op" | "o" => Some(Role::Operative),
        "spymaster" | "spy" | "s" => Some(Role::Spymaster),
        _ => None,
    }
}

/// Board positions are shown 1-based; a word picks its card by name.
fn parse_card(target: &str, view: &Replica) -> Result<usize, CommandError> {
    if let Ok(n) = target.parse::<usize>() {
        return n.checked_sub(1).ok_or(CommandError::Usage {
            usage: "reveal <n|word>",
        });
    }
    let folded = target.to_uppercase();
    view.state()
        .and_then(|s| s.cards.iter().position(|c| c.word.to_uppercase() == folded))
        .ok_or_else(|| CommandError::NoSuchCard {
            word: target.to_string(),
        })
}

/// Roster grouped by team, marking the host and the viewer.
pub fn render_players(players: &[Player], me: Option<&PeerId>) -> String {
    let mut out = String::new();
    for (label, team) in [
        ("Red", PlayerTeam::Red),
        ("Blue", PlayerTeam::Blue),
        ("Spectators", PlayerTeam::Spectator),
    ] {
        let names: Vec<String> = players
            .iter()
            .filter(|p| p.team == team)
            .map(|p| {
                let mut name = p.name.clone();
                if p.role == Role::Spymaster {
                    name.push_str(" (spymaster)");
                }
                if p.is_host {
                    name.push_str(" [host]");
                }
                if Some(&p.id) == me {
                    name.push_str(" <- you");
                }
                name
            })
            .collect();
        let _ = writeln!(out, "{label}: {}", names.join(", "));
    }
    out
}

/// One line describing where the game stands.
pub fn render_status(state: &GameState) -> String {
    match state.status {
        GameStatus::Lobby => "In the lobby.".to_string(),
        GameStatus::RedWin | GameStatus::BlueWin => {
            let winner = state.winner.map(team_label).unwrap_or("Nobody");
            format!("{winner} wins!")
        }
        GameStatus::Playing => {
            let team = team_label(state.current_turn);
            let left = format!(
                "Red {} left, Blue {} left",
                state.remaining(Team::Red),
                state.remaining(Team::Blue)
            );
            match (state.turn_phase, &state.current_hint) {
                (TurnPhase::Guessing, Some(hint)) => format!(
                    "{team} guessing: {} {} ({} guessed). {left}.",
                    hint.word, hint.count, state.guesses_made
                ),
                _ => format!("{team} spymaster to give a hint. {left}."),
            }
        }
    }
}

/// The board as a grid. `reveal_all` shows the color of unrevealed cards.
pub fn render_board(state: &GameState, reveal_all: bool) -> String {
    let mut out = String::new();
    for (row_start, row) in state.cards.chunks(BOARD_COLUMNS).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, card)| {
                let n = row_start * BOARD_COLUMNS + col + 1;
                let tag = kind_tag(card.kind);
                let marker = if card.revealed {
                    format!("[{tag}]")
                } else if reveal_all {
                    format!("({tag})")
                } else {
                    "   ".to_string()
                };
                let word = if card.revealed {
                    card.word.to_lowercase()
                } else {
                    card.word.clone()
                };
                format!("{n:>2} {marker} {word:<12}")
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join(" ").trim_end());
    }
    out
}

/// Status, board and roster for `view`.
pub fn render(view: &Replica) -> String {
    let mut out = String::new();
    if let Some(state) = view.state() {
        let _ = writeln!(out, "{}", render_status(state));
        if !state.cards.is_empty() {
            out.push_str(&render_board(state, view.sees_all_cards()));
        }
    }
    out.push_str(&render_players(view.players(), view.my_id()));
    out
}

fn team_label(team: Team) -> &'static str {
    match team {
        Team::Red => "Red",
        Team::Blue => "Blue",
    }
}

fn kind_tag(kind: CardKind) -> char {
    match kind {
        CardKind::Red => 'R',
        CardKind::Blue => 'B',
        CardKind::Neutral => '-',
        CardKind::Assassin => 'X',
    }
}

/// A player's place at the table.
pub trait Seat {
    fn send(&mut self, message: Message) -> Result<(), TransportError>;

    /// Take in pending updates. Returns whether the view changed, or an
    /// error once the host is gone.
    fn refresh(&mut self) -> Result<bool, TransportError>;

    fn view(&self) -> &Replica;
}

impl Seat for HostHandle {
    fn send(&mut self, message: Message) -> Result<(), TransportError> {
        self.submit(message)
    }

    fn refresh(&mut self) -> Result<bool, TransportError> {
        Ok(self.poll())
    }

    fn view(&self) -> &Replica {
        HostHandle::view(self)
    }
}

/// A dialed connection plus its replica.
pub struct ClientSeat {
    client: NetClient,
    view: Replica,
}

impl ClientSeat {
    pub fn new(client: NetClient) -> Self {
        let view = Replica::new(client.peer_id().clone());
        Self { client, view }
    }

    pub fn client_mut(&mut self) -> &mut NetClient {
        &mut self.client
    }
}

impl Seat for ClientSeat {
    fn send(&mut self, message: Message) -> Result<(), TransportError> {
        self.client.send(message)
    }

    fn refresh(&mut self) -> Result<bool, TransportError> {
        let mut changed = false;
        for event in self.client.poll() {
            match event {
                ClientEvent::Message(message) => changed |= self.view.apply(message),
                ClientEvent::HostLost { reason } => {
                    warn!(%reason, "lost the host");
                    self.view.clear();
                    return Err(TransportError::Closed);
                }
            }
        }
        Ok(changed)
    }

    fn view(&self) -> &Replica {
        &self.view
    }
}

/// Drive a seat from input lines until `quit`, end of input, or host loss.
pub fn run<S: Seat, W: Write>(
    seat: &mut S,
    lines: &Receiver<String>,
    out: &mut W,
) -> Result<(), TransportError> {
    loop {
        match lines.recv_timeout(INPUT_TICK) {
            Ok(line) => match parse_command(&line, seat.view()) {
                Ok(Some(Command::Send(message))) => seat.send(message)?,
                Ok(Some(Command::Players)) => {
                    write!(out, "{}", render_players(seat.view().players(), seat.view().my_id()))?;
                }
                Ok(Some(Command::Board)) => write!(out, "{}", render(seat.view()))?,
                Ok(Some(Command::Help)) => writeln!(out, "{HELP}")?,
                Ok(Some(Command::Quit)) => return Ok(()),
                Ok(None) => {}
                Err(error) => writeln!(out, "{error}")?,
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
        if seat.refresh()? {
            write!(out, "\n{}", render(seat.view()))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use codenames_game::{Card, Hint};

    use super::*;

    fn player(id: &str, name: &str, team: PlayerTeam, role: Role, is_host: bool) -> Player {
        Player {
            id: PeerId::new(id),
            name: name.into(),
            team,
            role,
            is_host,
        }
    }

    fn board_state() -> GameState {
        let mut state = GameState::lobby(1);
        state.status = GameStatus::Playing;
        state.current_turn = Team::Blue;
        state.cards = ["APPLE", "BERLIN", "CLOCK", "DRAGON", "EAGLE", "FORK"]
            .iter()
            .zip([
                CardKind::Red,
                CardKind::Blue,
                CardKind::Neutral,
                CardKind::Assassin,
                CardKind::Blue,
                CardKind::Red,
            ])
            .map(|(word, kind)| Card {
                word: (*word).into(),
                kind,
                revealed: false,
            })
            .collect();
        state.cards[1].revealed = true;
        state
    }

    fn view_as(id: &str, team: PlayerTeam, role: Role) -> Replica {
        let mut view = Replica::new(PeerId::new(id));
        view.apply(Message::SyncPlayers(vec![
            player("host", "Hana", PlayerTeam::Spectator, Role::Operative, true),
            player(id, "Me", team, role, false),
        ]));
        view.apply(Message::SyncState(board_state()));
        view
    }

    fn send(line: &str, view: &Replica) -> Message {
        match parse_command(line, view) {
            Ok(Some(Command::Send(message))) => message,
            other => panic!("{line:?} parsed to {other:?}"),
        }
    }

    #[test]
    fn parses_lobby_commands() {
        let view = view_as("me", PlayerTeam::Red, Role::Operative);
        assert_eq!(
            send("team blue", &view),
            Message::ActionChangeTeam {
                team: PlayerTeam::Blue
            }
        );
        assert_eq!(
            send("ROLE spymaster", &view),
            Message::ActionChangeRole {
                team: PlayerTeam::Red,
                role: Role::Spymaster
            }
        );
        assert_eq!(
            send("name Ada Lovelace", &view),
            Message::JoinRequest {
                name: "Ada Lovelace".into()
            }
        );
        assert_eq!(send("start", &view), Message::ActionStartGame);
        assert_eq!(send("reset", &view), Message::ActionReset);
    }

    #[test]
    fn role_needs_a_team() {
        let view = view_as("me", PlayerTeam::Spectator, Role::Operative);
        assert_eq!(
            parse_command("role spymaster", &view),
            Err(CommandError::NoTeam)
        );
    }

    #[test]
    fn parses_play_commands() {
        let view = view_as("me", PlayerTeam::Blue, Role::Operative);
        assert_eq!(
            send("hint ocean 3", &view),
            Message::ActionSubmitHint {
                word: "ocean".into(),
                count: 3
            }
        );
        assert_eq!(send("reveal 1", &view), Message::ActionReveal { index: 0 });
        assert_eq!(send("reveal eagle", &view), Message::ActionReveal { index: 4 });
        assert_eq!(send("end", &view), Message::ActionEndTurn);
    }

    #[test]
    fn reveal_by_word_folds_accented_case() {
        let mut view = view_as("me", PlayerTeam::Blue, Role::Operative);
        let mut state = board_state();
        state.cards[5].word = "ÉTÉ".into();
        view.apply(Message::SyncState(state));
        assert_eq!(send("reveal été", &view), Message::ActionReveal { index: 5 });
    }

    #[test]
    fn bad_input_explains_itself() {
        let view = view_as("me", PlayerTeam::Blue, Role::Operative);
        assert!(matches!(
            parse_command("hint ocean many", &view),
            Err(CommandError::Usage { .. })
        ));
        assert!(matches!(
            parse_command("hint two words 2", &view),
            Err(CommandError::Usage { .. })
        ));
        assert!(matches!(
            parse_command("reveal 0", &view),
            Err(CommandError::Usage { .. })
        ));
        assert_eq!(
            parse_command("reveal zebra", &view),
            Err(CommandError::NoSuchCard {
                word: "zebra".into()
            })
        );
        assert!(matches!(
            parse_command("dance", &view),
            Err(CommandError::Unknown { .. })
        ));
        assert_eq!(parse_command("   ", &view), Ok(None));
        assert_eq!(parse_command("quit", &view), Ok(Some(Command::Quit)));
    }

    #[test]
    fn operatives_see_only_revealed_colors() {
        let board = render_board(&board_state(), false);
        assert!(board.contains("[B] berlin"));
        assert!(!board.contains("(X)"));
        assert!(board.contains(" 4     DRAGON"));
        // Five per row.
        assert_eq!(board.lines().count(), 2);
    }

    #[test]
    fn spymasters_see_every_color() {
        let view = view_as("me", PlayerTeam::Red, Role::Spymaster);
        let text = render(&view);
        assert!(text.contains("(X) DRAGON"));
        assert!(text.contains("(R) APPLE"));
        assert!(text.contains("[B] berlin"));
    }

    #[test]
    fn status_lines() {
        let mut state = board_state();
        assert!(render_status(&state).starts_with("Blue spymaster to give a hint"));
        state.turn_phase = TurnPhase::Guessing;
        state.current_hint = Some(Hint {
            word: "FRUIT".into(),
            count: 2,
        });
        assert!(render_status(&state).starts_with("Blue guessing: FRUIT 2 (0 guessed)"));
        state.declare_winner(Team::Red);
        assert_eq!(render_status(&state), "Red wins!");
        assert_eq!(render_status(&GameState::lobby(0)), "In the lobby.");
    }

    #[test]
    fn roster_marks_host_and_viewer() {
        let players = vec![
            player("h", "Hana", PlayerTeam::Spectator, Role::Operative, true),
            player("a", "Alice", PlayerTeam::Red, Role::Spymaster, false),
            player("b", "Bob", PlayerTeam::Red, Role::Operative, false),
        ];
        let text = render_players(&players, Some(&PeerId::new("b")));
        assert!(text.contains("Red: Alice (spymaster), Bob <- you"));
        assert!(text.contains("Blue: \n"));
        assert!(text.contains("Spectators: Hana [host]"));
    }

    struct FakeSeat {
        view: Replica,
        sent: Vec<Message>,
        pending: Vec<Message>,
        lost: bool,
    }

    impl Seat for FakeSeat {
        fn send(&mut self, message: Message) -> Result<(), TransportError> {
            self.sent.push(message);
            Ok(())
        }

        fn refresh(&mut self) -> Result<bool, TransportError> {
            if self.lost {
                return Err(TransportError::Closed);
            }
            let mut changed = false;
            for message in self.pending.drain(..) {
                changed |= self.view.apply(message);
            }
            Ok(changed)
        }

        fn view(&self) -> &Replica {
            &self.view
        }
    }

    #[test]
    fn run_sends_actions_and_stops_on_quit() {
        let mut seat = FakeSeat {
            view: view_as("me", PlayerTeam::Red, Role::Operative),
            sent: Vec::new(),
            pending: vec![Message::SyncState(GameState::lobby(7))],
            lost: false,
        };
        let (tx, rx) = mpsc::channel();
        for line in ["team blue", "bogus", "quit", "start"] {
            tx.send(line.to_string()).unwrap();
        }
        let mut out = Vec::new();
        run(&mut seat, &rx, &mut out).unwrap();

        assert_eq!(
            seat.sent,
            vec![Message::ActionChangeTeam {
                team: PlayerTeam::Blue
            }]
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("In the lobby."));
        assert!(text.contains("unknown command `bogus`"));
    }

    #[test]
    fn run_reports_host_loss() {
        let mut seat = FakeSeat {
            view: Replica::default(),
            sent: Vec::new(),
            pending: Vec::new(),
            lost: true,
        };
        let (_tx, rx) = mpsc::channel();
        let err = run(&mut seat, &rx, &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }
}
