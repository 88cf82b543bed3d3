// CLI entry point: host a room or join one, then play from the terminal.
//
// `codenames host` binds a listener, prints the room code to share, and
// seats you as the host. `codenames join <ADDR> <ROOM>` dials a host and asks
// for a seat. Both then read commands from stdin (see `console::HELP`) and
// reprint the table after every change.
//
// Logs go to stderr through `tracing-subscriber`; set `RUST_LOG=debug` to see
// dropped actions and connection details.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use codenames_host::config::{Cli, Command, HostArgs, JoinArgs};
use codenames_host::console::{self, ClientSeat, HELP};
use codenames_host::{NetClient, start_host};
use codenames_protocol::PeerId;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Host(args) => host(args),
        Command::Join(args) => join(args),
    }
}

fn host(args: HostArgs) -> Result<()> {
    let config = args.into_config().context("invalid host configuration")?;
    let (mut handle, addr) = start_host(config).context("failed to start host")?;

    println!("Hosting room {} on {addr}", handle.room_id());
    println!("Others join with: codenames join {addr} {}", handle.room_id());
    println!("{HELP}");

    let lines = stdin_lines();
    let result = console::run(&mut handle, &lines, &mut io::stdout());
    handle.stop();
    result.context("host stopped unexpectedly")
}

fn join(args: JoinArgs) -> Result<()> {
    let room = PeerId::new(args.room.trim().to_uppercase());
    let client = NetClient::connect(args.addr.as_str(), &room)
        .with_context(|| format!("could not join room {room} at {}", args.addr))?;
    println!("Joined room {} as {}", client.room_id(), client.peer_id());
    println!("{HELP}");

    let mut seat = ClientSeat::new(client);
    seat.client_mut()
        .join(&args.name)
        .context("lost the host while joining")?;

    let lines = stdin_lines();
    let result = console::run(&mut seat, &lines, &mut io::stdout());
    seat.client_mut().disconnect();
    result.context("disconnected from the host")
}

/// Read stdin on a background thread so the main loop can keep polling the
/// network between lines.
fn stdin_lines() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
