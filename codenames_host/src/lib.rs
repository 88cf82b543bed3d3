// codenames_host: the authoritative host and everything that talks to it.
//
// The game rules live in `codenames_game` and never touch a socket. This
// crate wraps them in a session that owns the canonical state, routes peer
// messages into the reducer, and rebroadcasts the full snapshot after every
// accepted change. It also carries the concrete TCP transport on both ends
// and a small terminal front end.
//
// Module overview:
// - `session.rs`:   `Session` aggregate (roster + state + rng + sinks). Host
//                   routing and broadcast. No I/O of its own beyond the
//                   sinks it is handed.
// - `transport.rs`: `PeerSink` trait with TCP and channel implementations,
//                   plus JSON-over-frame send/receive helpers.
// - `server.rs`:    TCP listener, reader threads (one per peer), and the
//                   main event loop that owns the `Session`. Same
//                   thread-per-reader + `mpsc` design on the host side as
//                   `client.rs` uses on the joining side.
// - `client.rs`:    `NetClient`, a dialed connection to a host with a
//                   background reader thread.
// - `replica.rs`:   Client-side read-only copy of roster + state, replaced
//                   wholesale by each sync message, plus view queries.
// - `config.rs`:    `HostConfig` and the `clap` command line.
// - `console.rs`:   Text command parser and board/roster renderer used by
//                   the `codenames` binary.
// - `error.rs`:     `TransportError`.

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod replica;
pub mod server;
pub mod session;
pub mod transport;

pub use client::{ClientEvent, NetClient};
pub use config::HostConfig;
pub use error::TransportError;
pub use replica::Replica;
pub use server::{HostHandle, start_host};
pub use session::{Handled, Session};
pub use transport::{ChannelSink, PeerSink, TcpSink};
