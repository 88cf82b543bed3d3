// Test-only wrappers for end-to-end multiplayer tests.
//
// `TestHost` wraps a real `HostHandle` (the server and the host player's
// seat); `TestGameClient` wraps a real `NetClient` plus the `Replica` it
// feeds. Together they exercise the full path:
// client action → TCP → host routing → reducer → broadcast → every replica.
//
// The only test-specific code here is the synchronous polling (blocking
// loops that wait until a replica satisfies a condition). All networking and
// game logic uses the same code paths as the `codenames` binary.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

use codenames_host::{
    ClientEvent, HostConfig, HostHandle, NetClient, Replica, TransportError, start_host,
};
use codenames_protocol::{Message, PeerId};

/// Default timeout for blocking poll operations.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep duration between poll attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A running host plus the host player's view.
pub struct TestHost {
    handle: HostHandle,
    pub addr: SocketAddr,
}

impl TestHost {
    /// Start a host on a free localhost port.
    pub fn start(config: HostConfig) -> Self {
        let (handle, addr) =
            start_host(HostConfig { port: 0, ..config }).expect("start_host failed");
        Self { handle, addr }
    }

    pub fn room(&self) -> PeerId {
        self.handle.room_id().clone()
    }

    /// Act as the host player.
    pub fn send(&self, message: Message) {
        self.handle.submit(message).expect("host loop is gone");
    }

    pub fn view(&self) -> &Replica {
        self.handle.view()
    }

    /// Block until the host's view satisfies `done`.
    pub fn poll_until(&mut self, what: &str, done: impl Fn(&Replica) -> bool) {
        let start = Instant::now();
        loop {
            self.handle.poll();
            if done(self.handle.view()) {
                return;
            }
            assert!(start.elapsed() < POLL_TIMEOUT, "host timed out waiting for {what}");
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn stop(self) {
        self.handle.stop();
    }
}

/// A joined player: a real connection plus its replica.
pub struct TestGameClient {
    client: NetClient,
    pub view: Replica,
}

impl TestGameClient {
    /// Dial `room` at `addr`, returning the handshake error if refused.
    pub fn try_connect(addr: SocketAddr, room: &PeerId) -> Result<Self, TransportError> {
        let client = NetClient::connect(addr, room)?;
        let view = Replica::new(client.peer_id().clone());
        Ok(Self { client, view })
    }

    /// Dial and ask for a seat under `name`. Waits until the roster shows it.
    pub fn join(addr: SocketAddr, room: &PeerId, name: &str) -> Self {
        let mut client = Self::try_connect(addr, room).expect("TestGameClient::connect failed");
        client.client.join(name).expect("send join failed");
        client.poll_until("own seat", |view| view.me().is_some() && view.is_synced());
        client
    }

    pub fn id(&self) -> &PeerId {
        self.client.peer_id()
    }

    pub fn send(&mut self, message: Message) {
        self.client.send(message).expect("send failed");
    }

    /// Apply everything pending. Panics if the host went away.
    pub fn drain(&mut self) {
        for event in self.client.poll() {
            match event {
                ClientEvent::Message(message) => {
                    self.view.apply(message);
                }
                ClientEvent::HostLost { reason } => panic!("lost the host: {reason}"),
            }
        }
    }

    /// Block until the replica satisfies `done`.
    pub fn poll_until(&mut self, what: &str, done: impl Fn(&Replica) -> bool) {
        let start = Instant::now();
        loop {
            self.drain();
            if done(&self.view) {
                return;
            }
            assert!(start.elapsed() < POLL_TIMEOUT, "{} timed out waiting for {what}", self.id());
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Block until the connection reports the host gone. Returns the reason.
    pub fn poll_until_host_lost(&mut self) -> String {
        let start = Instant::now();
        loop {
            for event in self.client.poll() {
                match event {
                    ClientEvent::Message(message) => {
                        self.view.apply(message);
                    }
                    ClientEvent::HostLost { reason } => {
                        self.view.clear();
                        return reason;
                    }
                }
            }
            assert!(start.elapsed() < POLL_TIMEOUT, "timed out waiting for host loss");
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn disconnect(&mut self) {
        self.client.disconnect();
    }
}
