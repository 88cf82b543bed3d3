// TCP server and main event loop for a hosted room.
//
// Architecture: thread-per-reader with a central `mpsc` channel.
//
// - **Listener thread** (`TcpListener::accept()` loop): accepts new TCP
//   connections and hands each to a short-lived dial thread.
// - **Dial threads** (one per connection): read the `DialRequest` under
//   `HANDSHAKE_TIMEOUT` and send `InternalEvent::NewConnection` to the main
//   thread, which accepts or refuses it. A peer that never dials only ties
//   up its own thread.
// - **Reader threads** (one per peer): decode framed `Envelope`s and send
//   `InternalEvent::MessageFrom` tagged with the peer id assigned at
//   handshake. On EOF or a broken stream they send
//   `InternalEvent::Disconnected` and exit.
// - **Main thread**: owns the `Session` and dispatches events one at a time,
//   so every message runs to completion before the next is looked at. The
//   host's own terminal input arrives as `InternalEvent::Local` through the
//   same channel, so local and remote actions are serialized together.
//
// The main thread is the only writer to peer streams (via the session's
// sinks). The host's view of the game comes back through a `ChannelSink`
// that `HostHandle::poll` drains into a `Replica`.
//
// Shutdown: `HostHandle::stop` clears `keep_running`; the main loop notices
// within one `recv_timeout` tick, closes every connection and exits.

use std::io::{self, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use codenames_protocol::{
    DialReply, DialRequest, Envelope, Message, PROTOCOL_VERSION, PeerId,
    handshake::{REFUSED_ROOM_FULL, REFUSED_VERSION, REFUSED_WRONG_ROOM},
};
use tracing::{debug, info, warn};

use crate::config::HostConfig;
use crate::error::TransportError;
use crate::replica::Replica;
use crate::session::Session;
use crate::transport::{ChannelSink, TcpSink, recv_json, send_json};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const LOOP_TICK: Duration = Duration::from_millis(50);

/// Events sent from listener/reader threads and the host handle to the main
/// thread.
enum InternalEvent {
    NewConnection {
        stream: TcpStream,
        reader: BufReader<TcpStream>,
        dial: DialRequest,
    },
    MessageFrom { peer: PeerId, envelope: Envelope },
    Local { message: Message },
    Disconnected { peer: PeerId },
}

/// Handle returned by `start_host`: the host player's seat at the table and
/// the off switch for the server.
pub struct HostHandle {
    room_id: PeerId,
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
    events: Sender<InternalEvent>,
    view_rx: Receiver<Envelope>,
    view: Replica,
}

impl HostHandle {
    pub fn room_id(&self) -> &PeerId {
        &self.room_id
    }

    /// Queue an action from the host player. It is routed exactly like a
    /// remote peer's, under the host's own id.
    pub fn submit(&self, message: Message) -> Result<(), TransportError> {
        self.events
            .send(InternalEvent::Local { message })
            .map_err(|_| TransportError::Closed)
    }

    /// Fold any pending broadcasts into the local view. Returns whether the
    /// view changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for envelope in self.view_rx.try_iter() {
            changed |= self.view.apply(envelope.message);
        }
        changed
    }

    /// Like `poll`, but waits up to `timeout` for the first broadcast.
    pub fn poll_timeout(&mut self, timeout: Duration) -> bool {
        match self.view_rx.recv_timeout(timeout) {
            Ok(envelope) => {
                let changed = self.view.apply(envelope.message);
                self.poll() || changed
            }
            Err(_) => false,
        }
    }

    pub fn view(&self) -> &Replica {
        &self.view
    }

    /// Signal the server to stop and wait for it to shut down.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Bind, create the session and start serving on a background thread.
/// Returns the handle and the bound address (useful with port 0).
pub fn start_host(config: HostConfig) -> io::Result<(HostHandle, SocketAddr)> {
    let listener = TcpListener::bind((config.bind, config.port))?;
    let addr = listener.local_addr()?;

    let mut session = Session::new(&config);
    let room_id = session.room_id().clone();
    let (view_tx, view_rx) = mpsc::channel();
    session.set_local_view(Box::new(ChannelSink::new(view_tx)));
    info!(%addr, room = %room_id, "hosting");

    let keep_running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = mpsc::channel();

    let thread = {
        let keep_running = keep_running.clone();
        let tx = tx.clone();
        thread::spawn(move || run_host(listener, session, tx, rx, keep_running))
    };

    Ok((
        HostHandle {
            view: Replica::new(room_id.clone()),
            room_id,
            keep_running,
            thread: Some(thread),
            events: tx,
            view_rx,
        },
        addr,
    ))
}

/// Main host loop. Runs until `keep_running` is cleared.
fn run_host(
    listener: TcpListener,
    mut session: Session,
    tx: Sender<InternalEvent>,
    rx: Receiver<InternalEvent>,
    keep_running: Arc<AtomicBool>,
) {
    // Non-blocking so the accept thread can check keep_running.
    if let Err(error) = listener.set_nonblocking(true) {
        warn!(%error, "listener cannot be made non-blocking");
    }

    let keep_running_listener = keep_running.clone();
    let tx_listener = tx.clone();
    thread::spawn(move || {
        while keep_running_listener.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    stream.set_nonblocking(false).ok();
                    let tx_dial = tx_listener.clone();
                    thread::spawn(move || {
                        if let Err(error) = read_dial(stream, &tx_dial) {
                            debug!(%addr, %error, "handshake failed");
                        }
                    });
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(LOOP_TICK);
                }
                Err(error) => {
                    warn!(%error, "accept failed, no longer listening");
                    break;
                }
            }
        }
    });

    while keep_running.load(Ordering::SeqCst) {
        match rx.recv_timeout(LOOP_TICK) {
            Ok(event) => handle_event(&mut session, event, &tx),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    session.close_all();
    info!(room = %session.room_id(), "host stopped");
}

fn handle_event(session: &mut Session, event: InternalEvent, tx: &Sender<InternalEvent>) {
    match event {
        InternalEvent::NewConnection {
            stream,
            reader,
            dial,
        } => {
            if let Err(error) = handle_new_connection(session, stream, reader, dial, tx) {
                debug!(%error, "handshake failed");
            }
        }
        InternalEvent::MessageFrom { peer, envelope } => {
            // Identity is the connection's; the envelope's senderId is ignored.
            let _ = session.handle(&peer, envelope.message);
        }
        InternalEvent::Local { message } => {
            let host = session.room_id().clone();
            let _ = session.handle(&host, message);
        }
        InternalEvent::Disconnected { peer } => {
            session.disconnect(&peer);
        }
    }
}

/// Wait for a fresh connection's dial and pass it to the main thread.
fn read_dial(stream: TcpStream, tx: &Sender<InternalEvent>) -> Result<(), TransportError> {
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let dial: DialRequest = recv_json(&mut reader)?.ok_or(TransportError::Closed)?;
    tx.send(InternalEvent::NewConnection {
        stream,
        reader,
        dial,
    })
    .map_err(|_| TransportError::Closed)
}

/// Accept or refuse a dial, and for an accepted peer register its sink and
/// spawn its reader thread.
fn handle_new_connection(
    session: &mut Session,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    dial: DialRequest,
    tx: &Sender<InternalEvent>,
) -> Result<(), TransportError> {
    let refusal = if dial.protocol_version != PROTOCOL_VERSION {
        Some(REFUSED_VERSION)
    } else if &dial.room_id != session.room_id() {
        Some(REFUSED_WRONG_ROOM)
    } else if !session.has_capacity() {
        Some(REFUSED_ROOM_FULL)
    } else {
        None
    };
    if let Some(reason) = refusal {
        info!(room = %dial.room_id, reason, "refused connection");
        send_json(
            &mut &stream,
            &DialReply::Refused {
                reason: reason.into(),
            },
        )?;
        return Ok(());
    }

    let peer = session.next_peer_id();
    send_json(
        &mut &stream,
        &DialReply::Accepted {
            peer_id: peer.clone(),
            room_id: session.room_id().clone(),
        },
    )?;
    stream.set_read_timeout(None)?;

    session.connect(peer.clone(), Box::new(TcpSink::new(stream)));
    let tx_reader = tx.clone();
    thread::spawn(move || reader_loop(reader, peer, tx_reader));
    Ok(())
}

/// Reader loop for one peer. Runs in its own thread.
fn reader_loop(mut reader: BufReader<TcpStream>, peer: PeerId, tx: Sender<InternalEvent>) {
    loop {
        match recv_json::<_, Envelope>(&mut reader) {
            Ok(Some(envelope)) => {
                let event = InternalEvent::MessageFrom {
                    peer: peer.clone(),
                    envelope,
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
            Ok(None) => break,
            // A bad payload inside a good frame: drop it, keep the peer.
            Err(TransportError::Codec(error)) => {
                debug!(%peer, %error, "dropping malformed message");
            }
            Err(error) => {
                debug!(%peer, %error, "connection lost");
                break;
            }
        }
    }
    let _ = tx.send(InternalEvent::Disconnected { peer });
}
