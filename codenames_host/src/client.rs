// TCP connection from a joining player to a host.
//
// Same split as the host side:
// - `connect()` dials, runs the handshake on the calling thread, then spawns
//   a background reader thread.
// - The reader thread decodes `Envelope`s and pushes them into an `mpsc`
//   channel. When the stream ends or breaks it pushes one
//   `ClientEvent::HostLost` and exits.
// - The caller keeps the buffered write half and sends synchronously (the
//   messages are tiny).
// - `poll()` drains the inbox without blocking.
//
// Nothing here interprets game messages; feed them to a `Replica`. There is
// no reconnect: once the host is lost the client is done.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use codenames_protocol::{DialReply, DialRequest, Envelope, Message, PeerId};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::transport::{recv_json, send_json};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that happened on the connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    Message(Message),
    /// The host closed the connection or it broke.
    HostLost { reason: String },
}

pub struct NetClient {
    writer: BufWriter<TcpStream>,
    inbox: Receiver<ClientEvent>,
    _reader_thread: JoinHandle<()>,
    peer_id: PeerId,
    room_id: PeerId,
}

impl NetClient {
    /// Dial `addr` and ask for `room_id`. On success the host has bound this
    /// connection to the returned peer id; the player is not seated until
    /// `join` is sent.
    pub fn connect(addr: impl ToSocketAddrs, room_id: &PeerId) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;

        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);
        send_json(&mut writer, &DialRequest::new(room_id.clone()))?;

        let reply: DialReply = recv_json(&mut reader)?.ok_or_else(|| TransportError::Handshake {
            reason: "host closed the connection".into(),
        })?;
        let (peer_id, room_id) = match reply {
            DialReply::Accepted { peer_id, room_id } => (peer_id, room_id),
            DialReply::Refused { reason } => return Err(TransportError::Refused { reason }),
        };
        reader.get_ref().set_read_timeout(None)?;
        debug!(peer = %peer_id, room = %room_id, "connected to host");

        let (tx, rx) = mpsc::channel();
        let reader_thread = thread::spawn(move || reader_loop(reader, tx));

        Ok(Self {
            writer,
            inbox: rx,
            _reader_thread: reader_thread,
            peer_id,
            room_id,
        })
    }

    /// The id the host bound to this connection.
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn room_id(&self) -> &PeerId {
        &self.room_id
    }

    /// Send one message to the host, stamped with our peer id.
    pub fn send(&mut self, message: Message) -> Result<(), TransportError> {
        send_json(
            &mut self.writer,
            &Envelope::from_peer(message, self.peer_id.clone()),
        )
    }

    /// Send a raw envelope, `senderId` and all.
    pub fn send_envelope(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        send_json(&mut self.writer, envelope)
    }

    /// Ask for a seat (or a resync, if already seated).
    pub fn join(&mut self, name: &str) -> Result<(), TransportError> {
        self.send(Message::JoinRequest { name: name.into() })
    }

    /// Drain everything that has arrived (non-blocking).
    pub fn poll(&self) -> Vec<ClientEvent> {
        self.inbox.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event.
    pub fn poll_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.inbox.recv_timeout(timeout).ok()
    }

    /// Close the connection. The host sees a disconnect.
    pub fn disconnect(&mut self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }
}

fn reader_loop(mut reader: BufReader<TcpStream>, tx: Sender<ClientEvent>) {
    let reason = loop {
        match recv_json::<_, Envelope>(&mut reader) {
            Ok(Some(envelope)) => {
                if tx.send(ClientEvent::Message(envelope.message)).is_err() {
                    return;
                }
            }
            Ok(None) => break "host closed the connection".to_string(),
            Err(TransportError::Codec(error)) => {
                warn!(%error, "dropping malformed message from host");
            }
            Err(error) => break error.to_string(),
        }
    };
    let _ = tx.send(ClientEvent::HostLost { reason });
}
