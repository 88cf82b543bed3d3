// Outbound halves of peer connections, and JSON-over-frame helpers.
//
// The session never writes to a socket directly: each connection is handed
// to it as a boxed `PeerSink`. Over the network that is a `TcpSink` (a
// buffered clone of the stream's write half); in-process it is a
// `ChannelSink`, which is how the host's own local view and the unit tests
// receive broadcasts.
//
// A failed `deliver` only reports the failure. Closing the connection is the
// reader side's job: its thread sees the broken stream and reports the
// disconnect through the normal path.

use std::io::{BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::Sender;

use codenames_protocol::{Envelope, read_frame, write_frame};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TransportError;

/// One connection's outbound half, as seen by the host.
pub trait PeerSink: Send {
    fn deliver(&mut self, envelope: &Envelope) -> Result<(), TransportError>;

    /// Tear the connection down. Called when the session drops the sink.
    fn close(&mut self) {}
}

/// A framed TCP write half.
pub struct TcpSink {
    writer: BufWriter<TcpStream>,
}

impl TcpSink {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            writer: BufWriter::new(stream),
        }
    }
}

impl PeerSink for TcpSink {
    fn deliver(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        send_json(&mut self.writer, envelope)
    }

    fn close(&mut self) {
        let _ = self.writer.flush();
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }
}

/// An in-process sink backed by an `mpsc` channel.
pub struct ChannelSink {
    tx: Sender<Envelope>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Envelope>) -> Self {
        Self { tx }
    }
}

impl PeerSink for ChannelSink {
    fn deliver(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        self.tx
            .send(envelope.clone())
            .map_err(|_| TransportError::Closed)
    }
}

/// Serialize `value` to JSON and write it as one frame.
pub fn send_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), TransportError> {
    let json = serde_json::to_vec(value)?;
    write_frame(writer, &json)?;
    Ok(())
}

/// Read one frame and decode it. `Ok(None)` means the peer closed the
/// connection cleanly between frames.
pub fn recv_json<R: Read, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<Option<T>, TransportError> {
    match read_frame(reader)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}
