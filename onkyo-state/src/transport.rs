//! Outbound transport seam
//!
//! The session hands commands to a [`Transport`] and never waits for them:
//! delivery failures, reconnects and retries belong to the transport.
//!
//! [`TcpTransport`] speaks eISCP directly. Its reader thread decodes frames into
//! a channel that feeds the session's inbound side; when the socket closes the
//! channel disconnects and the session stops.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use onkyo_api::{Command, Frame, Message, ProtocolError};
use parking_lot::Mutex;

use crate::error::Result;

/// Fire-and-forget command sink
pub trait Transport {
    fn transmit(&mut self, command: &Command);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transmit(&mut self, command: &Command) {
        (**self).transmit(command)
    }
}

// ============================================================================
// Channel transport
// ============================================================================

/// Forwards commands into a channel, for applications that own the socket
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: Sender<Command>,
}

impl ChannelTransport {
    pub fn new(tx: Sender<Command>) -> Self {
        Self { tx }
    }

    /// Create a transport and the receiving end of its channel
    pub fn unbounded() -> (Self, Receiver<Command>) {
        let (tx, rx) = channel::unbounded();
        (Self::new(tx), rx)
    }
}

impl Transport for ChannelTransport {
    fn transmit(&mut self, command: &Command) {
        if self.tx.send(command.clone()).is_err() {
            tracing::warn!("Command channel closed, dropping {}", command);
        }
    }
}

// ============================================================================
// Recording transport
// ============================================================================

/// Keeps every transmitted command; clones share one log
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Command>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Command> {
        self.sent.lock().clone()
    }

    /// Drain the log
    pub fn take(&self) -> Vec<Command> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Number of `<code>QSTN` queries sent
    pub fn queries_for(&self, code: &str) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|c| c.is_query() && c.code() == code)
            .count()
    }

    pub fn count(&self, command: &Command) -> usize {
        self.sent.lock().iter().filter(|c| *c == command).count()
    }
}

impl Transport for RecordingTransport {
    fn transmit(&mut self, command: &Command) {
        self.sent.lock().push(command.clone());
    }
}

// ============================================================================
// TCP transport
// ============================================================================

const READ_BUFFER_SIZE: usize = 4096;

/// eISCP over TCP
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    reader: Option<JoinHandle<()>>,
}

impl TcpTransport {
    /// Connect and start the reader thread
    ///
    /// Returns the transport and the channel of decoded inbound messages.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<(Self, Receiver<Message>)> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        tracing::info!("Connected to receiver at {}", peer);

        let reader_stream = stream.try_clone()?;
        let (tx, rx) = channel::unbounded();
        let reader = thread::Builder::new()
            .name("onkyo-reader".to_string())
            .spawn(move || read_frames(reader_stream, tx))?;

        Ok((
            Self {
                stream,
                reader: Some(reader),
            },
            rx,
        ))
    }

    /// Close the socket; the inbound channel disconnects once the reader exits
    pub fn shutdown(&mut self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::debug!("Socket shutdown: {}", e);
        }
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                tracing::warn!("Reader thread panicked");
            }
        }
    }
}

impl Transport for TcpTransport {
    fn transmit(&mut self, command: &Command) {
        tracing::trace!("-> {}", command);
        let bytes = Frame::from_command(command).encode();
        if let Err(e) = self.stream.write_all(&bytes) {
            tracing::warn!("Failed to send {}: {}", command, e);
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn read_frames(mut stream: TcpStream, tx: Sender<Message>) {
    let mut buf: Vec<u8> = Vec::with_capacity(READ_BUFFER_SIZE);
    let mut chunk = [0u8; READ_BUFFER_SIZE];

    loop {
        let read = match stream.read(&mut chunk) {
            Ok(0) => {
                tracing::info!("Receiver closed the connection");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                tracing::info!("Connection read failed: {}", e);
                break;
            }
        };
        buf.extend_from_slice(&chunk[..read]);

        if !drain_frames(&mut buf, &tx) {
            tracing::debug!("Inbound channel closed, reader exiting");
            break;
        }
    }
}

/// Decode every complete frame at the front of `buf`
///
/// Returns false once the receiving side of `tx` is gone.
fn drain_frames(buf: &mut Vec<u8>, tx: &Sender<Message>) -> bool {
    let mut consumed = 0;

    while consumed < buf.len() {
        match Frame::decode(&buf[consumed..]) {
            Ok((frame, used)) => {
                consumed += used;
                match frame.to_message() {
                    Ok(message) => {
                        tracing::trace!("<- {}", frame.data);
                        if tx.send(message).is_err() {
                            return false;
                        }
                    }
                    Err(e) => tracing::warn!("Dropping undecodable message {:?}: {}", frame.data, e),
                }
            }
            Err(ProtocolError::Incomplete { .. }) => break,
            Err(e) => {
                let remaining = buf.len() - consumed;
                let skip = Frame::resync_offset(&buf[consumed..]).unwrap_or(remaining);
                tracing::warn!("Skipping {} bytes: {}", skip, e);
                consumed += skip;
            }
        }
    }

    buf.drain(..consumed);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use onkyo_api::{code, PowerStatus};
    use std::net::TcpListener;
    use std::time::Duration;

    #[test]
    fn test_recording_transport_shares_log() {
        let recorder = RecordingTransport::new();
        let mut transport = recorder.clone();
        transport.transmit(&Command::query(code::POWER));
        transport.transmit(&Command::Power(PowerStatus::On));

        assert_eq!(recorder.queries_for(code::POWER), 1);
        assert_eq!(recorder.count(&Command::Power(PowerStatus::On)), 1);
        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.sent().is_empty());
    }

    #[test]
    fn test_channel_transport() {
        let (mut transport, rx) = ChannelTransport::unbounded();
        transport.transmit(&Command::query(code::TITLE_NAME));
        assert_eq!(rx.try_recv().unwrap(), Command::query(code::TITLE_NAME));

        drop(rx);
        transport.transmit(&Command::query(code::TITLE_NAME));
    }

    #[test]
    fn test_drain_frames_keeps_partial_tail() {
        let (tx, rx) = channel::unbounded();
        let second = Frame::new("NALAlbum").encode();
        let mut buf = b"junk".to_vec();
        buf.extend(Frame::new("NATArtist").encode());
        buf.extend_from_slice(&second[..10]);

        assert!(drain_frames(&mut buf, &tx));
        assert_eq!(rx.try_recv().unwrap(), Message::ArtistName("Artist".to_string()));
        assert!(rx.try_recv().is_err());
        assert_eq!(buf, second[..10].to_vec());

        buf.extend_from_slice(&second[10..]);
        assert!(drain_frames(&mut buf, &tx));
        assert_eq!(rx.try_recv().unwrap(), Message::AlbumName("Album".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_drain_frames_skips_oversized_header() {
        let (tx, rx) = channel::unbounded();
        let mut buf = Vec::new();
        buf.extend_from_slice(b"ISCP");
        buf.extend_from_slice(&16u32.to_be_bytes());
        buf.extend_from_slice(&u32::MAX.to_be_bytes());
        buf.extend_from_slice(&[1, 0, 0, 0]);
        buf.extend(Frame::new("PWR01").encode());

        assert!(drain_frames(&mut buf, &tx));
        assert_eq!(rx.try_recv().unwrap(), Message::Power(PowerStatus::On));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_tcp_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(&Frame::new("PWR01").encode()).unwrap();

            let expected = Frame::new("PWRQSTN").encode();
            let mut received = vec![0u8; expected.len()];
            socket.read_exact(&mut received).unwrap();
            assert_eq!(received, expected);
        });

        let (mut transport, inbound) = TcpTransport::connect(addr).unwrap();
        let message = inbound.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(message, Message::Power(PowerStatus::On));

        transport.transmit(&Command::query(code::POWER));
        server.join().unwrap();

        // Server hung up
        assert!(inbound.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
