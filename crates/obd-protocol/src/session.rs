//! Protocol Session over a Half-Duplex Byte Channel
//!
//! An [`ObdSession`] owns an already-open byte channel for its lifetime and
//! enforces the single-outstanding-exchange discipline the half-duplex link
//! requires: one command is written and its response read before the next
//! command goes out. Any channel error faults the session permanently; the
//! caller discards it and re-establishes the channel.

use crate::error::ObdError;
use crate::parse;
use crate::pid::Pid;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// ELM327 init sequence: reset, echo off, linefeeds off, protocol auto.
/// Spaces between response bytes stay enabled; the parser depends on them.
const INIT_COMMANDS: [&str; 4] = ["ATZ", "ATE0", "ATL0", "ATSP0"];

/// Lifecycle of one session over one handed-off channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No channel attached yet
    Disconnected,
    /// Channel handed off, exchanges allowed
    Connected,
    /// A channel error occurred; terminal for this session
    Faulted,
}

/// Session over an open adapter channel
///
/// Generic over the channel so tests can drive it with an in-memory duplex
/// stream instead of hardware.
pub struct ObdSession<C> {
    channel: C,
    state: ConnectionState,
}

impl<C> ObdSession<C>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    /// Take ownership of an already-open channel.
    ///
    /// Opening and closing the channel (device discovery, pairing, the
    /// serial binding) belongs to the caller; the handoff of an open channel
    /// is what moves the session to `Connected`.
    pub fn attach(channel: C) -> Self {
        info!("session attached to open channel");
        Self {
            channel,
            state: ConnectionState::Connected,
        }
    }

    /// Current session state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Write one command frame for `pid` and flush.
    ///
    /// The frame is the ASCII request code followed by a single carriage
    /// return; no checksum, no binary framing.
    pub async fn send(&mut self, pid: Pid) -> Result<(), ObdError> {
        self.send_command(pid.request()).await
    }

    /// One bounded read from the channel.
    ///
    /// Returns whatever bytes arrived, possibly fewer than `limit` and
    /// possibly spanning multiple logical lines. A complete response is not
    /// guaranteed; callers rely on the parser's leniency rather than on
    /// framing.
    pub async fn receive(&mut self, limit: usize) -> Result<Vec<u8>, ObdError> {
        self.check_connected()?;
        let mut buf = vec![0u8; limit];
        match self.channel.read(&mut buf).await {
            Ok(0) => {
                self.state = ConnectionState::Faulted;
                warn!("channel closed during read, session faulted");
                Err(ObdError::ChannelClosed)
            }
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) => {
                self.state = ConnectionState::Faulted;
                warn!("channel read failed, session faulted: {}", e);
                Err(ObdError::ChannelRead(e.to_string()))
            }
        }
    }

    /// One full exchange: send the request, read once, parse and decode.
    ///
    /// This is the pairing the half-duplex channel requires, in one call.
    /// A response with too few usable bytes decodes to the 0 sentinel and
    /// is not an error.
    pub async fn query(&mut self, pid: Pid, read_limit: usize) -> Result<u32, ObdError> {
        self.send(pid).await?;
        let raw = self.receive(read_limit).await?;
        let payload = parse::extract_payload(&raw, pid);
        if payload.len() < pid.response_bytes() {
            debug!(
                "PID {:02X}: short response ({} of {} bytes), degrading to 0",
                pid.as_hex(),
                payload.len(),
                pid.response_bytes()
            );
        }
        Ok(pid.decode(&payload))
    }

    /// Run the adapter init handshake.
    ///
    /// Each command's reply is read and discarded; the adapter's banner and
    /// `OK` acknowledgements carry no payload.
    pub async fn initialize(&mut self, read_limit: usize) -> Result<(), ObdError> {
        for cmd in INIT_COMMANDS {
            self.send_command(cmd).await?;
            let _ = self.receive(read_limit).await?;
        }
        info!("adapter initialized");
        Ok(())
    }

    async fn send_command(&mut self, code: &str) -> Result<(), ObdError> {
        self.check_connected()?;
        let mut frame = Vec::with_capacity(code.len() + 1);
        frame.extend_from_slice(code.as_bytes());
        frame.push(b'\r');
        if let Err(e) = self.write_frame(&frame).await {
            self.state = ConnectionState::Faulted;
            warn!("command write failed, session faulted: {}", e);
            return Err(ObdError::ChannelWrite(e.to_string()));
        }
        debug!("sent command {}", code);
        Ok(())
    }

    async fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        self.channel.write_all(frame).await?;
        self.channel.flush().await
    }

    fn check_connected(&self) -> Result<(), ObdError> {
        match self.state {
            ConnectionState::Connected => Ok(()),
            _ => Err(ObdError::SessionFaulted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};

    async fn read_command(peer: &mut DuplexStream) -> String {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            peer.read_exact(&mut byte).await.unwrap();
            if byte[0] == b'\r' {
                break;
            }
            line.push(byte[0]);
        }
        String::from_utf8(line).unwrap()
    }

    #[tokio::test]
    async fn test_send_frames_command_with_carriage_return() {
        let (client, mut peer) = duplex(64);
        let mut session = ObdSession::attach(client);
        session.send(Pid::Rpm).await.unwrap();

        let mut buf = [0u8; 5];
        peer.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"010C\r");
    }

    #[tokio::test]
    async fn test_query_decodes_scripted_response() {
        let (client, mut peer) = duplex(64);
        let mut session = ObdSession::attach(client);

        let responder = tokio::spawn(async move {
            assert_eq!(read_command(&mut peer).await, "010C");
            peer.write_all(b"41 0C 0F 90\r\n>").await.unwrap();
            peer
        });

        let rpm = session.query(Pid::Rpm, 64).await.unwrap();
        assert_eq!(rpm, 996);
        assert_eq!(session.state(), ConnectionState::Connected);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_query_degrades_short_response_to_zero() {
        let (client, mut peer) = duplex(64);
        let mut session = ObdSession::attach(client);

        let responder = tokio::spawn(async move {
            assert_eq!(read_command(&mut peer).await, "010C");
            peer.write_all(b"41 0C 0F\r>").await.unwrap();
            peer
        });

        let rpm = session.query(Pid::Rpm, 64).await.unwrap();
        assert_eq!(rpm, 0);
        assert_eq!(session.state(), ConnectionState::Connected);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_channel_faults_session() {
        let (client, mut peer) = duplex(64);
        let mut session = ObdSession::attach(client);
        peer.shutdown().await.unwrap();

        session.send(Pid::Rpm).await.unwrap();
        let err = session.receive(64).await.unwrap_err();
        assert!(matches!(err, ObdError::ChannelClosed));
        assert_eq!(session.state(), ConnectionState::Faulted);

        // Faulted is terminal: no further I/O reaches the channel
        let err = session.send(Pid::Throttle).await.unwrap_err();
        assert!(matches!(err, ObdError::SessionFaulted));
    }

    #[tokio::test]
    async fn test_write_failure_faults_session() {
        let (client, peer) = duplex(64);
        let mut session = ObdSession::attach(client);
        drop(peer);

        let err = session.send(Pid::Rpm).await.unwrap_err();
        assert!(matches!(err, ObdError::ChannelWrite(_)));
        assert_eq!(session.state(), ConnectionState::Faulted);
    }

    #[tokio::test]
    async fn test_initialize_sends_handshake_in_order() {
        let (client, mut peer) = duplex(256);
        let mut session = ObdSession::attach(client);

        let responder = tokio::spawn(async move {
            for expected in ["ATZ", "ATE0", "ATL0", "ATSP0"] {
                assert_eq!(read_command(&mut peer).await, expected);
                peer.write_all(b"OK\r>").await.unwrap();
            }
            peer
        });

        session.initialize(64).await.unwrap();
        assert_eq!(session.state(), ConnectionState::Connected);
        responder.await.unwrap();
    }
}
