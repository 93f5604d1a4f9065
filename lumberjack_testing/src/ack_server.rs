//! In-memory acknowledging server for exercising Lumberjack clients.
//!
//! [`AckServer`] reads COMPRESS frames from any async stream, records the
//! DATA frames inside them and answers with ACK frames according to an
//! [`AckPolicy`]. It exists to test the client and is not a production
//! receiver.

use std::{io, net::SocketAddr};

use lumberjack::{
    codec::{DataFrame, decode_compress_frame},
    protocol::{ACK_FRAME_SIZE, COMPRESS_FRAME_HEADER_SIZE, FrameType, PROTOCOL_VERSION},
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};
use tokio_rustls::TlsAcceptor;

/// Largest COMPRESS payload [`read_compress_frame`] accepts.
pub const MAX_FRAME_PAYLOAD: usize = 16 * 1024 * 1024;

/// When the server sends an ACK.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AckPolicy {
    /// Acknowledge every COMPRESS frame with its highest sequence number.
    #[default]
    EveryFrame,
    /// Acknowledge after every `n` COMPRESS frames.
    Every(u32),
    /// Never acknowledge.
    Never,
}

impl AckPolicy {
    fn is_due(self, unacked: u32) -> bool {
        match self {
            Self::EveryFrame => true,
            Self::Every(n) => unacked >= n.max(1),
            Self::Never => false,
        }
    }
}

/// Encode an ACK frame for `sequence`.
#[must_use]
pub fn ack_frame(sequence: u32) -> [u8; ACK_FRAME_SIZE] {
    let mut frame = [0u8; ACK_FRAME_SIZE];
    frame[0] = PROTOCOL_VERSION;
    frame[1] = FrameType::Ack.as_byte();
    frame[2..].copy_from_slice(&sequence.to_be_bytes());
    frame
}

/// Read one COMPRESS frame and decode the DATA frames inside it.
///
/// Returns `Ok(None)` when the stream ends before a complete header.
///
/// # Errors
///
/// Returns an I/O error if reading fails, the header announces more than
/// [`MAX_FRAME_PAYLOAD`] bytes or the frame does not decode.
pub async fn read_compress_frame<R>(reader: &mut R) -> io::Result<Option<Vec<DataFrame>>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; COMPRESS_FRAME_HEADER_SIZE];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }

    let len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;
    if len > MAX_FRAME_PAYLOAD {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("compressed payload of {len} bytes exceeds {MAX_FRAME_PAYLOAD}"),
        ));
    }
    let mut frame = header.to_vec();
    frame.resize(COMPRESS_FRAME_HEADER_SIZE + len, 0);
    reader
        .read_exact(&mut frame[COMPRESS_FRAME_HEADER_SIZE..])
        .await?;

    let (frames, _) = decode_compress_frame(&frame)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(Some(frames))
}

/// Serve one connection until the client closes it.
///
/// Returns every DATA frame received, in order.
///
/// # Errors
///
/// Returns an I/O error if reading fails or a frame does not decode. A
/// client that disappears before an ACK is written ends the loop cleanly.
pub async fn serve<S>(mut stream: S, policy: AckPolicy) -> io::Result<Vec<DataFrame>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut received = Vec::new();
    let mut unacked = 0u32;

    while let Some(frames) = read_compress_frame(&mut stream).await? {
        let Some(last) = frames.last().map(|frame| frame.sequence) else {
            continue;
        };
        received.extend(frames);
        unacked += 1;

        if policy.is_due(unacked) {
            unacked = 0;
            if let Err(err) = write_ack(&mut stream, last).await {
                if matches!(
                    err.kind(),
                    io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset
                ) {
                    break;
                }
                return Err(err);
            }
        }
    }
    Ok(received)
}

async fn write_ack<S>(stream: &mut S, sequence: u32) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&ack_frame(sequence)).await?;
    stream.flush().await
}

/// Handle to a server task running [`serve`].
#[derive(Debug)]
pub struct AckServer {
    task: JoinHandle<io::Result<Vec<DataFrame>>>,
}

impl AckServer {
    /// Serve `stream` on a background task.
    pub fn spawn<S>(stream: S, policy: AckPolicy) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            task: tokio::spawn(serve(stream, policy)),
        }
    }

    /// Accept one plain TCP connection on a loopback port.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn listen_tcp(policy: AckPolicy) -> io::Result<(SocketAddr, Self)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await?;
            serve(stream, policy).await
        });
        Ok((addr, Self { task }))
    }

    /// Accept one TLS connection on a loopback port.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound. Handshake
    /// failures surface from [`finish`](Self::finish).
    pub async fn listen_tls(
        acceptor: TlsAcceptor,
        policy: AckPolicy,
    ) -> io::Result<(SocketAddr, Self)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await?;
            let stream = acceptor.accept(stream).await?;
            serve(stream, policy).await
        });
        Ok((addr, Self { task }))
    }

    /// Wait for the client to close and return the DATA frames received.
    ///
    /// # Errors
    ///
    /// Returns the server's I/O error, or an error if the task panicked.
    pub async fn finish(self) -> io::Result<Vec<DataFrame>> {
        self.task.await.map_err(io::Error::other)?
    }
}
