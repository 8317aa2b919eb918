//! Plain-or-encrypted connection handle.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;

#[cfg(feature = "tls")]
use tokio_rustls::client::TlsStream;

/// A connection owned by exactly one worker. Dropping it closes the socket.
pub enum RaceStream {
    /// Plain TCP.
    Plain(TcpStream),
    /// TLS over TCP.
    #[cfg(feature = "tls")]
    Tls(Box<TlsStream<TcpStream>>),
}

impl RaceStream {
    /// Whether this connection is encrypted.
    pub fn is_secure(&self) -> bool {
        match self {
            RaceStream::Plain(_) => false,
            #[cfg(feature = "tls")]
            RaceStream::Tls(_) => true,
        }
    }

    /// Shut down the outbound direction of a plaintext connection.
    ///
    /// Returns `Ok(false)` without touching the stream for TLS connections,
    /// whose session cannot be half-closed independently.
    pub async fn half_close(&mut self) -> io::Result<bool> {
        match self {
            RaceStream::Plain(stream) => {
                stream.shutdown().await?;
                Ok(true)
            }
            #[cfg(feature = "tls")]
            RaceStream::Tls(_) => Ok(false),
        }
    }

    /// Underlying TCP socket.
    pub fn tcp(&self) -> &TcpStream {
        match self {
            RaceStream::Plain(stream) => stream,
            #[cfg(feature = "tls")]
            RaceStream::Tls(stream) => stream.get_ref().0,
        }
    }
}

impl fmt::Debug for RaceStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaceStream")
            .field("secure", &self.is_secure())
            .field("peer", &self.tcp().peer_addr().ok())
            .finish()
    }
}

impl AsyncRead for RaceStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            RaceStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            #[cfg(feature = "tls")]
            RaceStream::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for RaceStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            RaceStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            #[cfg(feature = "tls")]
            RaceStream::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            RaceStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            #[cfg(feature = "tls")]
            RaceStream::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            RaceStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            #[cfg(feature = "tls")]
            RaceStream::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}
