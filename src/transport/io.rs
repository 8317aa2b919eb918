//! Deadline-bounded writes and best-effort response draining.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

use crate::core::constants::DRAIN_BUFFER_SIZE;
use crate::core::{RaceError, RaceResult};

/// Write all of `data`, bounding each partial write (not the total) by
/// `attempt_timeout`.
///
/// Bytes accepted before an error stay accepted; nothing is retried. The
/// stream is flushed at the end so TLS records leave the session buffer.
pub async fn write_all<W>(stream: &mut W, data: &[u8], attempt_timeout: Duration) -> RaceResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while written < data.len() {
        let n = timeout(attempt_timeout, stream.write(&data[written..]))
            .await
            .map_err(|_| RaceError::Timeout(attempt_timeout))??;
        if n == 0 {
            return Err(io::Error::from(io::ErrorKind::WriteZero).into());
        }
        written += n;
    }

    timeout(attempt_timeout, stream.flush())
        .await
        .map_err(|_| RaceError::Timeout(attempt_timeout))??;
    Ok(())
}

/// Read until end-of-stream, an error, or a read that takes longer than
/// `read_timeout`. Errors are swallowed.
///
/// When `sink` is given, every chunk is forwarded to it; a failing sink
/// stops forwarding but not draining. Returns the number of bytes read.
pub async fn drain<R, W>(stream: &mut R, mut sink: Option<&mut W>, read_timeout: Duration) -> usize
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; DRAIN_BUFFER_SIZE];
    let mut total = 0;

    loop {
        let n = match timeout(read_timeout, stream.read(&mut buf)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                trace!(error = %e, "drain stopped on read error");
                break;
            }
            Err(_) => {
                trace!("drain stopped on read timeout");
                break;
            }
        };
        total += n;

        if let Some(out) = sink.as_deref_mut() {
            if out.write_all(&buf[..n]).await.is_err() {
                sink = None;
            }
        }
    }

    if let Some(out) = sink {
        let _ = out.flush().await;
    }
    total
}
