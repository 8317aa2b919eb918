//! lastbyte - Transport Layer
//!
//! Everything a worker needs to talk to the target:
//!
//! - **Connection establishment**: [`connect`] with bounded dial and TLS handshake
//! - **Connection handle**: [`RaceStream`], plain or encrypted, owned by one worker
//! - **Bounded I/O**: [`write_all`] with a per-attempt deadline, and [`drain`]
//! - **Capability warnings**: [`WarnOnce`] so a platform limitation is reported
//!   once, not once per connection

mod connect;
mod io;
mod latch;
mod stream;

pub use connect::connect;
pub use io::{drain, write_all};
pub use latch::WarnOnce;
pub use stream::RaceStream;
