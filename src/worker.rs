//! Containers are built on a background thread, which communicates with the
//! caller only by messages. Requests carry owned copies of the records, so
//! the caller may keep editing its own state while a build is in flight.

/// Request and response messages.
pub mod protocol;
pub use protocol::{BuildFailure, HANDSHAKE_DATA, Request, Response};

mod transport;
pub use transport::{PendingReply, State, Transport, TransportError};
