//! Chat client: relay transport and session round trips

mod session;
mod transport;

pub use session::{ChatSession, SendOutcome};
pub use transport::{
    ByteStream, CONNECTION_NOTICE, ChatError, ChatTransport, RATE_LIMIT_NOTICE, RelayClient,
    USAGE_LIMIT_NOTICE,
};
