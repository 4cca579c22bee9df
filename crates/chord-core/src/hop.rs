//! The forwarding capability: a one-shot HTTP hop to a peer believed closer
//! to a key's owner. Kept as a trait so tests can swap in an in-memory
//! peer table instead of binding real sockets.

use async_trait::async_trait;

pub const DEFAULT_TTL: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMethod {
    Get,
    Put,
    Head,
}

/// Everything a hop needs to reissue the client's request against a peer.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: ForwardMethod,
    /// Path including the URL-encoded key, e.g. `/storage/some%20key`.
    pub path: String,
    pub body: Vec<u8>,
    pub ttl: u32,
}

/// The relayed upstream answer: status, content type, body.
#[derive(Debug, Clone)]
pub struct ForwardOutcome {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("TTL exceeded")]
    TtlExceeded,
    #[error("forward error to {peer}: {detail}")]
    Transport { peer: String, detail: String },
}

#[async_trait]
pub trait HopClient: Send + Sync {
    /// Forward `request` to `peer` (a `"host:port"` address). Decrementing
    /// the TTL and checking for exhaustion is the router's job, not the
    /// client's -- this trait only performs the single hop.
    async fn forward(&self, peer: &str, request: ForwardRequest) -> Result<ForwardOutcome, ForwardError>;
}
