//! Ring membership model and key-lookup routing primitives for a fixed-membership
//! Chord key-value store. No HTTP, no CLI -- those live in `chord-node`.

pub mod error;
pub mod hop;
pub mod id;
pub mod ring;
pub mod store;

pub use error::ChordError;
pub use hop::{ForwardError, ForwardMethod, ForwardOutcome, ForwardRequest, HopClient, DEFAULT_TTL};
pub use id::{hash_id, in_arc_oc, in_arc_oo, RingId};
pub use ring::{NodeEntry, RingView};
pub use store::{MemoryStore, Store};
