use thiserror::Error;

/// Faults that abort startup rather than surfacing as an HTTP status.
#[derive(Debug, Error)]
pub enum ChordError {
    #[error("ring has no members")]
    EmptyRing,

    #[error("self address {0:?} not present in the constructed ring (bug)")]
    SelfNotInRing(String),
}
