//! Immutable per-node view of the ring: self, predecessor, successor, fingers.

use crate::error::ChordError;
use crate::id::{hash_id, in_arc_oc, in_arc_oo, RingId};

/// One peer's address and its hashed position on the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    pub address: String,
    pub id: RingId,
}

/// A node's frozen opinion of the ring, built once at startup.
#[derive(Debug, Clone)]
pub struct RingView {
    pub self_address: String,
    pub self_id: RingId,
    pub predecessor: NodeEntry,
    pub successor: NodeEntry,
    pub fingers: Vec<NodeEntry>,
}

/// Smallest `F` such that `2^(F-1) >= n`, then `F <- min(F + 1, 160)`.
fn finger_count(n: usize) -> u32 {
    let mut f: u32 = 1;
    while f < 160 {
        let threshold: u128 = 1u128 << (f - 1);
        if threshold >= n as u128 {
            break;
        }
        f += 1;
    }
    (f + 1).min(160)
}

impl RingView {
    /// Builds the ring from a static peer list. `peers` may contain `self_address`,
    /// duplicates, or be empty; all three are normalized away.
    pub fn build(self_address: &str, peers: &[String]) -> Result<Self, ChordError> {
        let mut all: Vec<String> = peers.to_vec();
        all.push(self_address.to_string());
        all.sort();
        all.dedup();

        let mut ring: Vec<NodeEntry> = all
            .into_iter()
            .map(|address| {
                let id = hash_id(&address);
                NodeEntry { address, id }
            })
            .collect();
        // Sort by ID ascending, tie-break lexicographically by address.
        ring.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.address.cmp(&b.address)));

        if ring.is_empty() {
            return Err(ChordError::EmptyRing);
        }

        let n = ring.len();
        let me_index = ring
            .iter()
            .position(|e| e.address == self_address)
            .ok_or_else(|| ChordError::SelfNotInRing(self_address.to_string()))?;

        let predecessor = ring[(me_index + n - 1) % n].clone();
        let successor = ring[(me_index + 1) % n].clone();
        let self_id = ring[me_index].id;

        let f = finger_count(n);
        let mut fingers = Vec::with_capacity(f as usize);
        for i in 0..f {
            let start = self_id.add_pow2(i);
            let finger = ring
                .iter()
                .find(|e| e.id >= start)
                .cloned()
                .unwrap_or_else(|| ring[0].clone());
            fingers.push(finger);
        }

        Ok(RingView {
            self_address: self_address.to_string(),
            self_id,
            predecessor,
            successor,
            fingers,
        })
    }

    /// Does this node own `key_id`? I.e. is it in `(predecessor.id, self_id]`.
    pub fn is_responsible(&self, key_id: RingId) -> bool {
        in_arc_oc(key_id, self.predecessor.id, self.self_id)
    }

    /// The finger closest to, but not past, `target_id` -- excluding self, to
    /// guarantee forward progress and rule out a one-hop self-loop.
    pub fn closest_preceding_finger(&self, target_id: RingId) -> &str {
        for finger in self.fingers.iter().rev() {
            if finger.address != self.self_address
                && in_arc_oo(finger.id, self.self_id, target_id)
            {
                return &finger.address;
            }
        }
        &self.successor.address
    }

    /// This node's neighbors (predecessor, successor, fingers), self excluded,
    /// deduplicated, sorted ascending. Published via `/network`.
    pub fn neighbors(&self) -> Vec<String> {
        let mut addrs: Vec<String> = self
            .fingers
            .iter()
            .map(|f| f.address.clone())
            .chain(std::iter::once(self.predecessor.address.clone()))
            .chain(std::iter::once(self.successor.address.clone()))
            .filter(|a| a != &self.self_address)
            .collect();
        addrs.sort();
        addrs.dedup();
        addrs
    }
}
