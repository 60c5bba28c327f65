//! Point-in-time snapshot of the payment-channel network.
//!
//! # Overview
//!
//! A [`Snapshot`] is the engine's only input: the node table and the channel
//! table of a gossip capture, fully materialized in memory. Channels are
//! **directional** — a bidirectional channel appears as two records with
//! possibly different fee terms — and parallel channels between the same
//! ordered pair are legal, distinguished by `short_channel_id`.
//!
//! The snapshot is immutable for the duration of an analysis pass. Per-amount
//! fee weights are derived views layered on top (see `satrank-engine`), never
//! written back into the snapshot.
//!
//! ## Content hash
//!
//! [`Snapshot::content_hash`] is a BLAKE3 hash of the ordered channel list.
//! Callers can compare it against a stored value to detect whether a cached
//! graph build is still valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A network participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Stable node identifier (public key in gossip captures).
    pub id: String,
    /// Display alias; absent for nodes that never announced one.
    #[serde(default)]
    pub alias: Option<String>,
    /// Advisory last-seen timestamp. Not used by any computation.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

/// A directed payment channel with fee and capacity terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Forwarding node.
    pub source: String,
    /// Receiving node.
    pub destination: String,
    /// Identity of this specific channel among parallel channels.
    pub short_channel_id: String,
    /// Fixed cost per forward, millisatoshi.
    pub base_fee_msat: u64,
    /// Proportional fee, parts-per-million of the forwarded amount.
    pub fee_per_millionth: u64,
    /// Smallest forwardable amount (inclusive), millisatoshi.
    pub htlc_minimum_msat: u64,
    /// Largest forwardable amount (inclusive), millisatoshi.
    pub htlc_maximum_msat: u64,
    /// Total channel size, satoshi.
    pub capacity_sat: u64,
    /// Whether the channel is currently announced as usable.
    pub active: bool,
    /// Gossip timestamp of the last policy update for this direction.
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl ChannelRecord {
    /// Total channel size in millisatoshi.
    ///
    /// Saturates instead of overflowing: a capacity too large for the msat
    /// scale is still "more than enough" for any admissibility check.
    #[must_use]
    pub const fn capacity_msat(&self) -> u64 {
        self.capacity_sat.saturating_mul(1000)
    }
}

/// A full node + channel capture, read once per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the capture was taken, if the provider recorded it.
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    /// Node table.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Channel table, inactive channels included.
    #[serde(default)]
    pub channels: Vec<ChannelRecord>,
}

impl Snapshot {
    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or missing required fields.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Timestamp stamped on every report row derived from this snapshot.
    ///
    /// The newest channel `last_update`, falling back to `captured_at`.
    /// `None` only when the snapshot carries no timestamps at all.
    #[must_use]
    pub fn latest_update(&self) -> Option<DateTime<Utc>> {
        self.channels
            .iter()
            .filter_map(|c| c.last_update)
            .max()
            .or(self.captured_at)
    }

    /// BLAKE3 hash of the ordered `(source, destination, short_channel_id)`
    /// list, for cache invalidation.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for c in &self.channels {
            hasher.update(c.source.as_bytes());
            hasher.update(b"\x00");
            hasher.update(c.destination.as_bytes());
            hasher.update(b"\x00");
            hasher.update(c.short_channel_id.as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
