//! Per-key request coalescing.
//!
//! Guarantees at most one in-flight upstream fetch per tile key. The first
//! caller to register a key becomes the leader and runs the fetch; callers
//! arriving while the fetch is in flight subscribe to the same broadcast
//! channel and receive the shared outcome, success or failure.
//!
//! The in-flight entry is removed in [`RequestCoalescer::complete`]
//! *before* the outcome is broadcast, so the slot can never be left stuck:
//! a failed fetch clears the way for the next request to retry, and a
//! caller racing the removal simply becomes the leader of a fresh attempt.

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::cache::{TileImage, TileKey};

use super::TileError;

/// Outcome of a shared fetch, delivered to every waiter.
pub type FetchOutcome = Result<TileImage, TileError>;

/// Result of registering interest in a tile key.
pub enum CoalesceResult {
    /// No fetch was in flight; the caller is the leader and must run the
    /// fetch, then call [`RequestCoalescer::complete`]. The receiver
    /// delivers the outcome like any other waiter's.
    New(broadcast::Receiver<FetchOutcome>),

    /// A fetch for this key is already in flight; wait on the receiver.
    Coalesced(broadcast::Receiver<FetchOutcome>),
}

/// Tracks in-flight fetches by tile key.
///
/// Backed by a sharded concurrent map, so registration for unrelated keys
/// never contends on a single lock.
#[derive(Default)]
pub struct RequestCoalescer {
    inflight: DashMap<TileKey, broadcast::Sender<FetchOutcome>>,
}

impl RequestCoalescer {
    /// Creates an empty coalescer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `key`.
    ///
    /// Returns [`CoalesceResult::New`] if this caller starts the fetch, or
    /// [`CoalesceResult::Coalesced`] to wait on an existing one.
    pub fn register(&self, key: &TileKey) -> CoalesceResult {
        use dashmap::mapref::entry::Entry;

        match self.inflight.entry(key.clone()) {
            Entry::Occupied(entry) => CoalesceResult::Coalesced(entry.get().subscribe()),
            Entry::Vacant(entry) => {
                // Capacity 1: exactly one outcome is ever sent per attempt.
                let (tx, rx) = broadcast::channel(1);
                entry.insert(tx);
                CoalesceResult::New(rx)
            }
        }
    }

    /// Completes the in-flight fetch for `key`, delivering `outcome` to all
    /// waiters and clearing the slot.
    ///
    /// Must be called exactly once per [`CoalesceResult::New`], on success
    /// and on failure alike.
    pub fn complete(&self, key: &TileKey, outcome: FetchOutcome) {
        if let Some((_, tx)) = self.inflight.remove(key) {
            // Send can only fail if every waiter already went away.
            let _ = tx.send(outcome);
        }
    }

    /// Number of fetches currently in flight.
    pub fn inflight_count(&self) -> usize {
        self.inflight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use bytes::Bytes;

    fn test_key(x: u32) -> TileKey {
        TileKey::new("test", TileCoord::new(10, x as i64, 5).unwrap())
    }

    fn test_tile() -> TileImage {
        TileImage::new(Bytes::from_static(&[1, 2, 3]), "image/png")
    }

    #[tokio::test]
    async fn test_first_registration_is_new() {
        let coalescer = RequestCoalescer::new();
        let result = coalescer.register(&test_key(1));
        assert!(matches!(result, CoalesceResult::New(_)));
        assert_eq!(coalescer.inflight_count(), 1);
    }

    #[tokio::test]
    async fn test_second_registration_is_coalesced() {
        let coalescer = RequestCoalescer::new();
        let _leader = coalescer.register(&test_key(1));
        let follower = coalescer.register(&test_key(1));
        assert!(matches!(follower, CoalesceResult::Coalesced(_)));
        assert_eq!(coalescer.inflight_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let coalescer = RequestCoalescer::new();
        let a = coalescer.register(&test_key(1));
        let b = coalescer.register(&test_key(2));
        assert!(matches!(a, CoalesceResult::New(_)));
        assert!(matches!(b, CoalesceResult::New(_)));
        assert_eq!(coalescer.inflight_count(), 2);
    }

    #[tokio::test]
    async fn test_complete_delivers_to_all_waiters() {
        let coalescer = RequestCoalescer::new();
        let key = test_key(1);

        let CoalesceResult::New(mut leader_rx) = coalescer.register(&key) else {
            panic!("expected New");
        };
        let CoalesceResult::Coalesced(mut follower_rx) = coalescer.register(&key) else {
            panic!("expected Coalesced");
        };

        coalescer.complete(&key, Ok(test_tile()));

        assert_eq!(leader_rx.recv().await.unwrap(), Ok(test_tile()));
        assert_eq!(follower_rx.recv().await.unwrap(), Ok(test_tile()));
    }

    #[tokio::test]
    async fn test_complete_clears_slot_on_failure() {
        let coalescer = RequestCoalescer::new();
        let key = test_key(1);

        let CoalesceResult::New(mut rx) = coalescer.register(&key) else {
            panic!("expected New");
        };

        coalescer.complete(
            &key,
            Err(TileError::Upstream(
                crate::provider::ProviderError::Status { status: 502 },
            )),
        );

        assert!(rx.recv().await.unwrap().is_err());
        assert_eq!(coalescer.inflight_count(), 0);

        // A retry after failure starts a fresh fetch.
        assert!(matches!(coalescer.register(&key), CoalesceResult::New(_)));
    }

    #[tokio::test]
    async fn test_complete_unknown_key_is_noop() {
        let coalescer = RequestCoalescer::new();
        coalescer.complete(&test_key(1), Ok(test_tile()));
        assert_eq!(coalescer.inflight_count(), 0);
    }
}
