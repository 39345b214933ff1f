//! Concurrency-safe store of per-client limiter state.
//!
//! # Responsibilities
//! - Map client identifiers to their token bucket, creating entries lazily
//! - Track last-activity timestamps for staleness-based eviction
//! - Serialize structural map changes and bucket arithmetic independently
//!
//! # Design Decisions
//! - The registry lock protects only insertion/lookup/removal. Bucket
//!   arithmetic happens under the entry's own lock, acquired only after
//!   the registry lock has been released, so a hot client never blocks
//!   lookups or checks for unrelated clients.
//! - `last_seen` is stored as milliseconds since a registry-creation epoch
//!   in an atomic, so refreshing it needs no lock and the sweep reads it
//!   while holding only the registry lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::bucket::TokenBucket;

/// A single client's tracked state: its bucket plus last-activity stamp.
pub struct ClientEntry {
    /// Guards all bucket arithmetic for this client.
    bucket: Mutex<TokenBucket>,
    /// Milliseconds since the registry epoch at the client's last check.
    last_seen_ms: AtomicU64,
}

impl ClientEntry {
    fn new(bucket: TokenBucket, last_seen_ms: u64) -> Self {
        Self {
            bucket: Mutex::new(bucket),
            last_seen_ms: AtomicU64::new(last_seen_ms),
        }
    }
}

/// Registry of per-client admission state, shared by all request tasks
/// and the background janitor.
///
/// The registry exclusively owns its entries; callers interact with them
/// only through [`ClientRegistry::check_and_update`] and the sweep.
pub struct ClientRegistry {
    /// client identifier -> entry. Guarded by the registry lock.
    clients: Mutex<HashMap<String, Arc<ClientEntry>>>,
    /// Reference point for the epoch-relative `last_seen_ms` stamps.
    epoch: Instant,
    rate_per_second: f64,
    burst: u32,
}

impl ClientRegistry {
    /// Create an empty registry. Every entry it creates uses the given
    /// rate and burst, immutable for the registry's lifetime.
    pub fn new(rate_per_second: f64, burst: u32) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            epoch: Instant::now(),
            rate_per_second,
            burst,
        }
    }

    /// Find the entry for `identifier`, creating it with a full bucket on
    /// first sight.
    ///
    /// The existence check and insertion form one critical section under
    /// the registry lock, so concurrent first-time callers for the same
    /// identifier all observe the same entry.
    pub fn lookup_or_create(&self, identifier: &str) -> Arc<ClientEntry> {
        let mut clients = self.clients.lock().expect("client registry mutex poisoned");

        if let Some(entry) = clients.get(identifier) {
            return entry.clone();
        }

        let entry = Arc::new(ClientEntry::new(
            TokenBucket::new(self.rate_per_second, self.burst),
            self.elapsed_ms(Instant::now()),
        ));
        clients.insert(identifier.to_string(), entry.clone());
        entry
    }

    /// Run the admission check for `identifier` at `now`, refreshing its
    /// last-activity stamp. Returns `true` if the request is admitted.
    pub fn check_and_update(&self, identifier: &str, now: Instant) -> bool {
        let entry = self.lookup_or_create(identifier);
        entry.last_seen_ms.store(self.elapsed_ms(now), Ordering::Relaxed);

        // The registry lock is already released; only this entry's lock
        // serializes the bucket arithmetic.
        let mut bucket = entry.bucket.lock().expect("client entry mutex poisoned");
        bucket.allow(now)
    }

    /// Remove every entry whose last activity is older than
    /// `stale_threshold` at `now`. Returns the number of evicted entries.
    ///
    /// Runs to completion under the registry lock; concurrent checks for
    /// unrelated identifiers queue briefly, they never fail.
    pub fn sweep(&self, now: Instant, stale_threshold: Duration) -> usize {
        let cutoff = self
            .elapsed_ms(now)
            .saturating_sub(stale_threshold.as_millis() as u64);

        let mut clients = self.clients.lock().expect("client registry mutex poisoned");
        let before = clients.len();
        clients.retain(|_, entry| entry.last_seen_ms.load(Ordering::Relaxed) >= cutoff);
        before - clients.len()
    }

    /// Number of clients currently tracked.
    pub fn len(&self) -> usize {
        self.clients.lock().expect("client registry mutex poisoned").len()
    }

    /// Whether no clients are currently tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn elapsed_ms(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.epoch).as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_identifiers_do_not_share_buckets() {
        let registry = ClientRegistry::new(1.0, 1);
        let now = Instant::now();

        assert!(registry.check_and_update("203.0.113.5", now));
        assert!(!registry.check_and_update("203.0.113.5", now));

        // Exhausting the first client leaves the second untouched.
        assert!(registry.check_and_update("203.0.113.9", now));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn concurrent_lookup_or_create_yields_one_entry() {
        let registry = Arc::new(ClientRegistry::new(10.0, 5));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.lookup_or_create("198.51.100.7"))
            })
            .collect();

        let entries: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("lookup thread panicked"))
            .collect();

        for entry in &entries[1..] {
            assert!(Arc::ptr_eq(&entries[0], entry));
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn sweep_evicts_only_stale_entries() {
        let registry = ClientRegistry::new(2.0, 4);
        let start = Instant::now();
        let threshold = Duration::from_secs(180);

        registry.check_and_update("203.0.113.5", start);
        registry.check_and_update("203.0.113.9", start + Duration::from_secs(150));
        let fresh = registry.lookup_or_create("203.0.113.9");

        let evicted = registry.sweep(start + Duration::from_secs(200), threshold);

        assert_eq!(evicted, 1);
        assert_eq!(registry.len(), 1);
        // The surviving entry is the same instance, untouched by the sweep.
        assert!(Arc::ptr_eq(&fresh, &registry.lookup_or_create("203.0.113.9")));
    }

    #[test]
    fn entry_touched_at_threshold_survives() {
        let registry = ClientRegistry::new(2.0, 4);
        let start = Instant::now();
        let threshold = Duration::from_secs(180);

        registry.check_and_update("203.0.113.5", start);

        assert_eq!(registry.sweep(start + threshold, threshold), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn eviction_resets_bucket_state() {
        let registry = ClientRegistry::new(1.0, 2);
        let start = Instant::now();

        assert!(registry.check_and_update("203.0.113.5", start));
        assert!(registry.check_and_update("203.0.113.5", start));
        assert!(!registry.check_and_update("203.0.113.5", start));

        let later = start + Duration::from_secs(600);
        assert_eq!(registry.sweep(later, Duration::from_secs(180)), 1);

        // The re-created entry starts with a full burst, not a resumed one.
        assert!(registry.check_and_update("203.0.113.5", later));
        assert!(registry.check_and_update("203.0.113.5", later));
        assert!(!registry.check_and_update("203.0.113.5", later));
    }
}
