use crate::core::config::RateLimitSettings;
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitBucket {
    pub count: u32,
    pub window_start: Instant,
}

/// Fixed-window limiter keyed by client identifier. Memory-only and local to
/// this process.
#[derive(Debug)]
pub struct RateLimiter {
    settings: RateLimitSettings,
    buckets: DashMap<String, RateLimitBucket, BuildHasherDefault<FxHasher>>,
    last_prune: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            settings,
            buckets: DashMap::with_hasher(BuildHasherDefault::default()),
            last_prune: Mutex::new(Instant::now()),
        }
    }

    #[inline]
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Counts one request for `key` at `now`; `false` once the window's quota
    /// is spent.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        self.maybe_prune(now);

        // The entry guard holds the shard lock across read-check-increment.
        let mut bucket = self
            .buckets
            .entry(key.to_owned())
            .or_insert(RateLimitBucket {
                count: 0,
                window_start: now,
            });

        if now.saturating_duration_since(bucket.window_start) >= self.settings.window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.settings.max_requests {
            return false;
        }

        bucket.count += 1;
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, key: &str) -> Option<RateLimitBucket> {
        self.buckets.get(key).map(|bucket| *bucket)
    }

    fn maybe_prune(&self, now: Instant) {
        let over_capacity = self.buckets.len() > self.settings.max_buckets;
        let mut last_prune = self.last_prune.lock();
        if !over_capacity
            && now.saturating_duration_since(*last_prune) < self.settings.prune_interval
        {
            return;
        }
        *last_prune = now;
        drop(last_prune);

        self.prune(now);
    }

    /// Drops every bucket whose window has expired at `now`.
    pub fn prune(&self, now: Instant) {
        let window = self.settings.window;
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.window_start) < window);
    }
}
