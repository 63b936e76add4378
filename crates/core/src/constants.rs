use std::time::Duration;

/// How often a collector polls its price source
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Idle lifetime of a cache entry, refreshed on every read or write
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Maximum age of a sample kept in the cache
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(4 * 60 * 60);

/// Maximum number of distinct assets held in the cache at once
pub const DEFAULT_MAX_CACHED_ASSETS: usize = 100;

/// A cached sample further than this from the query falls through to the durable store
pub const DEFAULT_CACHE_HIT_WINDOW: Duration = Duration::from_secs(300);
