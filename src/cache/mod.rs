//! Response caching
//!
//! Two layers live here. `ResponseCache` is the in-process TTL cache the
//! dashboard puts in front of every fetch. `CacheManager` persists responses to
//! disk with expiry timestamps so a restart within the TTL does not hit the API
//! again.

mod manager;
mod memory;

pub use manager::{CacheManager, CachedData};
pub use memory::{Clock, ResponseCache, SystemClock};
