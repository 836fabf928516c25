//! # lrucache
//!
//! Fixed-capacity Least-Recently-Used cache with O(1) get/put.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to entry handle (O(1))
//! - **Ordered list**: slot-arena doubly linked list in recency order (O(1))
//! - **Shared handle**: whole-cache mutex for multi-threaded embedders
//!
//! ```
//! use lrucache::LruCache;
//!
//! let mut cache = LruCache::new(2)?;
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get("a");
//! cache.put("c", 3);
//!
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.to_string(), "(c: 3) -> (a: 1)");
//! # Ok::<(), lrucache::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod entry;
mod error;
mod list;
mod shared;
mod stats;

pub use cache::LruCache;
pub use config::CacheConfig;
pub use entry::EntryHandle;
pub use error::{Error, Result};
pub use list::{Iter, OrderedList};
pub use shared::SharedLruCache;
pub use stats::{CacheStats, StatsSnapshot};
