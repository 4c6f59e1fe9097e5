//! # Instrumented Caching Layer
//!
//! This module implements the cache façade over Redis together with its
//! instrumentation: invocation counters and append-only input/output call
//! history, all persisted in Redis itself.
//!
//! ## Architecture
//!
//! - [`types`]: the [`CacheValue`] union accepted by `store`
//! - [`history`]: tracked-operation identifiers, the [`CallRecorder`]
//!   bookkeeping layer, and the [`CallReport`] replay format
//! - [`store`]: the [`InstrumentedCache`] façade that forwards to Redis and
//!   performs pre/post bookkeeping around each command
//!
//! ## Example
//!
//! ```no_run
//! use cachetrace::{InstrumentedCache, TrackedOp};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cache = InstrumentedCache::connect("redis://127.0.0.1:6379").await?;
//!
//! let k1 = cache.store("hello").await?;
//! let k2 = cache.store(42i64).await?;
//!
//! assert_eq!(cache.get_str(&k1).await?, "hello");
//! assert_eq!(cache.get_int(&k2).await?, 42);
//! assert_eq!(cache.call_count(TrackedOp::Store).await?, 2);
//!
//! // "cache.store was called 2 times:" plus one line per call
//! println!("{}", cache.replay(TrackedOp::Store).await?);
//! # Ok(())
//! # }
//! ```

pub mod history;
pub mod store;
pub mod types;

pub use history::{CallRecord, CallRecorder, CallReport, TrackedOp};
pub use store::InstrumentedCache;
pub use types::{CacheKey, CacheValue};
