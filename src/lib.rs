//! # cachetrace
//!
//! An instrumented Redis caching client for Rust.
//!
//! ## Features
//!
//! - Random-key storage: every stored value gets a fresh UUIDv4 key
//! - Call counting and input/output history for tracked operations,
//!   persisted in Redis alongside the data
//! - Typed retrieval helpers (`get_str`, `get_int`) with explicit errors
//! - Replay reports reconstructing the full call history in order
//! - Tiered health checks (PING and INFO-based) with retry and fallback
//! - Async-first design using tokio over a multiplexed connection
//!
//! ## Storing and retrieving values
//!
//! ```no_run
//! use cachetrace::InstrumentedCache;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Destructive: initialization flushes the connected database.
//!     let cache = InstrumentedCache::connect("redis://127.0.0.1:6379").await?;
//!
//!     let key = cache.store("hello").await?;
//!     assert_eq!(cache.get(&key).await?, Some(b"hello".to_vec()));
//!     assert_eq!(cache.get_str(&key).await?, "hello");
//!
//!     let key = cache.store(42i64).await?;
//!     assert_eq!(cache.get_int(&key).await?, 42);
//!     Ok(())
//! }
//! ```
//!
//! ## Replaying call history
//!
//! ```no_run
//! use cachetrace::{InstrumentedCache, TrackedOp};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cache = InstrumentedCache::connect("redis://127.0.0.1:6379").await?;
//!
//!     cache.store("first").await?;
//!     cache.store(2i64).await?;
//!
//!     let report = cache.replay(TrackedOp::Store).await?;
//!     assert_eq!(report.count(), 2);
//!     // cache.store was called 2 times:
//!     // cache.store(first) -> <uuid>
//!     // cache.store(2) -> <uuid>
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ## Health checks
//!
//! ```no_run
//! use cachetrace::RedisClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RedisClient::new("redis://127.0.0.1:6379").await?;
//!
//!     let result = client.health_check_with_retry().await;
//!     if result.status.is_operational() {
//!         println!("Redis is operational ({}ms)", result.response_time_ms);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod connection;
pub mod error;
pub mod stats;

// Re-export main types for convenience
pub use cache::{
    CacheKey, CacheValue, CallRecord, CallRecorder, CallReport, InstrumentedCache, TrackedOp,
};
pub use connection::{
    HealthCheckConfig, HealthCheckMetadata, HealthCheckMethod, HealthCheckResult, HealthStatus,
    RedisClient, DEFAULT_REDIS_URL,
};
pub use error::{CacheError, Result};
