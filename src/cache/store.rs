//! The instrumented cache façade over Redis
//!
//! `InstrumentedCache` issues plain Redis commands and layers call counting
//! and history recording on top via [`CallRecorder`]. It holds no in-process
//! copy of any stored value; Redis owns all state, including the
//! instrumentation itself.

use crate::cache::history::{CallRecorder, CallReport, TrackedOp};
use crate::cache::types::CacheValue;
use crate::connection::RedisClient;
use crate::error::{CacheError, Result};
use redis::AsyncCommands;
use tracing::{debug, warn};
use uuid::Uuid;

/// Instrumented key-value cache over a shared Redis connection.
///
/// Construction wipes the connected database. Every `store` call writes the
/// value under a fresh UUIDv4 key and records the call in the `cache.store`
/// history; every `get` call is recorded in the `cache.get` history.
pub struct InstrumentedCache {
    client: RedisClient,
    recorder: CallRecorder,
}

impl InstrumentedCache {
    /// Create a cache over an existing client.
    ///
    /// Destructive: issues FLUSHDB, removing *all* keys in the connected
    /// database, related to this cache or not. This is intentional
    /// initialization behavior, not an error condition.
    pub async fn new(client: RedisClient) -> Result<Self> {
        warn!("Initializing instrumented cache: flushing connected database");
        client.flush_db().await?;

        let recorder = CallRecorder::new(client.connection());
        Ok(Self { client, recorder })
    }

    /// Connect to `url` and initialize the cache (flushes the database).
    ///
    /// # Example
    /// ```no_run
    /// use cachetrace::{InstrumentedCache, TrackedOp};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let cache = InstrumentedCache::connect("redis://127.0.0.1:6379").await?;
    ///
    ///     let key = cache.store("hello").await?;
    ///     assert_eq!(cache.get_str(&key).await?, "hello");
    ///
    ///     let report = cache.replay(TrackedOp::Store).await?;
    ///     println!("{}", report);
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        let client = RedisClient::new(url).await?;
        Self::new(client).await
    }

    /// Store a value under a freshly generated random key.
    ///
    /// Accepts text, bytes, integers, and floats via [`CacheValue`]
    /// conversions. Exactly one counter bump and one input/output history
    /// pair are appended per call, regardless of value type.
    ///
    /// Returns the generated key - the only handle to the stored value.
    pub async fn store(&self, data: impl Into<CacheValue>) -> Result<String> {
        let value = data.into();
        let key = Uuid::new_v4().to_string();

        self.recorder
            .record_input(TrackedOp::Store, &value.to_string())
            .await?;

        let mut con = self.client.connection();
        let _: () = con.set(&key, &value).await?;
        debug!("Stored value under key {}", key);

        self.recorder.record_output(TrackedOp::Store, &key).await?;
        self.recorder.bump(TrackedOp::Store).await?;

        Ok(key)
    }

    /// Fetch the raw bytes stored under `key`.
    ///
    /// A missing key is `Ok(None)`, never an error.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.recorder.record_input(TrackedOp::Get, key).await?;

        let mut con = self.client.connection();
        let value: Option<Vec<u8>> = con.get(key).await?;

        let output = match &value {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => "nil".to_string(),
        };
        self.recorder.record_output(TrackedOp::Get, &output).await?;
        self.recorder.bump(TrackedOp::Get).await?;

        Ok(value)
    }

    /// Fetch and transform the value stored under `key`.
    ///
    /// The transform runs only when a value is present; a missing key is
    /// surfaced as `Ok(None)` rather than being fed to the transform. This
    /// guards the sentinel instead of letting the transform fail on it.
    pub async fn get_with<T, F>(&self, key: &str, transform: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(transform(bytes)?)),
            None => Ok(None),
        }
    }

    /// Fetch the value stored under `key` as UTF-8 text.
    ///
    /// # Errors
    /// * [`CacheError::KeyNotFound`] if no value is stored under `key`
    /// * [`CacheError::DecodeError`] if the value is not valid UTF-8
    pub async fn get_str(&self, key: &str) -> Result<String> {
        let decoded = self
            .get_with(key, |bytes| {
                String::from_utf8(bytes).map_err(|source| CacheError::DecodeError {
                    key: key.to_string(),
                    source,
                })
            })
            .await?;

        decoded.ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    /// Fetch the value stored under `key` as a signed integer.
    ///
    /// # Errors
    /// * [`CacheError::KeyNotFound`] if no value is stored under `key`
    /// * [`CacheError::DecodeError`] if the value is not valid UTF-8
    /// * [`CacheError::ParseError`] if the text is not a valid integer
    pub async fn get_int(&self, key: &str) -> Result<i64> {
        let parsed = self
            .get_with(key, |bytes| {
                let text =
                    String::from_utf8(bytes).map_err(|source| CacheError::DecodeError {
                        key: key.to_string(),
                        source,
                    })?;
                text.parse::<i64>().map_err(|source| CacheError::ParseError {
                    key: key.to_string(),
                    source,
                })
            })
            .await?;

        parsed.ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    /// Number of times `op` has been called. Never-called operations are 0.
    pub async fn call_count(&self, op: TrackedOp) -> Result<u64> {
        self.recorder.count(op).await
    }

    /// Read the recorded call history of `op`.
    ///
    /// Rendering the returned [`CallReport`] reproduces the classic replay
    /// output: a "was not called" line for empty history, otherwise the call
    /// count followed by one `op(input) -> output` line per call in order.
    pub async fn replay(&self, op: TrackedOp) -> Result<CallReport> {
        self.recorder.replay(op).await
    }

    /// The underlying client, for health checks and direct access.
    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}
