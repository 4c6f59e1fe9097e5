//! Core value types for the instrumented cache

use redis::{RedisWrite, ToRedisArgs};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type - UUIDv4 strings generated on store
pub type CacheKey = String;

/// A value accepted by [`store`](crate::InstrumentedCache::store).
///
/// Values are written to Redis in their canonical byte form: text as UTF-8,
/// bytes verbatim, numbers as their decimal representation. Retrieval always
/// yields raw bytes; the typed helpers re-interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheValue {
    /// UTF-8 text
    Text(String),
    /// Raw byte sequence
    Bytes(Vec<u8>),
    /// Signed integer
    Int(i64),
    /// Floating-point number
    Float(f64),
}

impl ToRedisArgs for CacheValue {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        match self {
            CacheValue::Text(s) => out.write_arg(s.as_bytes()),
            CacheValue::Bytes(b) => out.write_arg(b),
            CacheValue::Int(i) => out.write_arg_fmt(i),
            CacheValue::Float(x) => out.write_arg_fmt(x),
        }
    }
}

impl fmt::Display for CacheValue {
    /// The textual form recorded in the call history.
    ///
    /// Non-UTF-8 byte sequences are rendered lossily; the stored value
    /// itself is never altered.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheValue::Text(s) => write!(f, "{}", s),
            CacheValue::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            CacheValue::Int(i) => write!(f, "{}", i),
            CacheValue::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        CacheValue::Text(s.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(s: String) -> Self {
        CacheValue::Text(s)
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(b: Vec<u8>) -> Self {
        CacheValue::Bytes(b)
    }
}

impl From<&[u8]> for CacheValue {
    fn from(b: &[u8]) -> Self {
        CacheValue::Bytes(b.to_vec())
    }
}

impl From<i64> for CacheValue {
    fn from(i: i64) -> Self {
        CacheValue::Int(i)
    }
}

impl From<f64> for CacheValue {
    fn from(x: f64) -> Self {
        CacheValue::Float(x)
    }
}
