//! Call counting and input/output history recording
//!
//! Each tracked operation owns three Redis keys: an invocation counter and
//! two append-only lists holding the string form of every input and output,
//! index-aligned. Recording is explicit composition: the cache façade calls
//! into [`CallRecorder`] before and after each underlying command instead of
//! wrapping methods dynamically.

use crate::error::Result;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Identifier for an operation whose calls are counted and recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedOp {
    /// `InstrumentedCache::store`
    Store,
    /// `InstrumentedCache::get`
    Get,
}

impl TrackedOp {
    /// Stable name used as the counter key and history key prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedOp::Store => "cache.store",
            TrackedOp::Get => "cache.get",
        }
    }

    /// Redis key holding the invocation counter.
    pub fn counter_key(&self) -> &'static str {
        self.as_str()
    }

    /// Redis key holding the input history list.
    pub fn inputs_key(&self) -> String {
        format!("{}:inputs", self.as_str())
    }

    /// Redis key holding the output history list.
    pub fn outputs_key(&self) -> String {
        format!("{}:outputs", self.as_str())
    }
}

impl fmt::Display for TrackedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded call: the i-th input paired with the i-th output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub input: String,
    pub output: String,
}

/// The full recorded history of one tracked operation, in call order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallReport {
    /// The operation the report describes
    pub op: TrackedOp,
    /// Recorded calls, oldest first
    pub calls: Vec<CallRecord>,
}

impl CallReport {
    /// Number of recorded calls
    pub fn count(&self) -> usize {
        self.calls.len()
    }

    /// Whether the operation was ever called
    pub fn was_called(&self) -> bool {
        !self.calls.is_empty()
    }
}

impl fmt::Display for CallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.calls.is_empty() {
            return write!(f, "{} was not called.", self.op);
        }

        write!(f, "{} was called {} times:", self.op, self.calls.len())?;
        for call in &self.calls {
            write!(f, "\n{}({}) -> {}", self.op, call.input, call.output)?;
        }
        Ok(())
    }
}

/// Shared-connection recorder for counters and call history.
///
/// All state lives in Redis; the recorder itself is cheap to clone and holds
/// no in-process bookkeeping.
#[derive(Clone)]
pub struct CallRecorder {
    manager: ConnectionManager,
}

impl CallRecorder {
    /// Create a recorder over an existing connection manager
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    /// Append the string form of a call's input to the operation's history.
    ///
    /// Called before the underlying command runs.
    pub async fn record_input(&self, op: TrackedOp, input: &str) -> Result<()> {
        let mut con = self.manager.clone();
        let _: () = con.rpush(op.inputs_key(), input).await?;
        Ok(())
    }

    /// Append the string form of a call's output to the operation's history.
    ///
    /// Called after the underlying command returns.
    pub async fn record_output(&self, op: TrackedOp, output: &str) -> Result<()> {
        let mut con = self.manager.clone();
        let _: () = con.rpush(op.outputs_key(), output).await?;
        Ok(())
    }

    /// Increment the operation's invocation counter by one.
    pub async fn bump(&self, op: TrackedOp) -> Result<u64> {
        let mut con = self.manager.clone();
        let count: u64 = con.incr(op.counter_key(), 1).await?;
        debug!("{} call count is now {}", op, count);
        Ok(count)
    }

    /// Read the operation's invocation counter. A missing counter is 0.
    pub async fn count(&self, op: TrackedOp) -> Result<u64> {
        let mut con = self.manager.clone();
        let count: Option<u64> = con.get(op.counter_key()).await?;
        Ok(count.unwrap_or(0))
    }

    /// Read the full recorded history for an operation.
    ///
    /// An operation that was never called yields an empty report, not an
    /// error. Inputs and outputs are zipped in call order; a trailing input
    /// with no output (a call that failed mid-flight) is dropped from the
    /// report.
    pub async fn replay(&self, op: TrackedOp) -> Result<CallReport> {
        let mut con = self.manager.clone();

        let inputs: Vec<String> = con.lrange(op.inputs_key(), 0, -1).await?;
        let outputs: Vec<String> = con.lrange(op.outputs_key(), 0, -1).await?;

        let calls = inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, output)| CallRecord { input, output })
            .collect();

        Ok(CallReport { op, calls })
    }
}
