//! Plain-text report model for the nginx log statistics tool
//!
//! The `log-stats` binary fills a [`LogReport`] from fixed MongoDB queries;
//! this module only models and formats the report so the layout can be
//! tested without a database.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods the report breaks down, in display order.
pub const REPORTED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Request count for one HTTP method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCount {
    pub method: String,
    pub count: u64,
}

/// Request count for one client IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpCount {
    pub ip: String,
    pub count: u64,
}

/// Aggregated statistics over an nginx access-log collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogReport {
    /// Total number of log documents
    pub total: u64,
    /// Per-method counts, in [`REPORTED_METHODS`] order
    pub methods: Vec<MethodCount>,
    /// Number of `GET /status` requests
    pub status_checks: u64,
    /// Top client IPs by request count, descending
    pub top_ips: Vec<IpCount>,
}

impl fmt::Display for LogReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} logs", self.total)?;
        writeln!(f, "Methods:")?;
        for m in &self.methods {
            writeln!(f, "\tmethod {}: {}", m.method, m.count)?;
        }
        writeln!(f, "{} status check", self.status_checks)?;
        write!(f, "IPs:")?;
        for ip in &self.top_ips {
            write!(f, "\n\t{}: {}", ip.ip, ip.count)?;
        }
        Ok(())
    }
}
