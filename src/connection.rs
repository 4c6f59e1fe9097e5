//! Redis connection management and health check implementation
//!
//! This module provides the connection layer for the instrumented cache,
//! including tiered health check functionality (PING and INFO-based).

use crate::error::{CacheError, Result};
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default connection endpoint, matching a local Redis instance.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Configuration for health check behavior
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// Whether health checks are enabled
    pub enabled: bool,
    /// Health check method to use
    pub method: HealthCheckMethod,
    /// Timeout for health check operations
    pub timeout: Duration,
    /// Whether to enable retry logic
    pub enable_retries: bool,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Delay between retry attempts
    pub retry_delay: Duration,
    /// Whether to enable fallback from INFO to PING
    pub enable_fallback: bool,
    /// Response time threshold for degraded state (in milliseconds)
    pub degraded_threshold_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            method: HealthCheckMethod::Ping,
            timeout: Duration::from_secs(5),
            enable_retries: true,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            enable_fallback: true,
            degraded_threshold_ms: 1000,
        }
    }
}

/// Health check method variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCheckMethod {
    /// Simple health check using PING (fastest, minimal overhead)
    Ping,
    /// Detailed health check using INFO server (server version, run mode)
    Info,
}

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Server is healthy and responsive
    Healthy,
    /// Server is responsive but slow (above degraded threshold)
    Degraded,
    /// Server is not responsive or erroring
    Unhealthy,
}

impl HealthStatus {
    /// Convert to HTTP status code equivalent
    pub fn to_http_status_code(&self) -> u16 {
        match self {
            HealthStatus::Healthy => 200,
            HealthStatus::Degraded => 200,
            HealthStatus::Unhealthy => 503,
        }
    }

    /// Check if status is healthy or degraded (operational)
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

/// Detailed health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Overall health status
    pub status: HealthStatus,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Redis server version (if available)
    pub server_version: Option<String>,
    /// Redis run mode, e.g. "standalone" (if available)
    pub server_mode: Option<String>,
    /// Timestamp of the health check
    pub timestamp: DateTime<Utc>,
    /// Error message (if unhealthy)
    pub error: Option<String>,
    /// Additional metadata
    pub metadata: HealthCheckMetadata,
}

/// Additional metadata for health check results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckMetadata {
    /// Health check method used
    pub check_method: HealthCheckMethod,
    /// Whether this was a retry attempt
    pub was_retry: bool,
    /// Number of retry attempts made
    pub retry_count: u32,
    /// Whether fallback was used
    pub used_fallback: bool,
}

impl HealthCheckResult {
    /// Create a healthy result
    fn healthy(
        response_time: Duration,
        server_version: Option<String>,
        server_mode: Option<String>,
        method: HealthCheckMethod,
        degraded_threshold_ms: u64,
    ) -> Self {
        let response_time_ms = response_time.as_millis() as u64;
        let status = if response_time_ms > degraded_threshold_ms {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            response_time_ms,
            server_version,
            server_mode,
            timestamp: Utc::now(),
            error: None,
            metadata: HealthCheckMetadata {
                check_method: method,
                was_retry: false,
                retry_count: 0,
                used_fallback: false,
            },
        }
    }

    /// Create an unhealthy result
    fn unhealthy(response_time: Duration, error: &str, method: HealthCheckMethod) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            response_time_ms: response_time.as_millis() as u64,
            server_version: None,
            server_mode: None,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
            metadata: HealthCheckMetadata {
                check_method: method,
                was_retry: false,
                retry_count: 0,
                used_fallback: false,
            },
        }
    }

    /// Update metadata for retry/fallback
    fn with_metadata_update(mut self, retry_count: u32, used_fallback: bool) -> Self {
        self.metadata.was_retry = retry_count > 0;
        self.metadata.retry_count = retry_count;
        self.metadata.used_fallback = used_fallback;
        self
    }
}

/// Classify the outcome of a PING round trip.
///
/// A reply other than PONG is unhealthy, not a slow success; only a true
/// PONG can be healthy or degraded.
fn classify_ping(
    outcome: Result<bool>,
    elapsed: Duration,
    degraded_threshold_ms: u64,
) -> HealthCheckResult {
    match outcome {
        Ok(true) => HealthCheckResult::healthy(
            elapsed,
            None,
            None,
            HealthCheckMethod::Ping,
            degraded_threshold_ms,
        ),
        Ok(false) => HealthCheckResult::unhealthy(
            elapsed,
            "PING returned unexpected reply",
            HealthCheckMethod::Ping,
        ),
        Err(e) => {
            HealthCheckResult::unhealthy(elapsed, &e.to_string(), HealthCheckMethod::Ping)
        }
    }
}

/// Extract a single `field:value` line from Redis INFO output.
fn parse_info_field(info: &str, field: &str) -> Option<String> {
    info.lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name == field {
                Some(value.trim().to_string())
            } else {
                None
            }
        })
}

/// Main Redis client wrapping a shared multiplexed connection
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    health_config: HealthCheckConfig,
}

impl RedisClient {
    /// Create a new Redis client with default configuration
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Example
    /// ```no_run
    /// use cachetrace::RedisClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = RedisClient::new("redis://127.0.0.1:6379").await?;
    ///     let is_healthy = client.health_check().await?;
    ///     println!("Server healthy: {}", is_healthy);
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(url: &str) -> Result<Self> {
        Self::with_config(url, HealthCheckConfig::default()).await
    }

    /// Create a new Redis client with custom health check configuration
    pub async fn with_config(url: &str, health_config: HealthCheckConfig) -> Result<Self> {
        info!("Connecting to Redis at {}", url);

        let client =
            redis::Client::open(url).map_err(|e| CacheError::ConfigError(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::ConnectionError(e.to_string()))?;

        info!("Successfully connected to Redis");

        Ok(Self {
            manager,
            health_config,
        })
    }

    /// Create a client from the `REDIS_URL` environment variable,
    /// falling back to [`DEFAULT_REDIS_URL`].
    pub async fn from_env() -> Result<Self> {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        Self::new(&url).await
    }

    /// Simple health check using PING
    ///
    /// This is the fastest health check method with minimal overhead.
    /// Suitable for load balancers and frequent health checks.
    ///
    /// # Returns
    /// * `Ok(true)` if the server answers PONG
    /// * `Err(CacheError)` if the round trip fails
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Executing simple health check (PING)");

        let mut con = self.connection();
        let pong: String = redis::cmd("PING")
            .query_async(&mut con)
            .await
            .map_err(|e| CacheError::ConnectionError(e.to_string()))?;

        if pong == "PONG" {
            debug!("Simple health check passed");
            Ok(true)
        } else {
            warn!("PING returned unexpected reply: {}", pong);
            Ok(false)
        }
    }

    /// Detailed health check using INFO server
    ///
    /// Provides diagnostics including server version, run mode, and response
    /// time. Never panics - captures all errors internally.
    ///
    /// Suitable for monitoring dashboards and detailed diagnostics.
    ///
    /// # Returns
    /// Always returns a `HealthCheckResult`, even on failure (status will be Unhealthy)
    pub async fn health_check_info(&self) -> HealthCheckResult {
        debug!("Executing detailed health check (INFO server)");
        let start = Instant::now();

        let mut con = self.connection();
        match redis::cmd("INFO")
            .arg("server")
            .query_async::<String>(&mut con)
            .await
        {
            Ok(info) => {
                let elapsed = start.elapsed();
                let version = parse_info_field(&info, "redis_version");
                let mode = parse_info_field(&info, "redis_mode");

                debug!("Detailed health check passed ({}ms)", elapsed.as_millis());

                HealthCheckResult::healthy(
                    elapsed,
                    version,
                    mode,
                    HealthCheckMethod::Info,
                    self.health_config.degraded_threshold_ms,
                )
            }
            Err(e) => {
                let elapsed = start.elapsed();
                error!("Detailed health check failed: {}", e);
                HealthCheckResult::unhealthy(
                    elapsed,
                    &format!("INFO server failed: {}", e),
                    HealthCheckMethod::Info,
                )
            }
        }
    }

    /// Execute health check with retry logic and fallback
    ///
    /// This method implements the configured health check strategy including:
    /// - Automatic retries on transient failures
    /// - Fallback from INFO to PING when INFO is unavailable
    /// - Degraded state detection based on response time
    ///
    /// # Returns
    /// Always returns a `HealthCheckResult` with detailed status information
    pub async fn health_check_with_retry(&self) -> HealthCheckResult {
        let mut retry_count = 0;
        let mut used_fallback = false;
        let max_retries = if self.health_config.enable_retries {
            self.health_config.max_retries
        } else {
            0
        };

        loop {
            let start = Instant::now();

            let result = match self.health_config.method {
                HealthCheckMethod::Ping => classify_ping(
                    self.timed_ping().await,
                    start.elapsed(),
                    self.health_config.degraded_threshold_ms,
                ),
                HealthCheckMethod::Info => {
                    let result = self.health_check_info().await;
                    if result.status == HealthStatus::Unhealthy
                        && self.health_config.enable_fallback
                        && !used_fallback
                    {
                        warn!("INFO server failed, falling back to PING");
                        used_fallback = true;
                        classify_ping(
                            self.timed_ping().await,
                            start.elapsed(),
                            self.health_config.degraded_threshold_ms,
                        )
                    } else {
                        result
                    }
                }
            };

            // If healthy or we've exhausted retries, return the result
            if result.status.is_operational() || retry_count >= max_retries {
                return result.with_metadata_update(retry_count, used_fallback);
            }

            retry_count += 1;
            warn!(
                "Health check failed (attempt {}/{}), retrying after {:?}",
                retry_count,
                max_retries + 1,
                self.health_config.retry_delay
            );
            tokio::time::sleep(self.health_config.retry_delay).await;
        }
    }

    /// PING bounded by the configured health check timeout.
    async fn timed_ping(&self) -> Result<bool> {
        match tokio::time::timeout(self.health_config.timeout, self.health_check()).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::TimeoutError {
                timeout_seconds: self.health_config.timeout.as_secs(),
                context: "health check".to_string(),
            }),
        }
    }

    /// Remove every key from the currently selected database.
    ///
    /// Destructive: wipes data written by any client of this database, not
    /// just data written through this library.
    pub async fn flush_db(&self) -> Result<()> {
        warn!("Flushing entire Redis database");

        let mut con = self.connection();
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut con)
            .await
            .map_err(CacheError::DriverError)?;

        Ok(())
    }

    /// Get a clone of the underlying connection manager
    ///
    /// The manager multiplexes one TCP connection and reconnects on failure;
    /// clones share the same connection.
    pub fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Get the current health check configuration
    pub fn health_config(&self) -> &HealthCheckConfig {
        &self.health_config
    }

    /// Update the health check configuration
    pub fn set_health_config(&mut self, config: HealthCheckConfig) {
        self.health_config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_http_codes() {
        assert_eq!(HealthStatus::Healthy.to_http_status_code(), 200);
        assert_eq!(HealthStatus::Degraded.to_http_status_code(), 200);
        assert_eq!(HealthStatus::Unhealthy.to_http_status_code(), 503);
    }

    #[test]
    fn test_health_status_operational() {
        assert!(HealthStatus::Healthy.is_operational());
        assert!(HealthStatus::Degraded.is_operational());
        assert!(!HealthStatus::Unhealthy.is_operational());
    }

    #[test]
    fn test_health_check_result_healthy() {
        let result = HealthCheckResult::healthy(
            Duration::from_millis(50),
            Some("7.2.4".to_string()),
            Some("standalone".to_string()),
            HealthCheckMethod::Info,
            1000,
        );

        assert_eq!(result.status, HealthStatus::Healthy);
        assert_eq!(result.response_time_ms, 50);
        assert_eq!(result.server_version, Some("7.2.4".to_string()));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_health_check_result_degraded() {
        let result = HealthCheckResult::healthy(
            Duration::from_millis(1500),
            Some("7.2.4".to_string()),
            None,
            HealthCheckMethod::Info,
            1000,
        );

        assert_eq!(result.status, HealthStatus::Degraded);
        assert_eq!(result.response_time_ms, 1500);
    }

    #[test]
    fn test_health_check_result_unhealthy() {
        let result = HealthCheckResult::unhealthy(
            Duration::from_millis(100),
            "Connection refused",
            HealthCheckMethod::Ping,
        );

        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert_eq!(result.response_time_ms, 100);
        assert!(result.error.is_some());
        assert_eq!(result.error.unwrap(), "Connection refused");
    }

    #[test]
    fn test_default_health_check_config() {
        let config = HealthCheckConfig::default();

        assert!(config.enabled);
        assert_eq!(config.method, HealthCheckMethod::Ping);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.enable_retries);
        assert_eq!(config.max_retries, 3);
        assert!(config.enable_fallback);
    }

    #[test]
    fn test_classify_ping_pong_reply() {
        let result = classify_ping(Ok(true), Duration::from_millis(5), 1000);
        assert_eq!(result.status, HealthStatus::Healthy);

        let result = classify_ping(Ok(true), Duration::from_millis(1500), 1000);
        assert_eq!(result.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_classify_ping_unexpected_reply() {
        // A non-PONG reply must not pass as healthy, so the retry loop engages
        let result = classify_ping(Ok(false), Duration::from_millis(5), 1000);

        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert!(!result.status.is_operational());
        assert!(result.error.unwrap().contains("unexpected reply"));
    }

    #[test]
    fn test_classify_ping_transport_error() {
        let outcome = Err(CacheError::ConnectionError("broken pipe".to_string()));
        let result = classify_ping(outcome, Duration::from_millis(5), 1000);

        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert!(result.error.unwrap().contains("broken pipe"));
    }

    #[test]
    fn test_parse_info_field() {
        let info = "# Server\r\nredis_version:7.2.4\r\nredis_mode:standalone\r\nos:Linux\r\n";

        assert_eq!(
            parse_info_field(info, "redis_version"),
            Some("7.2.4".to_string())
        );
        assert_eq!(
            parse_info_field(info, "redis_mode"),
            Some("standalone".to_string())
        );
        assert_eq!(parse_info_field(info, "uptime_in_seconds"), None);
    }

    #[test]
    fn test_health_check_result_serialization() {
        let result = HealthCheckResult::healthy(
            Duration::from_millis(10),
            Some("7.2.4".to_string()),
            Some("standalone".to_string()),
            HealthCheckMethod::Info,
            1000,
        );

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"Healthy\""));
        assert!(json.contains("\"check_method\":\"info\""));
    }
}
