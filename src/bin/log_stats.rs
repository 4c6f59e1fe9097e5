//! Nginx log statistics over MongoDB
//!
//! Issues a fixed set of count and aggregation queries against the
//! `logs.nginx` collection and prints a plain-text report to stdout:
//! total logs, per-method counts, `GET /status` checks, and the ten most
//! frequent client IPs.
//!
//! Connection endpoint comes from `MONGODB_URI` (dotenv-aware), defaulting
//! to a local instance.

use anyhow::{Context, Result};
use cachetrace::stats::{IpCount, LogReport, MethodCount, REPORTED_METHODS};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_MONGODB_URI: &str = "mongodb://127.0.0.1:27017";

/// Run the fixed aggregation queries and assemble the report.
async fn collect_report(logs: &Collection<Document>) -> Result<LogReport> {
    let total = logs
        .count_documents(doc! {})
        .await
        .context("counting log documents")?;

    let mut methods = Vec::with_capacity(REPORTED_METHODS.len());
    for method in REPORTED_METHODS {
        let count = logs
            .count_documents(doc! { "method": method })
            .await
            .with_context(|| format!("counting {} requests", method))?;
        methods.push(MethodCount {
            method: method.to_string(),
            count,
        });
    }

    let status_checks = logs
        .count_documents(doc! { "method": "GET", "path": "/status" })
        .await
        .context("counting status checks")?;

    // Grouping, sorting, and limiting run inside MongoDB.
    let pipeline = vec![
        doc! { "$group": { "_id": "$ip", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": 10 },
    ];

    let mut cursor = logs
        .aggregate(pipeline)
        .await
        .context("aggregating top IPs")?;

    let mut top_ips = Vec::new();
    while let Some(group) = cursor.try_next().await? {
        let ip = group.get_str("_id").unwrap_or_default().to_string();
        let count = group
            .get_i64("count")
            .or_else(|_| group.get_i32("count").map(i64::from))
            .unwrap_or(0);
        top_ips.push(IpCount {
            ip,
            count: count.max(0) as u64,
        });
    }

    Ok(LogReport {
        total,
        methods,
        status_checks,
        top_ips,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let uri =
        std::env::var("MONGODB_URI").unwrap_or_else(|_| DEFAULT_MONGODB_URI.to_string());

    info!("Connecting to MongoDB at {}", uri);
    let client = Client::with_uri_str(&uri)
        .await
        .context("connecting to MongoDB")?;

    let logs = client.database("logs").collection::<Document>("nginx");
    let report = collect_report(&logs).await?;

    println!("{}", report);
    Ok(())
}
