//! Lists recent bills and the full action history of one bill.
//!
//! Reads `CONGRESS_API_KEY` from the environment or a `.env` file:
//!
//! ```sh
//! CONGRESS_API_KEY=... cargo run --example list_bills
//! ```

use anyhow::Context;
use integrations_congress::{BillType, CongressClient, Limit, ListOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = CongressClient::from_dotenv().context("failed to configure client")?;

    let recent = client
        .bills()
        .list_by_congress(None, &ListOptions::new().limit(Limit::Count(5)).sort("updateDate+desc"))
        .await?;

    println!(
        "Congress {} has {} bills; latest updates:",
        client.config().default_congress,
        recent.total_count().unwrap_or(0)
    );
    for bill in recent.records().unwrap_or_default() {
        println!(
            "  {} {}: {}",
            bill["type"].as_str().unwrap_or("?"),
            bill["number"].as_str().unwrap_or("?"),
            bill["title"].as_str().unwrap_or("")
        );
    }

    let actions = client
        .bills()
        .actions(BillType::Hr, 3076, Some(117), &ListOptions::new())
        .await?;
    println!(
        "H.R. 3076 (117th) has {} actions",
        actions.records().map_or(0, |r| r.len())
    );

    let snapshot = client.metrics().snapshot();
    println!(
        "{} requests, {} pages followed, {}us average latency",
        snapshot.requests_total, snapshot.pages_followed, snapshot.average_latency_us
    );

    Ok(())
}
