//! Walk through the Bulk API 2.0 job types against a real org.
//!
//! ```sh
//! cargo run --bin bulk-sample -- path/to/.secrets.salesforce.json
//! ```
//!
//! The secrets file holds `username`, `password`, `security_token` and
//! optionally `domain` / `api_version`. Set `SFJOBS_EXTERNAL_ID_FIELD` to an
//! external id field on Account to include the upsert step.

use anyhow::{Context, Result};
use sfjobs::{BulkApiClient, IngestJob, ResultSet};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SECRETS: &str = ".secrets.salesforce.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SECRETS.to_string());
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading connection settings from {path}"))?;

    let client = sfjobs::connect_from_json(&json)
        .await
        .context("connecting to Salesforce")?;
    info!(bulk_url = %client.bulk_base_url(), "Connected");

    query_sample(&client).await?;
    let ids = insert_sample(&client).await?;
    update_sample(&client, &ids).await?;
    upsert_sample(&client).await?;
    delete_sample(&client, &ids).await?;

    info!("Sample complete");
    Ok(())
}

async fn query_sample(client: &BulkApiClient) -> Result<()> {
    info!("=== Query ===");
    let soql = "SELECT Id FROM Contact";

    // Handle API
    let mut job = client.start_query(soql).await?;
    info!(job = ?job.descriptor(), "Query job created");
    job.poll_status().await?;
    info!(job = ?job.descriptor(), "Query job finished");
    log_results("query", &job.get_results().await?);

    // Raw API
    let descriptor = client.create_query_job(soql, false).await?;
    info!(raw = %serde_json::to_string(&descriptor)?, "Raw query job");
    let finished = client.poll_query_job(descriptor.id()).await?;
    info!(state = %finished.state(), "Raw query job finished");
    log_results("raw query", &client.get_query_job_results(descriptor.id()).await?);

    Ok(())
}

async fn insert_sample(client: &BulkApiClient) -> Result<Vec<String>> {
    info!("=== Insert ===");
    let csv_data = to_csv(
        &["Name"],
        &[&["Company A"], &["Company B"], &["Company C"]],
    )?;

    let mut job = client.start_insert("Account").await?;
    info!(job_id = %job.id(), "Insert job created");
    let successful = run_ingest(&mut job, &csv_data).await?;

    Ok(successful
        .records()
        .filter_map(|record| record.get("sf__Id"))
        .map(str::to_string)
        .collect())
}

async fn update_sample(client: &BulkApiClient, ids: &[String]) -> Result<()> {
    info!("=== Update ===");
    let Some(id) = ids.first() else {
        warn!("No inserted records to update");
        return Ok(());
    };

    let csv_data = to_csv(&["Id", "Name"], &[&[id.as_str(), "Updated Company Name"]])?;
    let mut job = client.start_update("Account").await?;
    run_ingest(&mut job, &csv_data).await?;
    Ok(())
}

async fn upsert_sample(client: &BulkApiClient) -> Result<()> {
    info!("=== Upsert ===");
    let Ok(field) = std::env::var("SFJOBS_EXTERNAL_ID_FIELD") else {
        info!("SFJOBS_EXTERNAL_ID_FIELD not set, skipping upsert");
        return Ok(());
    };

    let csv_data = to_csv(
        &[field.as_str(), "Name"],
        &[&["EXT001", "Upsert Company A"], &["EXT002", "Upsert Company B"]],
    )?;
    let mut job = client.start_upsert("Account", &field).await?;
    run_ingest(&mut job, &csv_data).await?;
    Ok(())
}

async fn delete_sample(client: &BulkApiClient, ids: &[String]) -> Result<()> {
    info!("=== Delete ===");
    if ids.is_empty() {
        warn!("No inserted records to delete");
        return Ok(());
    }

    let rows: Vec<[&str; 1]> = ids.iter().map(|id| [id.as_str()]).collect();
    let rows: Vec<&[&str]> = rows.iter().map(|row| row.as_slice()).collect();
    let csv_data = to_csv(&["Id"], &rows)?;

    let mut job = client.start_delete("Account").await?;
    run_ingest(&mut job, &csv_data).await?;
    Ok(())
}

/// Upload, close, poll, and report the three result partitions.
async fn run_ingest(job: &mut IngestJob, csv_data: &str) -> Result<ResultSet> {
    job.upload_data(csv_data).await?;
    job.close().await?;
    let finished = job.poll_status().await?;
    info!(
        job_id = %finished.id(),
        state = %finished.state(),
        processed = ?finished.number_records_processed(),
        failed = ?finished.number_records_failed(),
        "Ingest job finished"
    );

    let successful = job.get_successful_results().await?;
    let failed = job.get_failed_results().await?;
    let unprocessed = job.get_unprocessed_records().await?;
    info!(
        successful = successful.len(),
        failed = failed.len(),
        unprocessed = unprocessed.len(),
        "Result partitions"
    );
    for record in failed.records() {
        warn!(error = ?record.get("sf__Error"), "Failed record");
    }

    Ok(successful)
}

fn log_results(label: &str, results: &ResultSet) {
    info!(label = label, rows = results.len(), columns = ?results.columns(), "Results");
}

fn to_csv(header: &[&str], rows: &[&[&str]]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(*row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
