//! Tests against a real org (skipped unless `SFJOBS_SECRETS` is set).

use sfjobs::JobState;

use super::common::require_client;

#[tokio::test]
async fn test_live_query_contacts() {
    let Some(client) = require_client().await else { return; };

    let mut job = client
        .start_query("SELECT Id FROM Contact LIMIT 10")
        .await
        .expect("query job should be created");
    job.poll_status().await.expect("poll should succeed");
    assert_eq!(job.state(), &JobState::JobComplete);

    let rows = job.get_results().await.expect("results should download");
    assert!(rows.len() <= 10);
    if !rows.is_empty() {
        assert_eq!(rows.columns(), ["Id"]);
    }
}

#[tokio::test]
async fn test_live_insert_then_delete_account() {
    let Some(client) = require_client().await else { return; };

    let name = format!("SfjobsIntTest {}", unique_suffix());
    let mut insert = client
        .start_insert("Account")
        .await
        .expect("insert job should be created");
    insert
        .upload_data(&format!("Name\n{name}\n"))
        .await
        .expect("upload should succeed");
    insert.close().await.expect("close should succeed");
    insert.poll_status().await.expect("poll should succeed");
    assert_eq!(insert.state(), &JobState::JobComplete);

    let created = insert
        .get_successful_results()
        .await
        .expect("successful results should download");
    assert_eq!(created.len(), 1);
    assert_eq!(created.get(0, "Name"), Some(name.as_str()));
    let id = created.get(0, "sf__Id").expect("created id").to_string();

    let mut delete = client
        .start_delete("Account")
        .await
        .expect("delete job should be created");
    delete
        .upload_data(&format!("Id\n{id}\n"))
        .await
        .expect("upload should succeed");
    delete.close().await.expect("close should succeed");
    delete.poll_status().await.expect("poll should succeed");

    let failed = delete.get_failed_results().await.expect("failed results");
    assert!(failed.is_empty(), "delete failures: {failed:?}");
}

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
