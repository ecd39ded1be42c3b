//! End-to-end scenarios against a mock server.

use sfjobs::bulk::ErrorKind;
use sfjobs::{BulkOperation, ConnectionSettings, JobState, SoapLogin};
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{connect, mount_login, JOBS, SESSION_ID};

fn bearer() -> String {
    format!("Bearer {SESSION_ID}")
}

#[tokio::test]
async fn test_insert_account_end_to_end() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{JOBS}/ingest")))
        .and(header("Authorization", bearer().as_str()))
        .and(body_json(serde_json::json!({"object": "Account", "operation": "insert"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "750xx000000E2E1",
            "object": "Account",
            "operation": "insert",
            "state": "Open"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("{JOBS}/ingest/750xx000000E2E1/batches")))
        .and(header("Content-Type", "text/csv"))
        .and(body_string("Name\nAcme\n"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{JOBS}/ingest/750xx000000E2E1")))
        .and(body_json(serde_json::json!({"state": "UploadComplete"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "750xx000000E2E1",
            "state": "UploadComplete"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/ingest/750xx000000E2E1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "750xx000000E2E1",
            "object": "Account",
            "operation": "insert",
            "state": "InProgress"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/ingest/750xx000000E2E1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "750xx000000E2E1",
            "object": "Account",
            "operation": "insert",
            "state": "JobComplete",
            "numberRecordsProcessed": 1,
            "numberRecordsFailed": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/ingest/750xx000000E2E1/successfulResults")))
        .and(header("Accept", "text/csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("\"sf__Id\",\"sf__Created\",Name\n\"001xx000003DGb2AAG\",\"true\",\"Acme\"\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    assert_eq!(
        client.bulk_base_url(),
        format!("{}{}", server.uri(), JOBS)
    );

    let mut job = client.start_insert("Account").await.unwrap();
    assert_eq!(job.id(), "750xx000000E2E1");

    job.upload_data("Name\nAcme\n").await.unwrap();
    job.close().await.unwrap();

    let finished = job.poll_status().await.unwrap();
    assert_eq!(finished.state(), &JobState::JobComplete);
    assert_eq!(finished.number_records_processed(), Some(1));

    let successful = job.get_successful_results().await.unwrap();
    assert_eq!(successful.len(), 1);
    assert_eq!(successful.get(0, "Name"), Some("Acme"));
    assert_eq!(successful.get(0, "sf__Created"), Some("true"));

    // Shared headers are untouched by the CSV upload.
    assert_eq!(
        client.inner().headers().content_type(),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_raw_query_flow() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{JOBS}/query")))
        .and(body_json(serde_json::json!({
            "operation": "query",
            "query": "SELECT Id, Name FROM Account"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "750xxQRY",
            "operation": "query",
            "state": "UploadComplete"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/query/750xxQRY")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "750xxQRY",
            "operation": "query",
            "state": "JobComplete",
            "numberRecordsProcessed": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/query/750xxQRY/results")))
        .respond_with(ResponseTemplate::new(200).set_body_string("Id,Name\n001,A\n002,B\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;

    let created = client
        .create_query_job("SELECT Id, Name FROM Account", false)
        .await
        .unwrap();
    let finished = client.poll_query_job(created.id()).await.unwrap();
    assert!(finished.state().is_success());

    let rows = client.get_query_job_results(created.id()).await.unwrap();
    assert_eq!(rows.columns(), ["Id", "Name"]);
    assert_eq!(rows.rows(), [vec!["001", "A"], vec!["002", "B"]]);
}

#[tokio::test]
async fn test_upsert_without_field_never_reaches_server() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{JOBS}/ingest")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client
        .start_ingest("Account", BulkOperation::Upsert, None)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_malformed_settings_fail_before_login() {
    let err = sfjobs::connect_from_json("{\"username\": \"u\"")
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Configuration(_)), "got {err:?}");
}

#[tokio::test]
async fn test_login_fault_is_remote_request_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/64.0"))
        .respond_with(ResponseTemplate::new(500).set_body_string(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body><soapenv:Fault><faultcode>sf:INVALID_LOGIN</faultcode><faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring></soapenv:Fault></soapenv:Body></soapenv:Envelope>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ConnectionSettings::new("integration@example.com", "wrong", "");
    let login = SoapLogin::new().unwrap().with_login_url(server.uri());
    let err = sfjobs::connect_with(&settings, &login).await.unwrap_err();

    assert!(err.is_remote_request(), "got {err:?}");
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("INVALID_LOGIN"));
}
