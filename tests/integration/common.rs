use std::time::Duration;

use sfjobs::{BulkApiClient, ConnectionSettings, SoapLogin};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JOBS: &str = "/services/data/v64.0/jobs";
pub const SESSION_ID: &str = "00Dxx0000001gEF!AQ4AQIntegrationSession";

pub const SETTINGS_JSON: &str = r#"{
    "username": "integration@example.com",
    "password": "pw",
    "security_token": "tok"
}"#;

/// Mount a successful SOAP login whose server URL points back at `server`.
pub async fn mount_login(server: &MockServer) {
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com">
  <soapenv:Body>
    <loginResponse>
      <result>
        <serverUrl>{}/services/Soap/u/64.0/00Dxx0000001gEF</serverUrl>
        <sessionId>{}</sessionId>
      </result>
    </loginResponse>
  </soapenv:Body>
</soapenv:Envelope>"#,
        server.uri(),
        SESSION_ID
    );

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/64.0"))
        .and(header("SOAPAction", "login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Log in against `server` and return a client with a short poll interval.
pub async fn connect(server: &MockServer) -> BulkApiClient {
    let settings = ConnectionSettings::from_json(SETTINGS_JSON).expect("valid settings");
    let login = SoapLogin::new()
        .expect("login client")
        .with_login_url(server.uri());

    sfjobs::connect_with(&settings, &login)
        .await
        .expect("mock login should succeed")
        .with_poll_interval(Duration::from_millis(20))
}

/// Connect to a real org when `SFJOBS_SECRETS` names a settings file.
pub async fn require_client() -> Option<BulkApiClient> {
    let path = std::env::var("SFJOBS_SECRETS").ok()?;
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read SFJOBS_SECRETS file {path}: {e}"));

    let client = sfjobs::connect_from_json(&json)
        .await
        .unwrap_or_else(|e| panic!("login with {path} failed: {e}"));
    Some(client)
}
