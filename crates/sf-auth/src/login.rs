//! Username/password session login via the SOAP partner `login` call.
//!
//! The login endpoint answers with a session id and a server URL; the
//! instance URL used for Bulk API calls is the scheme and host of that
//! server URL, with the `-api` host suffix removed.

use tracing::{debug, info, instrument};

use sfjobs_client::security::xml;
use sfjobs_client::{ErrorKind as ClientErrorKind, HeaderSet, SfHttpClient};

use crate::credentials::SalesforceCredentials;
use crate::error::{Error, ErrorKind, Result};
use crate::settings::ConnectionSettings;

/// Performs the SOAP login call for a set of [`ConnectionSettings`].
#[derive(Debug, Clone)]
pub struct SoapLogin {
    http: SfHttpClient,
    login_url: Option<String>,
}

impl SoapLogin {
    /// Create a login client with the default HTTP configuration.
    pub fn new() -> Result<Self> {
        Ok(Self::with_http_client(SfHttpClient::default_client()?))
    }

    /// Create a login client on top of an existing HTTP client.
    pub fn with_http_client(http: SfHttpClient) -> Self {
        Self {
            http,
            login_url: None,
        }
    }

    /// Send the login call to `login_url` instead of the host derived from
    /// the settings' domain.
    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = Some(login_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Log in and return session credentials.
    #[instrument(skip(self, settings), fields(username = %settings.username(), domain = %settings.domain()))]
    pub async fn login(&self, settings: &ConnectionSettings) -> Result<SalesforceCredentials> {
        settings.validate()?;

        let host = self
            .login_url
            .clone()
            .unwrap_or_else(|| settings.login_url());
        let url = format!("{}/services/Soap/u/{}", host, settings.api_version());

        let headers = HeaderSet::default().with_header("SOAPAction", "login")?;
        let request = self
            .http
            .post(url, &headers)
            .xml(login_envelope(settings));

        debug!("Sending SOAP login request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(err) => return Err(login_error(err)),
        };
        let body = response.text().await?;

        let session_id = extract_element(&body, "sessionId").ok_or_else(|| {
            Error::new(ErrorKind::InvalidResponse(
                "login response has no sessionId".to_string(),
            ))
        })?;
        let server_url = extract_element(&body, "serverUrl").ok_or_else(|| {
            Error::new(ErrorKind::InvalidResponse(
                "login response has no serverUrl".to_string(),
            ))
        })?;

        let instance_url = instance_url_from_server_url(&server_url)?;
        info!(instance_url = %instance_url, "Logged in");

        Ok(SalesforceCredentials::new(
            instance_url,
            session_id,
            settings.api_version(),
        ))
    }
}

fn login_envelope(settings: &ConnectionSettings) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:urn="urn:partner.soap.sforce.com">
  <env:Header>
    <urn:CallOptions>
      <urn:client>{client}</urn:client>
    </urn:CallOptions>
  </env:Header>
  <env:Body>
    <n1:login xmlns:n1="urn:partner.soap.sforce.com">
      <n1:username>{username}</n1:username>
      <n1:password>{password}</n1:password>
    </n1:login>
  </env:Body>
</env:Envelope>"#,
        client = xml::escape(sfjobs_client::USER_AGENT),
        username = xml::escape(settings.username()),
        password = xml::escape(&settings.password_with_token()),
    )
}

/// Map a failed login request, turning a SOAP fault into [`ErrorKind::Login`].
fn login_error(err: sfjobs_client::Error) -> Error {
    if let ClientErrorKind::Http { ref body, .. } = err.kind {
        if let Some(code) = extract_element(body, "faultcode") {
            let message = extract_element(body, "faultstring")
                .unwrap_or_else(|| "Unknown error".to_string());
            let code = code.rsplit(':').next().unwrap_or(&code).to_string();
            return Error::with_source(ErrorKind::Login { code, message }, err);
        }
    }
    err.into()
}

/// Extract the text of the first `<tag>` or `<prefix:tag>` element.
fn extract_element(xml: &str, tag: &str) -> Option<String> {
    let plain = format!("<{}>", tag);
    let prefixed = format!(":{}>", tag);

    let content_start = match xml.find(&plain) {
        Some(idx) => idx + plain.len(),
        None => {
            let idx = xml.find(&prefixed)?;
            // The match must be an opening tag (`<sf:tag>`), not `</sf:tag>`.
            let open = xml[..idx].rfind('<')?;
            if xml[open..].starts_with("</") {
                return None;
            }
            idx + prefixed.len()
        }
    };

    let rest = &xml[content_start..];
    let end = rest.find("</")?;
    Some(rest[..end].trim().to_string())
}

/// `https://na1-api.salesforce.com/services/Soap/u/64.0/00D...` -> `https://na1.salesforce.com`
fn instance_url_from_server_url(server_url: &str) -> Result<String> {
    let parsed = url::Url::parse(server_url).map_err(|e| {
        Error::with_source(
            ErrorKind::InvalidResponse(format!("invalid serverUrl: {}", e)),
            e,
        )
    })?;

    let host = parsed.host_str().ok_or_else(|| {
        Error::new(ErrorKind::InvalidResponse(
            "serverUrl has no host".to_string(),
        ))
    })?;
    let host = match host.split_once('.') {
        Some((first, rest)) => match first.strip_suffix("-api") {
            Some(stripped) => format!("{}.{}", stripped, rest),
            None => host.to_string(),
        },
        None => host.to_string(),
    };

    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn login_response(server_url: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com">
  <soapenv:Body>
    <loginResponse>
      <result>
        <metadataServerUrl>{server_url}</metadataServerUrl>
        <passwordExpired>false</passwordExpired>
        <sandbox>false</sandbox>
        <serverUrl>{server_url}</serverUrl>
        <sessionId>00Dxx0000001gEF!AQ4AQFakeSession</sessionId>
        <userId>005xx000001Sv6AAAS</userId>
      </result>
    </loginResponse>
  </soapenv:Body>
</soapenv:Envelope>"#
        )
    }

    const FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:sf="urn:fault.partner.soap.sforce.com">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>sf:INVALID_LOGIN</faultcode>
      <faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;

    #[test]
    fn test_instance_url_strips_api_suffix() {
        assert_eq!(
            instance_url_from_server_url(
                "https://na1-api.salesforce.com/services/Soap/u/64.0/00Dxx0000001gEF"
            )
            .unwrap(),
            "https://na1.salesforce.com"
        );
        assert_eq!(
            instance_url_from_server_url(
                "https://acme.my.salesforce.com/services/Soap/u/64.0/00Dxx0000001gEF"
            )
            .unwrap(),
            "https://acme.my.salesforce.com"
        );
        assert_eq!(
            instance_url_from_server_url("http://127.0.0.1:8080/services/Soap/u/64.0/00D")
                .unwrap(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_instance_url_rejects_garbage() {
        let err = instance_url_from_server_url("not a url").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidResponse(_)));
    }

    #[test]
    fn test_extract_element() {
        let xml = "<a><sf:code>X</sf:code><plain> y </plain></a>";
        assert_eq!(extract_element(xml, "code").as_deref(), Some("X"));
        assert_eq!(extract_element(xml, "plain").as_deref(), Some("y"));
        assert_eq!(extract_element(xml, "missing"), None);
    }

    #[test]
    fn test_envelope_escapes_credentials() {
        let settings = ConnectionSettings::new("a&b@example.com", "p<w>", "t'k");
        let envelope = login_envelope(&settings);
        assert!(envelope.contains("<n1:username>a&amp;b@example.com</n1:username>"));
        assert!(envelope.contains("<n1:password>p&lt;w&gt;t&apos;k</n1:password>"));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/Soap/u/64.0"))
            .and(header("SOAPAction", "login"))
            .and(header("Content-Type", "text/xml; charset=UTF-8"))
            .and(body_string_contains("<n1:password>pwtok</n1:password>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(login_response(
                "https://na1-api.salesforce.com/services/Soap/u/64.0/00Dxx0000001gEF",
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let settings = ConnectionSettings::new("user@example.com", "pw", "tok");
        let creds = SoapLogin::new()
            .unwrap()
            .with_login_url(mock_server.uri())
            .login(&settings)
            .await
            .unwrap();

        assert_eq!(creds.instance_url(), "https://na1.salesforce.com");
        assert_eq!(creds.session_id(), "00Dxx0000001gEF!AQ4AQFakeSession");
        assert_eq!(creds.api_version(), "64.0");
    }

    #[tokio::test]
    async fn test_login_fault_maps_to_login_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/services/Soap/u/64.0"))
            .respond_with(ResponseTemplate::new(500).set_body_string(FAULT))
            .mount(&mock_server)
            .await;

        let settings = ConnectionSettings::new("user@example.com", "wrong", "");
        let err = SoapLogin::new()
            .unwrap()
            .with_login_url(mock_server.uri())
            .login(&settings)
            .await
            .unwrap_err();

        match err.kind {
            ErrorKind::Login { code, message } => {
                assert_eq!(code, "INVALID_LOGIN");
                assert!(message.contains("Invalid username"));
            }
            other => panic!("expected login error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_missing_session_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<ok/>"))
            .mount(&mock_server)
            .await;

        let settings = ConnectionSettings::new("user@example.com", "pw", "tok");
        let err = SoapLogin::new()
            .unwrap()
            .with_login_url(mock_server.uri())
            .login(&settings)
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_invalid_settings_fail_before_network() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let settings = ConnectionSettings::new("", "pw", "tok");
        let err = SoapLogin::new()
            .unwrap()
            .with_login_url(mock_server.uri())
            .login(&settings)
            .await
            .unwrap_err();

        assert!(err.is_config_error());
    }
}
