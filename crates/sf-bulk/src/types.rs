//! Types for Bulk API 2.0 jobs.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Bulk API 2.0 job states.
///
/// States the service may add later are kept as [`JobState::Other`] instead of
/// failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum JobState {
    /// Job is open and accepting data
    Open,
    /// Upload is complete, job is ready for processing
    UploadComplete,
    /// Job is processing
    InProgress,
    /// Job was aborted
    Aborted,
    /// Job completed successfully
    JobComplete,
    /// Job failed
    Failed,
    /// A state this client does not know about
    Other(String),
}

impl JobState {
    /// Map a remote state name, keeping unknown names verbatim.
    pub fn from_api_name(name: &str) -> Self {
        match name {
            "Open" => JobState::Open,
            "UploadComplete" => JobState::UploadComplete,
            "InProgress" => JobState::InProgress,
            "Aborted" => JobState::Aborted,
            "JobComplete" => JobState::JobComplete,
            "Failed" => JobState::Failed,
            other => JobState::Other(other.to_string()),
        }
    }

    /// The state name as sent by the service.
    pub fn as_str(&self) -> &str {
        match self {
            JobState::Open => "Open",
            JobState::UploadComplete => "UploadComplete",
            JobState::InProgress => "InProgress",
            JobState::Aborted => "Aborted",
            JobState::JobComplete => "JobComplete",
            JobState::Failed => "Failed",
            JobState::Other(name) => name,
        }
    }

    /// Check if job is in a terminal state.
    ///
    /// Only `Aborted`, `JobComplete` and `Failed` are terminal; unknown states
    /// keep a poll loop going.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Aborted | JobState::JobComplete | JobState::Failed
        )
    }

    /// Check if job completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobState::JobComplete)
    }
}

impl From<String> for JobState {
    fn from(name: String) -> Self {
        match JobState::from_api_name(&name) {
            JobState::Other(_) => JobState::Other(name),
            known => known,
        }
    }
}

impl Serialize for JobState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bulk API 2.0 operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BulkOperation {
    /// Insert new records
    Insert,
    /// Update existing records
    Update,
    /// Upsert based on external ID
    Upsert,
    /// Delete records (soft delete)
    Delete,
    /// Hard delete records (permanent)
    HardDelete,
    /// Query records
    Query,
    /// Query all records including deleted
    QueryAll,
}

impl BulkOperation {
    /// Get the API string for this operation.
    pub fn api_name(&self) -> &'static str {
        match self {
            BulkOperation::Insert => "insert",
            BulkOperation::Update => "update",
            BulkOperation::Upsert => "upsert",
            BulkOperation::Delete => "delete",
            BulkOperation::HardDelete => "hardDelete",
            BulkOperation::Query => "query",
            BulkOperation::QueryAll => "queryAll",
        }
    }

    /// Parse an API operation name.
    pub fn from_api_name(name: &str) -> Option<Self> {
        match name {
            "insert" => Some(BulkOperation::Insert),
            "update" => Some(BulkOperation::Update),
            "upsert" => Some(BulkOperation::Upsert),
            "delete" => Some(BulkOperation::Delete),
            "hardDelete" => Some(BulkOperation::HardDelete),
            "query" => Some(BulkOperation::Query),
            "queryAll" => Some(BulkOperation::QueryAll),
            _ => None,
        }
    }

    /// Check if this is a query operation.
    pub fn is_query(&self) -> bool {
        matches!(self, BulkOperation::Query | BulkOperation::QueryAll)
    }

    /// Check if this is an ingest operation.
    pub fn is_ingest(&self) -> bool {
        !self.is_query()
    }
}

impl std::fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_name())
    }
}

// =============================================================================
// Job Descriptor
// =============================================================================

/// A job as last reported by the service.
///
/// `id` and `state` are lifted out of the response; every field the service
/// returned (including those two) stays available through [`raw`](Self::raw).
/// A descriptor is never updated in place: each status call yields a new one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct JobDescriptor {
    id: String,
    state: JobState,
    raw: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for JobDescriptor {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match raw.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err("job response has no string \"id\"".to_string()),
        };
        let state = match raw.get("state") {
            Some(Value::String(state)) => JobState::from_api_name(state),
            _ => return Err("job response has no string \"state\"".to_string()),
        };
        Ok(Self { id, state, raw })
    }
}

impl Serialize for JobDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl JobDescriptor {
    /// Job id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Job state at the time of the call that produced this descriptor.
    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Every field of the job response.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Look up one response field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    /// SObject API name (ingest jobs).
    pub fn object(&self) -> Option<&str> {
        self.get_str("object")
    }

    /// Operation the job was created with.
    pub fn operation(&self) -> Option<BulkOperation> {
        self.get_str("operation").and_then(BulkOperation::from_api_name)
    }

    /// SOQL text (query jobs).
    pub fn query(&self) -> Option<&str> {
        self.get_str("query")
    }

    pub fn number_records_processed(&self) -> Option<u64> {
        self.raw.get("numberRecordsProcessed").and_then(Value::as_u64)
    }

    pub fn number_records_failed(&self) -> Option<u64> {
        self.raw.get("numberRecordsFailed").and_then(Value::as_u64)
    }

    /// Error message reported for a failed job.
    pub fn error_message(&self) -> Option<&str> {
        self.get_str("errorMessage").filter(|message| !message.is_empty())
    }

    /// API version, which the service sends as a number (`64.0`) or a string.
    pub fn api_version(&self) -> Option<String> {
        match self.raw.get("apiVersion")? {
            Value::Number(n) => n.as_f64().map(|v| format!("{:.1}", v)),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Creation timestamp (`2024-05-01T10:00:00.000+0000`).
    pub fn created_date(&self) -> Option<DateTime<FixedOffset>> {
        self.get_str("createdDate")
            .and_then(|s| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z").ok())
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Request to create a query job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueryJobRequest {
    /// Operation type (query or queryAll)
    pub operation: String,
    /// SOQL query
    pub query: String,
}

impl CreateQueryJobRequest {
    /// Create a new query job request.
    pub fn new(soql: impl Into<String>) -> Self {
        Self {
            operation: BulkOperation::Query.api_name().to_string(),
            query: soql.into(),
        }
    }

    /// Use queryAll instead of query (includes deleted records).
    pub fn with_query_all(mut self) -> Self {
        self.operation = BulkOperation::QueryAll.api_name().to_string();
        self
    }
}

/// Request to create an ingest job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngestJobRequest {
    /// SObject API name
    pub object: String,
    /// Operation type
    pub operation: String,
    /// External ID field for upsert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id_field_name: Option<String>,
}

impl CreateIngestJobRequest {
    /// Create a new ingest job request.
    pub fn new(sobject: impl Into<String>, operation: BulkOperation) -> Self {
        Self {
            object: sobject.into(),
            operation: operation.api_name().to_string(),
            external_id_field_name: None,
        }
    }

    /// Set the external ID field for upsert operations.
    pub fn with_external_id_field(mut self, field: impl Into<String>) -> Self {
        self.external_id_field_name = Some(field.into());
        self
    }
}

/// Request to change a job's state.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateJobStateRequest {
    pub state: String,
}

impl UpdateJobStateRequest {
    /// Signal that all data has been uploaded.
    pub fn upload_complete() -> Self {
        Self {
            state: JobState::UploadComplete.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_job_state_terminal() {
        assert!(!JobState::Open.is_terminal());
        assert!(!JobState::UploadComplete.is_terminal());
        assert!(!JobState::InProgress.is_terminal());
        assert!(JobState::JobComplete.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Aborted.is_terminal());
        assert!(!JobState::Other("Queued".into()).is_terminal());
    }

    #[test]
    fn test_job_state_unknown_name_is_kept() {
        let state: JobState = serde_json::from_str("\"Queued\"").unwrap();
        assert_eq!(state, JobState::Other("Queued".to_string()));
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"Queued\"");

        let state: JobState = serde_json::from_str("\"JobComplete\"").unwrap();
        assert_eq!(state, JobState::JobComplete);
        assert!(state.is_success());
    }

    #[test]
    fn test_bulk_operation_types() {
        assert!(BulkOperation::Query.is_query());
        assert!(BulkOperation::QueryAll.is_query());
        assert!(BulkOperation::Insert.is_ingest());
        assert!(BulkOperation::Delete.is_ingest());
        assert_eq!(
            serde_json::to_string(&BulkOperation::HardDelete).unwrap(),
            "\"hardDelete\""
        );
        assert_eq!(
            BulkOperation::from_api_name("queryAll"),
            Some(BulkOperation::QueryAll)
        );
        assert_eq!(BulkOperation::from_api_name("merge"), None);
    }

    #[test]
    fn test_descriptor_from_ingest_response() {
        let descriptor: JobDescriptor = serde_json::from_value(serde_json::json!({
            "id": "750xx000000001AAA",
            "operation": "insert",
            "object": "Account",
            "createdById": "005xx000001X8UzAAK",
            "createdDate": "2024-05-01T10:15:30.000+0000",
            "state": "JobComplete",
            "apiVersion": 64.0,
            "numberRecordsProcessed": 1,
            "numberRecordsFailed": 0,
            "errorMessage": ""
        }))
        .unwrap();

        assert_eq!(descriptor.id(), "750xx000000001AAA");
        assert_eq!(descriptor.state(), &JobState::JobComplete);
        assert_eq!(descriptor.object(), Some("Account"));
        assert_eq!(descriptor.operation(), Some(BulkOperation::Insert));
        assert_eq!(descriptor.number_records_processed(), Some(1));
        assert_eq!(descriptor.number_records_failed(), Some(0));
        assert_eq!(descriptor.error_message(), None);
        assert_eq!(descriptor.api_version().as_deref(), Some("64.0"));
        assert_eq!(descriptor.get("createdById").unwrap(), "005xx000001X8UzAAK");

        let created = descriptor.created_date().unwrap();
        assert_eq!(created.year(), 2024);
        assert_eq!(created.hour(), 10);
    }

    #[test]
    fn test_descriptor_serializes_all_fields() {
        let json = serde_json::json!({"id": "750xx", "state": "Open", "object": "Contact"});
        let descriptor: JobDescriptor = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&descriptor).unwrap(), json);
    }

    #[test]
    fn test_descriptor_requires_id_and_state() {
        assert!(serde_json::from_value::<JobDescriptor>(serde_json::json!({"state": "Open"}))
            .is_err());
        assert!(serde_json::from_value::<JobDescriptor>(serde_json::json!({"id": "750xx"}))
            .is_err());
        assert!(serde_json::from_value::<JobDescriptor>(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_create_ingest_job_request_body() {
        let request = CreateIngestJobRequest::new("Account", BulkOperation::Insert);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"object": "Account", "operation": "insert"})
        );

        let request = CreateIngestJobRequest::new("Account", BulkOperation::Upsert)
            .with_external_id_field("External_Id__c");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "object": "Account",
                "operation": "upsert",
                "externalIdFieldName": "External_Id__c"
            })
        );
    }

    #[test]
    fn test_create_query_job_request_body() {
        let request = CreateQueryJobRequest::new("SELECT Id FROM Account").with_query_all();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"operation": "queryAll", "query": "SELECT Id FROM Account"})
        );
    }

    #[test]
    fn test_upload_complete_body() {
        assert_eq!(
            serde_json::to_value(UpdateJobStateRequest::upload_complete()).unwrap(),
            serde_json::json!({"state": "UploadComplete"})
        );
    }
}
