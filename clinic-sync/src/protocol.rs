//! JSON envelopes exchanged with the sync endpoints.
//!
//! Every resource uses the same shapes, keyed by the resource name:
//!
//! ```text
//! POST  { "blood_pressures": [ ... ] }
//!   ->  { "errors": [ { "id": "...", "schema": [ ... ] } ] }
//! GET   ?limit=N&processed_since=T
//!   ->  { "blood_pressures": [ ... ], "process_token": "..." }
//! ```

use crate::error::{SyncError, SyncResult};
use clinic_types::RecordId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Body of a push request.
pub struct DataPushRequest<'a, P> {
    pub resource: &'a str,
    pub payloads: &'a [P],
}

impl<P: Serialize> Serialize for DataPushRequest<'_, P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.resource, self.payloads)?;
        map.end()
    }
}

/// Server-side validation failures for one pushed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    #[serde(default)]
    pub schema: Vec<String>,
    /// Per-field messages, e.g. `"systolic": ["must be less than 360"]`.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Response to a push. Records not listed here were accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPushResponse {
    #[serde(rename = "errors", default)]
    pub validation_errors: Vec<ValidationErrors>,
}

impl DataPushResponse {
    pub fn accepted() -> Self {
        Self::default()
    }

    pub fn with_errors(validation_errors: Vec<ValidationErrors>) -> Self {
        Self { validation_errors }
    }

    pub fn invalid_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.validation_errors.iter().map(|e| e.uuid)
    }
}

/// One page of a pull.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPullResponse<P> {
    pub payloads: Vec<P>,
    /// Opaque continuation token to send with the next pull.
    pub process_token: String,
}

#[derive(Deserialize)]
struct RawPullResponse {
    process_token: String,
    #[serde(flatten)]
    resources: Map<String, Value>,
}

impl<P: serde::de::DeserializeOwned> DataPullResponse<P> {
    /// Decodes a pull response body for `resource`.
    pub fn from_json(resource: &str, body: &str) -> SyncResult<Self> {
        let mut raw: RawPullResponse = serde_json::from_str(body)?;
        let records = raw.resources.remove(resource).ok_or_else(|| {
            SyncError::Protocol(format!("pull response has no \"{resource}\" field"))
        })?;
        Ok(Self {
            payloads: serde_json::from_value(records)?,
            process_token: raw.process_token,
        })
    }
}

/// Builds the JSON of a pull page. Used by test servers.
pub fn pull_response_json<P: Serialize>(
    resource: &str,
    payloads: &[P],
    process_token: &str,
) -> SyncResult<Value> {
    let mut body = Map::new();
    body.insert(resource.to_string(), serde_json::to_value(payloads)?);
    body.insert(
        "process_token".to_string(),
        Value::String(process_token.to_string()),
    );
    Ok(Value::Object(body))
}
