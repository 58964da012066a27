//! Answers to a facility-level questionnaire (monthly screening and supplies
//! reports).

use crate::{RecordPayload, Synceable};
use chrono::{DateTime, Utc};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionnaireResponse {
    pub uuid: RecordId,
    pub questionnaire_id: RecordId,
    pub questionnaire_type: String,
    pub facility_id: RecordId,
    pub last_updated_by_user_id: Option<RecordId>,
    /// Answers keyed by `<questionnaire_type>.<link_id>`.
    pub content: Map<String, Value>,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

impl QuestionnaireResponse {
    /// Replaces the answers, recording who changed them.
    #[must_use]
    pub fn with_content(
        self,
        content: Map<String, Value>,
        user_id: RecordId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            content,
            last_updated_by_user_id: Some(user_id),
            ..self
        }
        .edited(now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireResponsePayload {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub questionnaire_id: RecordId,
    pub questionnaire_type: String,
    pub facility_id: RecordId,
    #[serde(default)]
    pub last_updated_by_user_id: Option<RecordId>,
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for QuestionnaireResponsePayload {
    fn uuid(&self) -> RecordId {
        self.uuid
    }
}

impl Synceable for QuestionnaireResponse {
    type Payload = QuestionnaireResponsePayload;

    const TABLE: &'static str = "questionnaire_responses";

    fn uuid(&self) -> RecordId {
        self.uuid
    }

    fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    fn with_sync_status(self, sync_status: SyncStatus) -> Self {
        Self {
            sync_status,
            ..self
        }
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn with_timestamps(self, timestamps: Timestamps) -> Self {
        Self { timestamps, ..self }
    }

    fn to_payload(&self) -> QuestionnaireResponsePayload {
        QuestionnaireResponsePayload {
            uuid: self.uuid,
            questionnaire_id: self.questionnaire_id,
            questionnaire_type: self.questionnaire_type.clone(),
            facility_id: self.facility_id,
            last_updated_by_user_id: self.last_updated_by_user_id,
            content: self.content.clone(),
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: QuestionnaireResponsePayload, sync_status: SyncStatus) -> Self {
        Self {
            uuid: payload.uuid,
            questionnaire_id: payload.questionnaire_id,
            questionnaire_type: payload.questionnaire_type,
            facility_id: payload.facility_id,
            last_updated_by_user_id: payload.last_updated_by_user_id,
            content: payload.content,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
