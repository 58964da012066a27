//! Blood sugar readings recorded for a patient.

use crate::{RecordPayload, Synceable};
use chrono::{DateTime, Utc};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodSugarType {
    Random,
    PostPrandial,
    Fasting,
    Hba1c,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BloodSugarMeasurement {
    pub uuid: RecordId,
    pub blood_sugar_type: BloodSugarType,
    pub value: f32,
    pub patient_uuid: RecordId,
    pub facility_uuid: RecordId,
    pub user_uuid: RecordId,
    pub recorded_at: DateTime<Utc>,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

impl BloodSugarMeasurement {
    pub fn record(
        blood_sugar_type: BloodSugarType,
        value: f32,
        patient_uuid: RecordId,
        facility_uuid: RecordId,
        user_uuid: RecordId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: RecordId::new(),
            blood_sugar_type,
            value,
            patient_uuid,
            facility_uuid,
            user_uuid,
            recorded_at: now,
            timestamps: Timestamps::create(now),
            sync_status: SyncStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodSugarPayload {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub blood_sugar_type: BloodSugarType,
    pub blood_sugar_value: f32,
    pub patient_id: RecordId,
    pub facility_id: RecordId,
    pub user_id: RecordId,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for BloodSugarPayload {
    fn uuid(&self) -> RecordId {
        self.uuid
    }
}

impl Synceable for BloodSugarMeasurement {
    type Payload = BloodSugarPayload;

    const TABLE: &'static str = "blood_sugar_measurements";

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

    fn patient_uuid(&self) -> Option<RecordId> {
        Some(self.patient_uuid)
    }

    fn to_payload(&self) -> BloodSugarPayload {
        BloodSugarPayload {
            uuid: self.uuid,
            blood_sugar_type: self.blood_sugar_type,
            blood_sugar_value: self.value,
            patient_id: self.patient_uuid,
            facility_id: self.facility_uuid,
            user_id: self.user_uuid,
            recorded_at: self.recorded_at,
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: BloodSugarPayload, sync_status: SyncStatus) -> Self {
        Self {
            uuid: payload.uuid,
            blood_sugar_type: payload.blood_sugar_type,
            value: payload.blood_sugar_value,
            patient_uuid: payload.patient_id,
            facility_uuid: payload.facility_id,
            user_uuid: payload.user_id,
            recorded_at: payload.recorded_at,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
