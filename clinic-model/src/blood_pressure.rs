//! Blood pressure measurements recorded for a patient.

use crate::{RecordPayload, Synceable};
use chrono::{DateTime, Utc};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    pub systolic: i32,
    pub diastolic: i32,
}

impl BloodPressureReading {
    #[must_use]
    pub const fn new(systolic: i32, diastolic: i32) -> Self {
        Self {
            systolic,
            diastolic,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BloodPressureMeasurement {
    pub uuid: RecordId,
    pub reading: BloodPressureReading,
    pub patient_uuid: RecordId,
    pub facility_uuid: RecordId,
    pub user_uuid: RecordId,
    pub recorded_at: DateTime<Utc>,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

impl BloodPressureMeasurement {
    /// A new measurement taken at `now`, waiting to be pushed.
    pub fn record(
        reading: BloodPressureReading,
        patient_uuid: RecordId,
        facility_uuid: RecordId,
        user_uuid: RecordId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: RecordId::new(),
            reading,
            patient_uuid,
            facility_uuid,
            user_uuid,
            recorded_at: now,
            timestamps: Timestamps::create(now),
            sync_status: SyncStatus::Pending,
        }
    }

    /// Corrects the reading.
    #[must_use]
    pub fn with_reading(self, reading: BloodPressureReading, now: DateTime<Utc>) -> Self {
        Self { reading, ..self }.edited(now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressurePayload {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub systolic: i32,
    pub diastolic: i32,
    pub patient_id: RecordId,
    pub facility_id: RecordId,
    pub user_id: RecordId,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for BloodPressurePayload {
    fn uuid(&self) -> RecordId {
        self.uuid
    }
}

impl Synceable for BloodPressureMeasurement {
    type Payload = BloodPressurePayload;

    const TABLE: &'static str = "blood_pressure_measurements";

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

    fn to_payload(&self) -> BloodPressurePayload {
        BloodPressurePayload {
            uuid: self.uuid,
            systolic: self.reading.systolic,
            diastolic: self.reading.diastolic,
            patient_id: self.patient_uuid,
            facility_id: self.facility_uuid,
            user_id: self.user_uuid,
            recorded_at: self.recorded_at,
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: BloodPressurePayload, sync_status: SyncStatus) -> Self {
        Self {
            uuid: payload.uuid,
            reading: BloodPressureReading::new(payload.systolic, payload.diastolic),
            patient_uuid: payload.patient_id,
            facility_uuid: payload.facility_id,
            user_uuid: payload.user_id,
            recorded_at: payload.recorded_at,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
