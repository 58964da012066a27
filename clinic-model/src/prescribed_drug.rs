//! Drugs prescribed to a patient.

use crate::{RecordPayload, Synceable};
use chrono::{DateTime, Utc};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct PrescribedDrug {
    pub uuid: RecordId,
    pub name: String,
    pub dosage: Option<String>,
    pub rx_norm_code: Option<String>,
    /// Stopped by the clinician. Kept separate from the soft delete.
    pub is_deleted: bool,
    pub is_protocol_drug: bool,
    pub patient_uuid: RecordId,
    pub facility_uuid: RecordId,
    pub frequency: Option<String>,
    pub duration_in_days: Option<u32>,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

impl PrescribedDrug {
    pub fn prescribe(
        name: impl Into<String>,
        dosage: Option<String>,
        patient_uuid: RecordId,
        facility_uuid: RecordId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: RecordId::new(),
            name: name.into(),
            dosage,
            rx_norm_code: None,
            is_deleted: false,
            is_protocol_drug: false,
            patient_uuid,
            facility_uuid,
            frequency: None,
            duration_in_days: None,
            timestamps: Timestamps::create(now),
            sync_status: SyncStatus::Pending,
        }
    }

    #[must_use]
    pub fn stop(self, now: DateTime<Utc>) -> Self {
        Self {
            is_deleted: true,
            ..self
        }
        .edited(now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedDrugPayload {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default, rename = "rxnorm_code")]
    pub rx_norm_code: Option<String>,
    pub is_deleted: bool,
    pub is_protocol_drug: bool,
    pub patient_id: RecordId,
    pub facility_id: RecordId,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub duration_in_days: Option<u32>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for PrescribedDrugPayload {
    fn uuid(&self) -> RecordId {
        self.uuid
    }
}

impl Synceable for PrescribedDrug {
    type Payload = PrescribedDrugPayload;

    const TABLE: &'static str = "prescribed_drugs";

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

    fn to_payload(&self) -> PrescribedDrugPayload {
        PrescribedDrugPayload {
            uuid: self.uuid,
            name: self.name.clone(),
            dosage: self.dosage.clone(),
            rx_norm_code: self.rx_norm_code.clone(),
            is_deleted: self.is_deleted,
            is_protocol_drug: self.is_protocol_drug,
            patient_id: self.patient_uuid,
            facility_id: self.facility_uuid,
            frequency: self.frequency.clone(),
            duration_in_days: self.duration_in_days,
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: PrescribedDrugPayload, sync_status: SyncStatus) -> Self {
        Self {
            uuid: payload.uuid,
            name: payload.name,
            dosage: payload.dosage,
            rx_norm_code: payload.rx_norm_code,
            is_deleted: payload.is_deleted,
            is_protocol_drug: payload.is_protocol_drug,
            patient_uuid: payload.patient_id,
            facility_uuid: payload.facility_id,
            frequency: payload.frequency,
            duration_in_days: payload.duration_in_days,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
