//! Scheduled follow-up visits of a patient.

use crate::{RecordPayload, Synceable};
use chrono::{DateTime, NaiveDate, Utc};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Visited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Manual,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    PatientNotResponding,
    InvalidPhoneNumber,
    #[serde(rename = "public_hospital_transfer")]
    TransferredToAnotherPublicHospital,
    MovedToPrivate,
    Moved,
    Dead,
    RefusedToComeBack,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub uuid: RecordId,
    pub patient_uuid: RecordId,
    pub facility_uuid: RecordId,
    pub creation_facility_uuid: Option<RecordId>,
    pub scheduled_date: NaiveDate,
    pub status: AppointmentStatus,
    pub cancel_reason: Option<CancelReason>,
    pub remind_on: Option<NaiveDate>,
    pub agreed_to_visit: Option<bool>,
    pub appointment_type: AppointmentType,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

impl Appointment {
    /// A manually scheduled visit, created at `now` at `facility_uuid`.
    pub fn schedule(
        patient_uuid: RecordId,
        facility_uuid: RecordId,
        scheduled_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: RecordId::new(),
            patient_uuid,
            facility_uuid,
            creation_facility_uuid: Some(facility_uuid),
            scheduled_date,
            status: AppointmentStatus::Scheduled,
            cancel_reason: None,
            remind_on: None,
            agreed_to_visit: None,
            appointment_type: AppointmentType::Manual,
            timestamps: Timestamps::create(now),
            sync_status: SyncStatus::Pending,
        }
    }

    #[must_use]
    pub fn mark_visited(self, now: DateTime<Utc>) -> Self {
        Self {
            status: AppointmentStatus::Visited,
            ..self
        }
        .edited(now)
    }

    #[must_use]
    pub fn cancel(self, reason: CancelReason, now: DateTime<Utc>) -> Self {
        Self {
            status: AppointmentStatus::Cancelled,
            cancel_reason: Some(reason),
            ..self
        }
        .edited(now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentPayload {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub patient_id: RecordId,
    pub facility_id: RecordId,
    #[serde(default)]
    pub creation_facility_id: Option<RecordId>,
    pub scheduled_date: NaiveDate,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub cancel_reason: Option<CancelReason>,
    #[serde(default)]
    pub remind_on: Option<NaiveDate>,
    #[serde(default)]
    pub agreed_to_visit: Option<bool>,
    pub appointment_type: AppointmentType,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for AppointmentPayload {
    fn uuid(&self) -> RecordId {
        self.uuid
    }
}

impl Synceable for Appointment {
    type Payload = AppointmentPayload;

    const TABLE: &'static str = "appointments";

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

    fn to_payload(&self) -> AppointmentPayload {
        AppointmentPayload {
            uuid: self.uuid,
            patient_id: self.patient_uuid,
            facility_id: self.facility_uuid,
            creation_facility_id: self.creation_facility_uuid,
            scheduled_date: self.scheduled_date,
            status: self.status,
            cancel_reason: self.cancel_reason,
            remind_on: self.remind_on,
            agreed_to_visit: self.agreed_to_visit,
            appointment_type: self.appointment_type,
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: AppointmentPayload, sync_status: SyncStatus) -> Self {
        Self {
            uuid: payload.uuid,
            patient_uuid: payload.patient_id,
            facility_uuid: payload.facility_id,
            creation_facility_uuid: payload.creation_facility_id,
            scheduled_date: payload.scheduled_date,
            status: payload.status,
            cancel_reason: payload.cancel_reason,
            remind_on: payload.remind_on,
            agreed_to_visit: payload.agreed_to_visit,
            appointment_type: payload.appointment_type,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
