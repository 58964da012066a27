//! Outcome of a follow-up call made for an overdue appointment.

use crate::{RecordPayload, Synceable};
use chrono::{DateTime, Utc};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AgreedToVisit,
    RemindToCallLater,
    RemovedFromOverdueList,
}

/// Why an appointment was removed from the overdue list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveReason {
    AlreadyVisited,
    NotResponding,
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
pub struct CallResult {
    pub id: RecordId,
    pub user_id: RecordId,
    pub appointment_id: RecordId,
    pub patient_id: Option<RecordId>,
    pub facility_id: Option<RecordId>,
    pub remove_reason: Option<RemoveReason>,
    pub outcome: Outcome,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

/// Who made the call and about which appointment.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    pub user_id: RecordId,
    pub appointment_id: RecordId,
    pub patient_id: RecordId,
    pub facility_id: RecordId,
}

impl CallResult {
    fn new(
        id: RecordId,
        context: CallContext,
        outcome: Outcome,
        remove_reason: Option<RemoveReason>,
        now: DateTime<Utc>,
        sync_status: SyncStatus,
    ) -> Self {
        Self {
            id,
            user_id: context.user_id,
            appointment_id: context.appointment_id,
            patient_id: Some(context.patient_id),
            facility_id: Some(context.facility_id),
            remove_reason,
            outcome,
            timestamps: Timestamps::create(now),
            sync_status,
        }
    }

    pub fn agreed_to_visit(
        id: RecordId,
        context: CallContext,
        now: DateTime<Utc>,
        sync_status: SyncStatus,
    ) -> Self {
        Self::new(id, context, Outcome::AgreedToVisit, None, now, sync_status)
    }

    pub fn remind_to_call_later(
        id: RecordId,
        context: CallContext,
        now: DateTime<Utc>,
        sync_status: SyncStatus,
    ) -> Self {
        Self::new(id, context, Outcome::RemindToCallLater, None, now, sync_status)
    }

    pub fn removed(
        id: RecordId,
        reason: RemoveReason,
        context: CallContext,
        now: DateTime<Utc>,
        sync_status: SyncStatus,
    ) -> Self {
        Self::new(
            id,
            context,
            Outcome::RemovedFromOverdueList,
            Some(reason),
            now,
            sync_status,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResultPayload {
    pub id: RecordId,
    pub user_id: RecordId,
    pub appointment_id: RecordId,
    #[serde(default)]
    pub patient_id: Option<RecordId>,
    #[serde(default)]
    pub facility_id: Option<RecordId>,
    #[serde(default)]
    pub remove_reason: Option<RemoveReason>,
    pub result_type: Outcome,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for CallResultPayload {
    fn uuid(&self) -> RecordId {
        self.id
    }
}

impl Synceable for CallResult {
    type Payload = CallResultPayload;

    const TABLE: &'static str = "call_results";

    fn uuid(&self) -> RecordId {
        self.id
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
        self.patient_id
    }

    fn to_payload(&self) -> CallResultPayload {
        CallResultPayload {
            id: self.id,
            user_id: self.user_id,
            appointment_id: self.appointment_id,
            patient_id: self.patient_id,
            facility_id: self.facility_id,
            remove_reason: self.remove_reason,
            result_type: self.outcome,
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: CallResultPayload, sync_status: SyncStatus) -> Self {
        Self {
            id: payload.id,
            user_id: payload.user_id,
            appointment_id: payload.appointment_id,
            patient_id: payload.patient_id,
            facility_id: payload.facility_id,
            remove_reason: payload.remove_reason,
            outcome: payload.result_type,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
