//! Facilities are managed on the server and only ever pulled.

use crate::{RecordPayload, Synceable};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub uuid: RecordId,
    pub name: String,
    pub facility_type: Option<String>,
    pub district: String,
    pub state: String,
    pub country: String,
    /// Facilities sharing a sync group exchange patient data.
    pub sync_group_id: Option<String>,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityPayload {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub name: String,
    #[serde(default)]
    pub facility_type: Option<String>,
    pub district: String,
    pub state: String,
    pub country: String,
    #[serde(default, rename = "sync_region_id")]
    pub sync_group_id: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for FacilityPayload {
    fn uuid(&self) -> RecordId {
        self.uuid
    }
}

impl Synceable for Facility {
    type Payload = FacilityPayload;

    const TABLE: &'static str = "facilities";

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

    fn to_payload(&self) -> FacilityPayload {
        FacilityPayload {
            uuid: self.uuid,
            name: self.name.clone(),
            facility_type: self.facility_type.clone(),
            district: self.district.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            sync_group_id: self.sync_group_id.clone(),
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: FacilityPayload, sync_status: SyncStatus) -> Self {
        Self {
            uuid: payload.uuid,
            name: payload.name,
            facility_type: payload.facility_type,
            district: payload.district,
            state: payload.state,
            country: payload.country,
            sync_group_id: payload.sync_group_id,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
