//! Treatment protocols. Server-owned and only ever pulled, like facilities.

use crate::{RecordPayload, Synceable};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};

/// A drug recommended by a protocol, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDrug {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub protocol_id: RecordId,
    pub name: String,
    pub dosage: String,
    #[serde(default, rename = "rxnorm_code")]
    pub rx_norm_code: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Protocol {
    pub uuid: RecordId,
    pub name: String,
    pub follow_up_days: u32,
    pub drugs: Vec<ProtocolDrug>,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolPayload {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub name: String,
    pub follow_up_days: u32,
    #[serde(default)]
    pub protocol_drugs: Vec<ProtocolDrug>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for ProtocolPayload {
    fn uuid(&self) -> RecordId {
        self.uuid
    }
}

impl Synceable for Protocol {
    type Payload = ProtocolPayload;

    const TABLE: &'static str = "protocols";

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

    fn to_payload(&self) -> ProtocolPayload {
        ProtocolPayload {
            uuid: self.uuid,
            name: self.name.clone(),
            follow_up_days: self.follow_up_days,
            protocol_drugs: self.drugs.clone(),
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: ProtocolPayload, sync_status: SyncStatus) -> Self {
        Self {
            uuid: payload.uuid,
            name: payload.name,
            follow_up_days: payload.follow_up_days,
            drugs: payload.protocol_drugs,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
