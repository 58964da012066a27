//! Wiring of the synced record types to their server resources.

use crate::api::HttpSyncApi;
use crate::config::{ApiConfig, BatchSize, SyncConfig, SyncGroup};
use crate::error::SyncResult;
use crate::model_sync::{EntitySync, ModelSync, SyncDirection};
use clinic_model::{
    Appointment, BloodPressureMeasurement, BloodSugarMeasurement, CallResult, Facility,
    MedicalHistory, PrescribedDrug, Protocol, QuestionnaireResponse, Synceable,
};
use clinic_storage::Database;
use std::sync::Arc;

/// Where and how a record type syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncResource {
    /// Resource name in the URL and the JSON envelope.
    pub resource: &'static str,
    pub api_version: &'static str,
    /// Key of the stored continuation token.
    pub token_key: &'static str,
    pub direction: SyncDirection,
    pub group: SyncGroup,
    pub requires_sync_approved_user: bool,
}

impl SyncResource {
    pub const BLOOD_PRESSURES: SyncResource = SyncResource {
        resource: "blood_pressures",
        api_version: "v3",
        token_key: "last_blood_pressure_pull_token_v3",
        direction: SyncDirection::PushAndPull,
        group: SyncGroup::Frequent,
        requires_sync_approved_user: true,
    };

    pub const BLOOD_SUGARS: SyncResource = SyncResource {
        resource: "blood_sugars",
        api_version: "v4",
        token_key: "last_blood_sugar_pull_token_v4",
        direction: SyncDirection::PushAndPull,
        group: SyncGroup::Frequent,
        requires_sync_approved_user: true,
    };

    pub const PRESCRIPTIONS: SyncResource = SyncResource {
        resource: "prescription_drugs",
        api_version: "v3",
        token_key: "last_prescription_pull_token_v3",
        direction: SyncDirection::PushAndPull,
        group: SyncGroup::Frequent,
        requires_sync_approved_user: true,
    };

    pub const APPOINTMENTS: SyncResource = SyncResource {
        resource: "appointments",
        api_version: "v3",
        token_key: "last_appointment_pull_token_v3",
        direction: SyncDirection::PushAndPull,
        group: SyncGroup::Frequent,
        requires_sync_approved_user: true,
    };

    pub const MEDICAL_HISTORIES: SyncResource = SyncResource {
        resource: "medical_histories",
        api_version: "v3",
        token_key: "last_medical_history_pull_token_v3",
        direction: SyncDirection::PushAndPull,
        group: SyncGroup::Frequent,
        requires_sync_approved_user: true,
    };

    pub const CALL_RESULTS: SyncResource = SyncResource {
        resource: "call_results",
        api_version: "v4",
        token_key: "last_call_result_pull_token_v4",
        direction: SyncDirection::PushAndPull,
        group: SyncGroup::Frequent,
        requires_sync_approved_user: true,
    };

    pub const QUESTIONNAIRE_RESPONSES: SyncResource = SyncResource {
        resource: "questionnaire_responses",
        api_version: "v4",
        token_key: "last_questionnaire_response_pull_token_v4",
        direction: SyncDirection::PushAndPull,
        group: SyncGroup::Frequent,
        requires_sync_approved_user: true,
    };

    /// Facilities are listed before login, so no approved user is needed.
    pub const FACILITIES: SyncResource = SyncResource {
        resource: "facilities",
        api_version: "v3",
        token_key: "last_facility_pull_token_v3",
        direction: SyncDirection::PullOnly,
        group: SyncGroup::Daily,
        requires_sync_approved_user: false,
    };

    /// Protocols are read by the prescription screens before login too.
    pub const PROTOCOLS: SyncResource = SyncResource {
        resource: "protocols",
        api_version: "v3",
        token_key: "last_protocol_pull_token_v3",
        direction: SyncDirection::PullOnly,
        group: SyncGroup::Daily,
        requires_sync_approved_user: false,
    };

    /// Every resource, in sync order.
    pub const ALL: [SyncResource; 9] = [
        SyncResource::FACILITIES,
        SyncResource::PROTOCOLS,
        SyncResource::BLOOD_PRESSURES,
        SyncResource::BLOOD_SUGARS,
        SyncResource::PRESCRIPTIONS,
        SyncResource::APPOINTMENTS,
        SyncResource::MEDICAL_HISTORIES,
        SyncResource::CALL_RESULTS,
        SyncResource::QUESTIONNAIRE_RESPONSES,
    ];

    /// Builds the HTTP-backed sync of record type `R` for this resource.
    pub fn connect<R: Synceable>(
        &self,
        database: &Database,
        api: &ApiConfig,
        batch_size: BatchSize,
    ) -> SyncResult<EntitySync<R>> {
        let repository = Arc::new(database.repository::<R>()?);
        let http = HttpSyncApi::<R::Payload>::new(api.clone(), self.resource, self.api_version)?;
        let config = SyncConfig::new(self.resource, batch_size, self.group);

        Ok(EntitySync::new(
            repository,
            Arc::new(http),
            database.pull_tokens().token(self.token_key),
            config,
        )
        .with_direction(self.direction)
        .with_requires_approved_user(self.requires_sync_approved_user))
    }
}

pub fn blood_pressure_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<BloodPressureMeasurement>> {
    SyncResource::BLOOD_PRESSURES.connect(database, api, batch_size)
}

pub fn blood_sugar_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<BloodSugarMeasurement>> {
    SyncResource::BLOOD_SUGARS.connect(database, api, batch_size)
}

pub fn prescription_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<PrescribedDrug>> {
    SyncResource::PRESCRIPTIONS.connect(database, api, batch_size)
}

pub fn appointment_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<Appointment>> {
    SyncResource::APPOINTMENTS.connect(database, api, batch_size)
}

pub fn medical_history_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<MedicalHistory>> {
    SyncResource::MEDICAL_HISTORIES.connect(database, api, batch_size)
}

pub fn call_result_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<CallResult>> {
    SyncResource::CALL_RESULTS.connect(database, api, batch_size)
}

pub fn questionnaire_response_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<QuestionnaireResponse>> {
    SyncResource::QUESTIONNAIRE_RESPONSES.connect(database, api, batch_size)
}

pub fn facility_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<Facility>> {
    SyncResource::FACILITIES.connect(database, api, batch_size)
}

pub fn protocol_sync(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<EntitySync<Protocol>> {
    SyncResource::PROTOCOLS.connect(database, api, batch_size)
}

/// All entity syncs of the client, ready to hand to [`DataSync`](crate::DataSync).
pub fn all_syncs(
    database: &Database,
    api: &ApiConfig,
    batch_size: BatchSize,
) -> SyncResult<Vec<Arc<dyn ModelSync>>> {
    let syncs: Vec<Arc<dyn ModelSync>> = vec![
        Arc::new(facility_sync(database, api, batch_size)?),
        Arc::new(protocol_sync(database, api, batch_size)?),
        Arc::new(blood_pressure_sync(database, api, batch_size)?),
        Arc::new(blood_sugar_sync(database, api, batch_size)?),
        Arc::new(prescription_sync(database, api, batch_size)?),
        Arc::new(appointment_sync(database, api, batch_size)?),
        Arc::new(medical_history_sync(database, api, batch_size)?),
        Arc::new(call_result_sync(database, api, batch_size)?),
        Arc::new(questionnaire_response_sync(database, api, batch_size)?),
    ];
    Ok(syncs)
}
