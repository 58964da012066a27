//! Synceable record model for the clinic sync engine.
//!
//! Defines the records that flow between the device and the server:
//! - [`Synceable`]: what storage and sync need from any record type
//! - [`RecordPayload`]: the wire mirror of a record, without sync status
//! - The concrete records: blood pressures, blood sugars, medical histories,
//!   prescribed drugs, appointments, call results, questionnaire responses,
//!   and the pull-only facilities and protocols
//!
//! A record converts to its payload with [`Synceable::to_payload`] and back
//! with [`Synceable::from_payload`], which is also how the local store
//! persists it.

mod appointment;
mod blood_pressure;
mod blood_sugar;
mod call_result;
mod facility;
mod medical_history;
mod prescribed_drug;
mod protocol;
mod questionnaire_response;
mod synceable;

pub use appointment::{
    Appointment, AppointmentPayload, AppointmentStatus, AppointmentType, CancelReason,
};
pub use blood_pressure::{BloodPressureMeasurement, BloodPressurePayload, BloodPressureReading};
pub use blood_sugar::{BloodSugarMeasurement, BloodSugarPayload, BloodSugarType};
pub use call_result::{CallContext, CallResult, CallResultPayload, Outcome, RemoveReason};
pub use facility::{Facility, FacilityPayload};
pub use medical_history::{Answer, MedicalHistory, MedicalHistoryPayload};
pub use prescribed_drug::{PrescribedDrug, PrescribedDrugPayload};
pub use protocol::{Protocol, ProtocolDrug, ProtocolPayload};
pub use questionnaire_response::{QuestionnaireResponse, QuestionnaireResponsePayload};
pub use synceable::{RecordPayload, Synceable};
