//! A patient's medical history questionnaire.

use crate::{RecordPayload, Synceable};
use chrono::{DateTime, Utc};
use clinic_types::{RecordId, SyncStatus, Timestamps};
use serde::{Deserialize, Serialize};

/// Answer to a single medical history question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    Suspected,
    #[default]
    #[serde(alias = "unknown")]
    Unanswered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicalHistory {
    pub uuid: RecordId,
    pub patient_uuid: RecordId,
    pub diagnosed_with_hypertension: Answer,
    pub is_on_hypertension_treatment: Answer,
    pub is_on_diabetes_treatment: Answer,
    pub has_had_heart_attack: Answer,
    pub has_had_stroke: Answer,
    pub has_had_kidney_disease: Answer,
    pub diagnosed_with_diabetes: Answer,
    pub is_smoking: Answer,
    pub cholesterol: Option<f32>,
    pub timestamps: Timestamps,
    pub sync_status: SyncStatus,
}

impl MedicalHistory {
    /// An empty history for `patient_uuid`, every question unanswered.
    pub fn blank(patient_uuid: RecordId, now: DateTime<Utc>) -> Self {
        Self {
            uuid: RecordId::new(),
            patient_uuid,
            diagnosed_with_hypertension: Answer::Unanswered,
            is_on_hypertension_treatment: Answer::Unanswered,
            is_on_diabetes_treatment: Answer::Unanswered,
            has_had_heart_attack: Answer::Unanswered,
            has_had_stroke: Answer::Unanswered,
            has_had_kidney_disease: Answer::Unanswered,
            diagnosed_with_diabetes: Answer::Unanswered,
            is_smoking: Answer::Unanswered,
            cholesterol: None,
            timestamps: Timestamps::create(now),
            sync_status: SyncStatus::Pending,
        }
    }

    #[must_use]
    pub fn answered_hypertension(self, answer: Answer, now: DateTime<Utc>) -> Self {
        Self {
            diagnosed_with_hypertension: answer,
            ..self
        }
        .edited(now)
    }

    #[must_use]
    pub fn answered_diabetes(self, answer: Answer, now: DateTime<Utc>) -> Self {
        Self {
            diagnosed_with_diabetes: answer,
            ..self
        }
        .edited(now)
    }

    #[must_use]
    pub fn with_cholesterol(self, cholesterol: Option<f32>, now: DateTime<Utc>) -> Self {
        Self {
            cholesterol,
            ..self
        }
        .edited(now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistoryPayload {
    #[serde(rename = "id")]
    pub uuid: RecordId,
    pub patient_id: RecordId,
    #[serde(default)]
    pub diagnosed_with_hypertension: Answer,
    #[serde(default)]
    pub receiving_treatment_for_hypertension: Answer,
    #[serde(default)]
    pub receiving_treatment_for_diabetes: Answer,
    #[serde(default)]
    pub prior_heart_attack: Answer,
    #[serde(default)]
    pub prior_stroke: Answer,
    #[serde(default)]
    pub chronic_kidney_disease: Answer,
    #[serde(default)]
    pub diabetes: Answer,
    #[serde(default)]
    pub smoking: Answer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol_value: Option<f32>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecordPayload for MedicalHistoryPayload {
    fn uuid(&self) -> RecordId {
        self.uuid
    }
}

impl Synceable for MedicalHistory {
    type Payload = MedicalHistoryPayload;

    const TABLE: &'static str = "medical_histories";

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

    fn to_payload(&self) -> MedicalHistoryPayload {
        MedicalHistoryPayload {
            uuid: self.uuid,
            patient_id: self.patient_uuid,
            diagnosed_with_hypertension: self.diagnosed_with_hypertension,
            receiving_treatment_for_hypertension: self.is_on_hypertension_treatment,
            receiving_treatment_for_diabetes: self.is_on_diabetes_treatment,
            prior_heart_attack: self.has_had_heart_attack,
            prior_stroke: self.has_had_stroke,
            chronic_kidney_disease: self.has_had_kidney_disease,
            diabetes: self.diagnosed_with_diabetes,
            smoking: self.is_smoking,
            cholesterol_value: self.cholesterol,
            timestamps: self.timestamps,
        }
    }

    fn from_payload(payload: MedicalHistoryPayload, sync_status: SyncStatus) -> Self {
        Self {
            uuid: payload.uuid,
            patient_uuid: payload.patient_id,
            diagnosed_with_hypertension: payload.diagnosed_with_hypertension,
            is_on_hypertension_treatment: payload.receiving_treatment_for_hypertension,
            is_on_diabetes_treatment: payload.receiving_treatment_for_diabetes,
            has_had_heart_attack: payload.prior_heart_attack,
            has_had_stroke: payload.prior_stroke,
            has_had_kidney_disease: payload.chronic_kidney_disease,
            diagnosed_with_diabetes: payload.diabetes,
            is_smoking: payload.smoking,
            cholesterol: payload.cholesterol_value,
            timestamps: payload.timestamps,
            sync_status,
        }
    }
}
