use clinic_model::{Answer, MedicalHistory, MedicalHistoryPayload, Synceable};
use clinic_sync::protocol::{DataPushRequest, pull_response_json};
use clinic_sync::{DataPullResponse, DataPushResponse, SyncError};
use clinic_types::RecordId;
use chrono::{TimeZone, Utc};
use serde_json::json;

fn history() -> MedicalHistory {
    MedicalHistory::blank(RecordId::new(), Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap())
        .answered_diabetes(Answer::Yes, Utc.with_ymd_and_hms(2024, 5, 2, 8, 5, 0).unwrap())
}

#[test]
fn push_request_is_keyed_by_resource() {
    let payloads = vec![history().to_payload()];
    let request = DataPushRequest {
        resource: "medical_histories",
        payloads: &payloads,
    };
    let value = serde_json::to_value(&request).unwrap();

    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert_eq!(object["medical_histories"][0]["diabetes"], json!("yes"));
}

#[test]
fn pull_response_reads_resource_and_token() {
    let payload = history().to_payload();
    let body = pull_response_json("medical_histories", &[payload.clone()], "p-2").unwrap();

    let page: DataPullResponse<MedicalHistoryPayload> =
        DataPullResponse::from_json("medical_histories", &body.to_string()).unwrap();

    assert_eq!(page.process_token, "p-2");
    assert_eq!(page.payloads, vec![payload]);
}

#[test]
fn pull_response_without_token_is_rejected() {
    let result = DataPullResponse::<MedicalHistoryPayload>::from_json(
        "medical_histories",
        r#"{"medical_histories": []}"#,
    );
    assert!(matches!(result, Err(SyncError::Serialization(_))));
}

#[test]
fn push_response_errors_default_to_empty() {
    let response: DataPushResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(response, DataPushResponse::accepted());
    assert_eq!(response.invalid_ids().count(), 0);
}
