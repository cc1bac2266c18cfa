use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medication_cell::models::{CreateMedicationRequest, MedicationError, UpdateMedicationRequest};
use medication_cell::services::medication::MedicationService;
use shared_utils::test_utils::{MockDbResponses, TestConfig};

fn medication_service(mock_server: &MockServer) -> MedicationService {
    let config = TestConfig::for_mock_server(&mock_server.uri()).to_app_config();
    MedicationService::new(&config)
}

fn amoxicillin() -> CreateMedicationRequest {
    CreateMedicationRequest {
        name: "Amoxicillin".to_string(),
        dosage: "500mg".to_string(),
        frequency: "twice daily".to_string(),
        instructions: Some("take with food".to_string()),
    }
}

async fn mock_appointment_exists(mock_server: &MockServer, appointment_id: i64) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": appointment_id }])),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn adding_requires_an_existing_appointment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = medication_service(&mock_server);
    let result = service.add_to_appointment(42, amoxicillin()).await;

    assert_matches!(result, Err(MedicationError::AppointmentNotFound));
}

#[tokio::test]
async fn adding_attaches_the_medication_to_the_appointment() {
    let mock_server = MockServer::start().await;
    mock_appointment_exists(&mock_server, 5).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockDbResponses::medication_row(7, 5, "Amoxicillin")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = medication_service(&mock_server);
    let medication = service.add_to_appointment(5, amoxicillin()).await.unwrap();

    assert_eq!(medication.id, 7);
    assert_eq!(medication.appointment_id, 5);

    let requests = mock_server.received_requests().await.unwrap();
    let insert = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&insert.body).unwrap();
    assert_eq!(body["appointment_id"], json!(5));
    assert_eq!(body["name"], json!("Amoxicillin"));
}

#[tokio::test]
async fn listing_for_an_appointment_with_none_is_empty() {
    let mock_server = MockServer::start().await;
    mock_appointment_exists(&mock_server, 5).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medications"))
        .and(query_param("appointment_id", "eq.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = medication_service(&mock_server);
    let medications = service.medications_for_appointment(5).await.unwrap();

    assert!(medications.is_empty());
}

#[tokio::test]
async fn listing_for_a_missing_appointment_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = medication_service(&mock_server);
    let result = service.medications_for_appointment(42).await;

    assert_matches!(result, Err(MedicationError::AppointmentNotFound));
}

#[tokio::test]
async fn updating_a_missing_medication_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medications"))
        .and(query_param("id", "eq.99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = medication_service(&mock_server);
    let request = UpdateMedicationRequest {
        name: "Amoxicillin".to_string(),
        dosage: "250mg".to_string(),
        frequency: "once daily".to_string(),
        instructions: None,
    };

    assert_matches!(
        service.update_medication(99, request).await,
        Err(MedicationError::NotFound)
    );
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medications"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::medication_row(7, 5, "Amoxicillin")
        ])))
        .mount(&mock_server)
        .await;

    let mut updated_row = MockDbResponses::medication_row(7, 5, "Amoxicillin");
    updated_row["dosage"] = json!("250mg");
    updated_row["instructions"] = json!(null);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/medications"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated_row])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = medication_service(&mock_server);
    let request = UpdateMedicationRequest {
        name: "Amoxicillin".to_string(),
        dosage: "250mg".to_string(),
        frequency: "twice daily".to_string(),
        instructions: None,
    };

    let medication = service.update_medication(7, request).await.unwrap();
    assert_eq!(medication.dosage, "250mg");
    assert_eq!(medication.instructions, None);
}

#[tokio::test]
async fn removing_deletes_the_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medications"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::medication_row(7, 5, "Amoxicillin")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/medications"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = medication_service(&mock_server);
    service.remove_medication(7).await.unwrap();
}

#[tokio::test]
async fn removing_a_missing_medication_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = medication_service(&mock_server);
    assert_matches!(
        service.remove_medication(99).await,
        Err(MedicationError::NotFound)
    );
}
