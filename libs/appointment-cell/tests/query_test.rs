use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentStatus};
use appointment_cell::services::query::AppointmentQueryService;
use shared_utils::test_utils::{MockDbResponses, TestConfig};

fn query_service(mock_server: &MockServer) -> AppointmentQueryService {
    let config = TestConfig::for_mock_server(&mock_server.uri()).to_app_config();
    AppointmentQueryService::new(&config)
}

#[tokio::test]
async fn missing_appointment_is_a_typed_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = query_service(&mock_server);
    assert_matches!(
        service.get_appointment(42).await,
        Err(AppointmentError::NotFound)
    );
}

#[tokio::test]
async fn patient_status_query_with_no_rows_is_an_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", "eq.3"))
        .and(query_param("status", "eq.BOOKED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = query_service(&mock_server);
    let appointments = service
        .by_patient_and_status(3, AppointmentStatus::Booked)
        .await
        .unwrap();

    assert!(appointments.is_empty());
}

#[tokio::test]
async fn patient_status_query_returns_matching_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", "eq.3"))
        .and(query_param("status", "eq.BOOKED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::booked_slot_row(5, 1, 3, "2030-01-07", "10:00:00", "10:30:00", Some("fever")),
            MockDbResponses::booked_slot_row(9, 2, 3, "2030-01-09", "11:00:00", "11:30:00", None),
        ])))
        .mount(&mock_server)
        .await;

    let service = query_service(&mock_server);
    let appointments = service
        .by_patient_and_status(3, AppointmentStatus::Booked)
        .await
        .unwrap();

    assert_eq!(appointments.len(), 2);
    assert!(appointments
        .iter()
        .all(|a| a.patient_id == Some(3) && a.status == AppointmentStatus::Booked));
}

#[tokio::test]
async fn available_doctors_are_deduplicated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("appointment_date", "eq.2030-01-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "doctor_id": 2 },
            { "doctor_id": 1 },
            { "doctor_id": 2 },
            { "doctor_id": 1 },
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "in.(1,2)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "first_name": "Niamh", "last_name": "Byrne", "specialization": "Cardiology" },
            { "id": 2, "first_name": "Sean", "last_name": "Walsh", "specialization": "Dermatology" },
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = query_service(&mock_server);
    let doctors = service
        .available_doctors_on("2030-01-07".parse().unwrap())
        .await
        .unwrap();

    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].id, 1);
    assert_eq!(doctors[1].id, 2);
}

#[tokio::test]
async fn no_slots_on_a_date_means_no_doctors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = query_service(&mock_server);
    let doctors = service
        .available_doctors_on("2030-01-07".parse().unwrap())
        .await
        .unwrap();

    assert!(doctors.is_empty());
}

#[tokio::test]
async fn available_appointments_filters_on_availability() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.1"))
        .and(query_param("appointment_date", "eq.2030-01-07"))
        .and(query_param("is_available", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::available_slot_row(5, 1, "2030-01-07", "09:00:00", "09:30:00"),
            MockDbResponses::available_slot_row(6, 1, "2030-01-07", "09:30:00", "10:00:00"),
        ])))
        .mount(&mock_server)
        .await;

    let service = query_service(&mock_server);
    let slots = service
        .available_appointments(1, "2030-01-07".parse().unwrap())
        .await
        .unwrap();

    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|a| a.is_available));
}
