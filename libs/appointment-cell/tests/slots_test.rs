use chrono::{Duration, NaiveDate, NaiveTime};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentStatus};
use appointment_cell::services::slots::{
    build_slots, closing_time, end_of_month, opening_time, SlotGenerationService, SLOT_MINUTES,
};
use shared_utils::test_utils::{MockDbResponses, TestConfig};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn single_day_produces_twenty_slots() {
    let day = date("2024-01-01");
    let slots = build_slots(1, day, day);

    assert_eq!(slots.len(), 20);
    assert_eq!(slots[0].start_time, opening_time());
    assert_eq!(
        slots.last().unwrap().end_time,
        closing_time(),
    );
}

#[test]
fn slot_count_scales_with_days_in_range() {
    let slots = build_slots(1, date("2024-01-01"), date("2024-01-31"));
    assert_eq!(slots.len(), 31 * 20);

    let slots = build_slots(1, date("2024-03-30"), date("2024-04-02"));
    assert_eq!(slots.len(), 4 * 20);
}

#[test]
fn every_slot_is_thirty_minutes_and_available() {
    let slots = build_slots(7, date("2024-06-10"), date("2024-06-12"));

    for slot in &slots {
        assert_eq!(slot.doctor_id, 7);
        assert_eq!(
            slot.end_time,
            slot.start_time + Duration::minutes(SLOT_MINUTES)
        );
        assert!(slot.is_available);
        assert_eq!(slot.status, AppointmentStatus::Available);
        assert!(slot.start_time >= opening_time());
        assert!(slot.end_time <= closing_time());
    }
}

#[test]
fn slots_within_a_day_are_consecutive() {
    let day = date("2024-06-10");
    let slots = build_slots(1, day, day);

    for window in slots.windows(2) {
        assert_eq!(window[0].end_time, window[1].start_time);
    }
    assert_eq!(
        slots[1].start_time,
        NaiveTime::from_hms_opt(9, 30, 0).unwrap()
    );
}

#[test]
fn end_of_month_handles_short_and_leap_months() {
    assert_eq!(end_of_month(date("2024-01-15")), date("2024-01-31"));
    assert_eq!(end_of_month(date("2024-02-01")), date("2024-02-29"));
    assert_eq!(end_of_month(date("2023-02-10")), date("2023-02-28"));
    assert_eq!(end_of_month(date("2024-04-30")), date("2024-04-30"));
    assert_eq!(end_of_month(date("2024-12-31")), date("2024-12-31"));
}

#[tokio::test]
async fn generate_for_doctor_persists_in_one_bulk_insert() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockDbResponses::available_slot_row(1, 3, "2024-01-01", "09:00:00", "09:30:00"),
            MockDbResponses::available_slot_row(2, 3, "2024-01-01", "09:30:00", "10:00:00"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::for_mock_server(&mock_server.uri()).to_app_config();
    let service = SlotGenerationService::new(&config);

    let created = service
        .generate_for_doctor(3, date("2024-01-01"), date("2024-01-01"))
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|a| a.is_available));

    // One bulk insert carrying the full day of slots.
    let requests = mock_server.received_requests().await.unwrap();
    let inserts: Vec<_> = requests
        .iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/rest/v1/appointments")
        .collect();
    assert_eq!(inserts.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&inserts[0].body).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn generate_rejects_inverted_date_range() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = TestConfig::for_mock_server(&mock_server.uri()).to_app_config();
    let service = SlotGenerationService::new(&config);

    let result = service
        .generate_for_doctor(3, date("2024-02-10"), date("2024-02-01"))
        .await;

    assert!(matches!(result, Err(AppointmentError::ValidationError(_))));
}
