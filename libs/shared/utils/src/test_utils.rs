use std::sync::Arc;

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config whose database URL points at a wiremock server.
    pub fn for_mock_server(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            admin_email: "admin@demo.com".to_string(),
            admin_password: "Demo0@00".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl TestUser {
    pub fn new(id: i64, email: &str, role: Role) -> Self {
        Self {
            id,
            email: email.to_string(),
            role,
        }
    }

    pub fn doctor(id: i64) -> Self {
        Self::new(id, "doctor@example.com", Role::Doctor)
    }

    pub fn patient(id: i64) -> Self {
        Self::new(id, "patient@example.com", Role::Patient)
    }

    pub fn admin(id: i64) -> Self {
        Self::new(id, "admin@demo.com", Role::Admin)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: Some(self.email.clone()),
            role: self.role,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id.to_string(),
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Builders for the PostgREST row shapes the cells deserialize in tests.
pub struct MockDbResponses;

impl MockDbResponses {
    pub fn doctor_row(id: i64, email: &str, specialization: &str) -> serde_json::Value {
        json!({
            "id": id,
            "first_name": "Niamh",
            "last_name": "Byrne",
            "age": 41,
            "gender": "female",
            "email": email,
            "phone_no": "0861234567",
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$AAAAAAAAAAAAAAAAAAAAAA",
            "specialization": specialization
        })
    }

    pub fn patient_row(id: i64, email: &str) -> serde_json::Value {
        json!({
            "id": id,
            "first_name": "Liam",
            "last_name": "Kelly",
            "age": 29,
            "gender": "male",
            "email": email,
            "phone_no": "0877654321",
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$AAAAAAAAAAAAAAAAAAAAAA",
            "medical_history": null
        })
    }

    pub fn admin_row(id: i64, email: &str, password_hash: &str) -> serde_json::Value {
        json!({
            "id": id,
            "email": email,
            "password": password_hash
        })
    }

    pub fn available_slot_row(id: i64, doctor_id: i64, date: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_id": null,
            "appointment_date": date,
            "start_time": start,
            "end_time": end,
            "is_available": true,
            "status": "AVAILABLE",
            "symptoms": null
        })
    }

    pub fn booked_slot_row(
        id: i64,
        doctor_id: i64,
        patient_id: i64,
        date: &str,
        start: &str,
        end: &str,
        symptoms: Option<&str>,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "appointment_date": date,
            "start_time": start,
            "end_time": end,
            "is_available": false,
            "status": "BOOKED",
            "symptoms": symptoms
        })
    }

    pub fn medication_row(id: i64, appointment_id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "appointment_id": appointment_id,
            "name": name,
            "dosage": "500mg",
            "frequency": "twice daily",
            "instructions": "take with food"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::validate_token;

    #[test]
    fn test_token_roundtrips_through_validation() {
        let config = TestConfig::default();
        let user = TestUser::patient(3);
        let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

        let validated = validate_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(validated.id, "3");
        assert_eq!(validated.role, Role::Patient);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = TestConfig::default();
        let user = TestUser::doctor(7);
        let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);

        assert!(validate_token(&token, &config.jwt_secret).is_err());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let config = TestConfig::default();
        let user = TestUser::admin(1);
        let token = JwtTestUtils::create_invalid_signature_token(&user);

        assert!(validate_token(&token, &config.jwt_secret).is_err());
    }
}
