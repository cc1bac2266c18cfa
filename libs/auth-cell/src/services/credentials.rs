use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::Role;
use shared_utils::password::{hash_password, verify_password};

/// Credential fields shared by the patients, doctors, and admins tables.
#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: i64,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub struct CredentialService {
    supabase: Arc<SupabaseClient>,
}

impl CredentialService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Resolve an email across the account tables, in the same order the
    /// original login flow tried them: patient, then doctor, then admin.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedAccount, AuthError> {
        debug!("Authenticating {}", email);

        let lookups = [
            ("patients", Role::Patient),
            ("doctors", Role::Doctor),
            ("admins", Role::Admin),
        ];

        for (table, role) in lookups {
            if let Some(record) = self.find_account(table, email).await? {
                let matches = verify_password(password, &record.password)
                    .map_err(|e| AuthError::Internal(format!("Password verification: {}", e)))?;
                if !matches {
                    return Err(AuthError::InvalidCredentials);
                }

                info!("Authenticated {} as {}", record.email, role);
                return Ok(AuthenticatedAccount {
                    id: record.id,
                    email: record.email,
                    role,
                });
            }
        }

        Err(AuthError::InvalidCredentials)
    }

    /// Create the configured admin account if it does not exist yet.
    /// Returns true when a new account was created.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        if self.find_account("admins", email).await?.is_some() {
            info!("Admin account already exists");
            return Ok(false);
        }

        let password_hash = hash_password(password)
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))?;

        let body = json!({
            "email": email,
            "password": password_hash,
        });

        self.supabase
            .execute(Method::POST, "/rest/v1/admins", Some(body))
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        info!("Admin account created: {}", email);
        Ok(true)
    }

    async fn find_account(
        &self,
        table: &str,
        email: &str,
    ) -> Result<Option<AccountRecord>, AuthError> {
        let path = format!(
            "/rest/v1/{}?email=eq.{}&select=id,email,password",
            table,
            urlencoding::encode(email)
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let record: AccountRecord = serde_json::from_value(row)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to parse account: {}", e)))?;

        Ok(Some(record))
    }
}
