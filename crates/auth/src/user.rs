//! The authenticated user record.
//!
//! The wire shape follows the remote service (`nombre_completo`, `rol`,
//! `activo`); English field names are accepted on input as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use assetctl_core::UserId;

use crate::Role;

/// A signed-in user as returned by the login endpoint.
///
/// # Invariants
/// - `username` is never blank.
/// - `role` is one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(rename = "nombre_completo", alias = "display_name", default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "rol", alias = "role")]
    pub role: Role,
    #[serde(rename = "activo", alias = "active", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserRecordError {
    #[error("user record is not valid JSON: {0}")]
    Malformed(String),

    #[error("user record has no username")]
    MissingUsername,
}

impl User {
    /// Parse a user from an arbitrary JSON payload (login response, stored record).
    pub fn from_value(value: Value) -> Result<Self, UserRecordError> {
        let user: User =
            serde_json::from_value(value).map_err(|e| UserRecordError::Malformed(e.to_string()))?;
        user.validated()
    }

    /// Parse a user from its serialized JSON text.
    pub fn from_json(raw: &str) -> Result<Self, UserRecordError> {
        let user: User =
            serde_json::from_str(raw).map_err(|e| UserRecordError::Malformed(e.to_string()))?;
        user.validated()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    fn validated(self) -> Result<Self, UserRecordError> {
        if self.username.trim().is_empty() {
            return Err(UserRecordError::MissingUsername);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_login_payload() {
        let user = User::from_value(json!({
            "id": 3,
            "username": "jperez",
            "nombre_completo": "Juan Pérez",
            "email": "jperez@example.com",
            "rol": "Admin"
        }))
        .unwrap();

        assert_eq!(user.id, UserId::new(3));
        assert_eq!(user.display_name, "Juan Pérez");
        assert_eq!(user.role, Role::Admin);
        assert!(user.active, "login payload omits the activity flag");
    }

    #[test]
    fn accepts_english_field_names() {
        let user = User::from_value(json!({
            "id": 9,
            "username": "mora",
            "display_name": "Lucía Mora",
            "role": "user",
            "active": false
        }))
        .unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!user.active);
    }

    #[test]
    fn blank_username_is_rejected() {
        let err = User::from_value(json!({ "id": 1, "username": "  ", "rol": "user" })).unwrap_err();
        assert_eq!(err, UserRecordError::MissingUsername);
    }

    #[test]
    fn missing_username_is_malformed() {
        let err = User::from_json(r#"{"id":1,"rol":"user"}"#).unwrap_err();
        assert!(matches!(err, UserRecordError::Malformed(_)));
    }

    #[test]
    fn unknown_role_is_malformed() {
        let err = User::from_json(r#"{"id":1,"username":"x","rol":"root"}"#).unwrap_err();
        assert!(matches!(err, UserRecordError::Malformed(_)));
    }

    #[test]
    fn stored_form_survives_reload() {
        let user = User::from_json(r#"{"id":5,"username":"kim","nombre_completo":"Kim","rol":"USER"}"#)
            .unwrap();
        let raw = user.to_json().unwrap();
        assert!(raw.contains(r#""rol":"user""#));
        assert_eq!(User::from_json(&raw).unwrap(), user);
    }
}
