//! Authentication and password-reset calls.
//!
//! None of these touch the session: the caller decides what a successful
//! login means. Passwords and tokens never reach the logs.

use serde_json::{Value, json};

use assetctl_core::ServiceResult;

use super::{ApiRequest, Gateway};

impl Gateway {
    /// `POST /api/auth/login`. On success the body holds `{ ok, user }`.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<Option<Value>> {
        let request = ApiRequest::post("/api/auth/login").json(json!({
            "username": username,
            "password": password,
        }));
        self.send_json(request).await
    }

    /// `POST /api/auth/request-reset`. `identifier` is a username or email.
    pub async fn request_password_reset(&self, identifier: &str) -> ServiceResult<Option<Value>> {
        let request = ApiRequest::post("/api/auth/request-reset").json(json!({
            "identifier": identifier,
        }));
        self.send_json(request).await
    }

    /// `GET /api/auth/validate-reset-token?token=...`.
    pub async fn validate_reset_token(&self, token: &str) -> ServiceResult<Option<Value>> {
        let request =
            ApiRequest::get("/api/auth/validate-reset-token").query([("token", token.to_string())]);
        self.send_json(request).await
    }

    /// `POST /api/auth/reset-password`.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ServiceResult<Option<Value>> {
        let request = ApiRequest::post("/api/auth/reset-password").json(json!({
            "token": token,
            "password": new_password,
        }));
        self.send_json(request).await
    }
}
