//! Top-level handle wiring the resolver, the session and the gateway together.

use std::sync::Arc;

use serde_json::Value;

use assetctl_auth::{Action, User, authorize};
use assetctl_core::{ServiceError, ServiceResult};

use crate::config::ClientConfig;
use crate::context::AuthContext;
use crate::gateway::Gateway;
use crate::location::Location;
use crate::resolver;
use crate::session::Session;
use crate::storage::SessionStore;

/// A booted client: one session plus the gateway bound to its identity.
#[derive(Debug)]
pub struct AssetClient {
    session: Session,
    gateway: Gateway,
}

impl AssetClient {
    /// Boot in order: resolve the start location once, restore the session
    /// (stored user wins over a reset link), then bind the gateway to the
    /// identity the session just installed.
    pub fn boot(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
        location: Arc<dyn Location>,
    ) -> ServiceResult<Self> {
        let route = resolver::resolve(&location.current());
        tracing::debug!(view = %route.initial_view, "resolved start location");

        let auth = AuthContext::new();
        let session = Session::restore(store, location, auth.clone(), config.client, &route);
        let gateway = Gateway::new(config, auth)?;

        Ok(Self { session, gateway })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Log in against the service and, on success, enter the signed-in universe.
    pub async fn sign_in(&mut self, username: &str, password: &str) -> ServiceResult<User> {
        if self.session.is_authenticated() {
            return Err(ServiceError::local("a user is already signed in"));
        }

        let body = self.gateway.login(username, password).await?;
        let user = user_from_login(body)?;

        self.session
            .login(user.clone())
            .map_err(|e| ServiceError::local(e.to_string()))?;
        Ok(user)
    }

    pub fn sign_out(&mut self) {
        self.session.logout();
    }

    /// Check whether the signed-in user's role exposes `action` on this client.
    ///
    /// Only decides what to offer; the service enforces its own rules.
    pub fn ensure_allowed(&self, action: Action) -> ServiceResult<()> {
        let user = self
            .session
            .user()
            .ok_or_else(|| ServiceError::local("not signed in"))?;
        authorize(user, self.session.client_kind(), action).map_err(|e| ServiceError::local(e.to_string()))
    }
}

/// Extract the signed-in user from a login response.
///
/// The service answers with the user record itself; a record nested under
/// `user` is accepted too.
fn user_from_login(body: Option<Value>) -> ServiceResult<User> {
    let mut body = body.ok_or_else(|| ServiceError::local("login response was empty"))?;
    let record = if body.get("user").is_some_and(Value::is_object) {
        body["user"].take()
    } else {
        body
    };
    User::from_value(record)
        .map_err(|e| ServiceError::local(format!("login response did not carry a valid user: {e}")))
}
