//! Session state machine: who is signed in and which view is showing.
//!
//! Two view universes exist and exactly one is reachable at a time:
//! - signed out: `login`, `forgot`, `reset`
//! - signed in: `dashboard`, `empresas`, `ubicaciones`, `responsables`,
//!   `equipos`, `usuarios`
//!
//! Every transition that changes who is signed in also moves the view into the
//! new universe's default, installs or clears the identity headers, and
//! updates durable storage before returning, so a request issued right after
//! a transition always sees the new identity.

use core::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use assetctl_auth::{AuthHeaders, Capabilities, ClientKind, User, capabilities_for};

use crate::context::AuthContext;
use crate::location::Location;
use crate::resolver::{self, RouteInfo};
use crate::storage::SessionStore;

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Login,
    Forgot,
    Reset,
    Dashboard,
    Empresas,
    Ubicaciones,
    Responsables,
    Equipos,
    Usuarios,
}

/// The set of views reachable for a given sign-in state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Universe {
    SignedOut,
    SignedIn,
}

impl Universe {
    pub fn default_view(self) -> View {
        match self {
            Universe::SignedOut => View::Login,
            Universe::SignedIn => View::Dashboard,
        }
    }

    pub fn views(self) -> &'static [View] {
        match self {
            Universe::SignedOut => &View::SIGNED_OUT,
            Universe::SignedIn => &View::SIGNED_IN,
        }
    }
}

impl View {
    pub const SIGNED_OUT: [View; 3] = [View::Login, View::Forgot, View::Reset];
    pub const SIGNED_IN: [View; 6] = [
        View::Dashboard,
        View::Empresas,
        View::Ubicaciones,
        View::Responsables,
        View::Equipos,
        View::Usuarios,
    ];

    pub fn universe(self) -> Universe {
        match self {
            View::Login | View::Forgot | View::Reset => Universe::SignedOut,
            _ => Universe::SignedIn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Login => "login",
            View::Forgot => "forgot",
            View::Reset => "reset",
            View::Dashboard => "dashboard",
            View::Empresas => "empresas",
            View::Ubicaciones => "ubicaciones",
            View::Responsables => "responsables",
            View::Equipos => "equipos",
            View::Usuarios => "usuarios",
        }
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::SIGNED_OUT
            .iter()
            .chain(View::SIGNED_IN.iter())
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown view '{s}'"))
    }
}

impl core::fmt::Display for View {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated { view: View, reset_token: String },
    Authenticated { user: User, view: View },
}

impl SessionState {
    fn signed_out(view: View, reset_token: String) -> Self {
        debug_assert_eq!(view.universe(), Universe::SignedOut);
        SessionState::Unauthenticated { view, reset_token }
    }

    fn signed_in(user: User) -> Self {
        SessionState::Authenticated {
            user,
            view: Universe::SignedIn.default_view(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a user is already signed in")]
    AlreadyAuthenticated,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Owner of the signed-in user, the current view and the reset token.
///
/// The only writer of the shared [`AuthContext`].
pub struct Session {
    state: SessionState,
    client: ClientKind,
    auth: AuthContext,
    store: Arc<dyn SessionStore>,
    location: Arc<dyn Location>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("view", &self.view())
            .field("user", &self.user().map(|u| &u.username))
            .field("client", &self.client)
            .field("epoch", &self.auth.epoch())
            .finish()
    }
}

impl Session {
    /// Build the initial session from storage and the boot-time route.
    ///
    /// A valid stored user wins over any reset link. A missing or corrupt
    /// record is discarded and the route decides the signed-out view.
    pub fn restore(
        store: Arc<dyn SessionStore>,
        location: Arc<dyn Location>,
        auth: AuthContext,
        client: ClientKind,
        route: &RouteInfo,
    ) -> Self {
        let restored = match store.load() {
            Ok(Some(raw)) => match User::from_json(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    tracing::warn!("discarding stored session: {err}");
                    discard(store.as_ref());
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("stored session unreadable, discarding: {err}");
                discard(store.as_ref());
                None
            }
        };

        let state = match restored {
            Some(user) => {
                auth.install(AuthHeaders::for_user(&user, client));
                tracing::info!(username = %user.username, "restored session");
                SessionState::signed_in(user)
            }
            None => {
                auth.clear();
                SessionState::signed_out(route.initial_view, route.initial_token.clone())
            }
        };

        Self {
            state,
            client,
            auth,
            store,
            location,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            SessionState::Unauthenticated { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn view(&self) -> View {
        match &self.state {
            SessionState::Authenticated { view, .. } | SessionState::Unauthenticated { view, .. } => {
                *view
            }
        }
    }

    pub fn universe(&self) -> Universe {
        if self.is_authenticated() {
            Universe::SignedIn
        } else {
            Universe::SignedOut
        }
    }

    /// Reset token typed or carried in; empty while signed in.
    pub fn reset_token(&self) -> &str {
        match &self.state {
            SessionState::Unauthenticated { reset_token, .. } => reset_token,
            SessionState::Authenticated { .. } => "",
        }
    }

    pub fn client_kind(&self) -> ClientKind {
        self.client
    }

    pub fn auth_context(&self) -> &AuthContext {
        &self.auth
    }

    /// Actions screens may offer the current user. `None` when signed out.
    pub fn capabilities(&self) -> Option<Capabilities> {
        self.user().map(|u| {
            if u.active {
                capabilities_for(u.role, self.client)
            } else {
                Capabilities::NONE
            }
        })
    }

    /// Sign `user` in. Only valid while signed out.
    pub fn login(&mut self, user: User) -> Result<(), SessionError> {
        if self.is_authenticated() {
            return Err(SessionError::AlreadyAuthenticated);
        }

        self.auth.install(AuthHeaders::for_user(&user, self.client));

        match user.to_json() {
            Ok(raw) => {
                if let Err(err) = self.store.save(&raw) {
                    tracing::warn!("failed to persist session: {err}");
                }
            }
            Err(err) => tracing::warn!("failed to serialize session: {err}"),
        }

        tracing::info!(username = %user.username, role = %user.role, "signed in");
        self.state = SessionState::signed_in(user);
        Ok(())
    }

    /// Sign out. Safe to call in any state; repeated calls change nothing.
    pub fn logout(&mut self) {
        let was_signed_in = self.is_authenticated();

        self.state = SessionState::signed_out(Universe::SignedOut.default_view(), String::new());
        self.auth.clear();
        discard(self.store.as_ref());
        self.strip_reset_path();

        if was_signed_in {
            tracing::info!("signed out");
        }
    }

    /// Switch to `target` if it belongs to the current universe.
    ///
    /// Returns whether the view changed hands; out-of-universe targets are ignored.
    pub fn navigate(&mut self, target: View) -> bool {
        if target.universe() != self.universe() {
            tracing::debug!(%target, current = %self.view(), "ignoring navigation outside the current universe");
            return false;
        }
        match &mut self.state {
            SessionState::Authenticated { view, .. } | SessionState::Unauthenticated { view, .. } => {
                *view = target;
            }
        }
        true
    }

    pub fn begin_forgot_flow(&mut self) -> bool {
        self.with_signed_out(|view, _| *view = View::Forgot)
    }

    pub fn begin_reset_flow(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        self.with_signed_out(move |view, reset_token| {
            *view = View::Reset;
            *reset_token = token;
        })
    }

    /// Replace the reset token (the reset screen lets the user retype it).
    pub fn set_reset_token(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        self.with_signed_out(move |_, reset_token| *reset_token = token)
    }

    /// Leave the forgot/reset flow: back to login with no token and no reset path.
    pub fn back_to_login(&mut self) -> bool {
        let changed = self.with_signed_out(|view, reset_token| {
            *view = View::Login;
            reset_token.clear();
        });
        if changed {
            self.strip_reset_path();
        }
        changed
    }

    fn with_signed_out(&mut self, f: impl FnOnce(&mut View, &mut String)) -> bool {
        match &mut self.state {
            SessionState::Unauthenticated { view, reset_token } => {
                f(view, reset_token);
                true
            }
            SessionState::Authenticated { .. } => false,
        }
    }

    fn strip_reset_path(&self) {
        if resolver::is_reset_path(&self.location.current()) {
            self.location.replace_path("/");
        }
    }
}

fn discard(store: &dyn SessionStore) {
    if let Err(err) = store.clear() {
        tracing::warn!("failed to clear stored session: {err}");
    }
}
