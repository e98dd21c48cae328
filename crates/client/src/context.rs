//! Shared identity state read by the gateway and written by the session.

use std::sync::Arc;

use parking_lot::RwLock;

use assetctl_auth::AuthHeaders;

/// Point-in-time view of the identity used to dispatch one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub headers: Option<AuthHeaders>,
    pub epoch: u64,
}

#[derive(Debug, Default)]
struct AuthState {
    headers: Option<AuthHeaders>,
    epoch: u64,
}

/// Handle to the current identity headers plus a session epoch.
///
/// Cheap to clone; all clones observe the same state. Only the session state
/// machine (in this crate) can change it. The epoch increments every time the
/// identity changes, so a response can be matched against the identity it was
/// requested under.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    inner: Arc<RwLock<AuthState>>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        let state = self.inner.read();
        AuthSnapshot {
            headers: state.headers.clone(),
            epoch: state.epoch,
        }
    }

    pub fn headers(&self) -> Option<AuthHeaders> {
        self.inner.read().headers.clone()
    }

    pub fn epoch(&self) -> u64 {
        self.inner.read().epoch
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().headers.is_some()
    }

    pub(crate) fn install(&self, headers: AuthHeaders) {
        let mut state = self.inner.write();
        state.headers = Some(headers);
        state.epoch += 1;
    }

    /// Drop the identity. Returns whether anything was installed.
    pub(crate) fn clear(&self) -> bool {
        let mut state = self.inner.write();
        if state.headers.take().is_some() {
            state.epoch += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetctl_auth::{ClientKind, Role, User};
    use assetctl_core::UserId;

    fn headers() -> AuthHeaders {
        let user = User {
            id: UserId::new(4),
            username: "x".to_string(),
            display_name: String::new(),
            email: None,
            role: Role::User,
            active: true,
        };
        AuthHeaders::for_user(&user, ClientKind::React)
    }

    #[test]
    fn clones_share_state() {
        let ctx = AuthContext::new();
        let reader = ctx.clone();
        ctx.install(headers());
        assert!(reader.is_authenticated());
        assert_eq!(reader.epoch(), 1);
    }

    #[test]
    fn clearing_twice_bumps_epoch_once() {
        let ctx = AuthContext::new();
        ctx.install(headers());
        assert!(ctx.clear());
        assert!(!ctx.clear());
        assert_eq!(ctx.epoch(), 2);
        assert_eq!(ctx.snapshot(), AuthSnapshot { headers: None, epoch: 2 });
    }
}
