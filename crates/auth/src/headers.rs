//! Identity headers attached to outbound requests.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::User;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const ROLE_HEADER: &str = "X-User-Role";
pub const CLIENT_HEADER: &str = "X-Client";

/// Client tag sent in `X-Client`.
///
/// The remote service keys its permission matrix on this tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    #[default]
    React,
    Python,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::React => "react",
            ClientKind::Python => "python",
        }
    }
}

impl FromStr for ClientKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "react" => Ok(ClientKind::React),
            "python" => Ok(ClientKind::Python),
            other => Err(format!("unknown client tag '{other}'")),
        }
    }
}

impl core::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headers derived from the signed-in user.
///
/// Never stored: always recomputed from the current [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    user_id: String,
    role: String,
    client: ClientKind,
}

impl AuthHeaders {
    pub fn for_user(user: &User, client: ClientKind) -> Self {
        Self {
            user_id: user.id.to_string(),
            role: user.role.as_str().to_ascii_lowercase(),
            client,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn client(&self) -> ClientKind {
        self.client
    }

    /// Header name/value pairs in a fixed order.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (USER_ID_HEADER, self.user_id.as_str()),
            (ROLE_HEADER, self.role.as_str()),
            (CLIENT_HEADER, self.client.as_str()),
        ]
    }
}
