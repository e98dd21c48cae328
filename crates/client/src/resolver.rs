//! Boot-time classification of the start location.
//!
//! A password-reset link can carry its token either as a path segment
//! (`/reset-password/<token>`) or as a query parameter (`?reset_token=<token>`).
//! This runs once when the client starts; in-app navigation never re-runs it.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::session::View;

pub const RESET_PATH_PREFIX: &str = "/reset-password/";
pub const RESET_TOKEN_PARAM: &str = "reset_token";

/// Outcome of resolving the start location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub initial_token: String,
    /// View to open when nobody is signed in: `Reset` iff a token was found.
    pub initial_view: View,
}

impl RouteInfo {
    fn from_token(token: String) -> Self {
        let initial_view = if token.is_empty() {
            View::Login
        } else {
            View::Reset
        };
        Self {
            initial_token: token,
            initial_view,
        }
    }
}

/// Resolve the reset token and initial unauthenticated view from a location.
///
/// Priority: path segment, then query parameter, then nothing. Never fails:
/// a segment that does not decode to UTF-8 is used as-is.
pub fn resolve(location: &str) -> RouteInfo {
    let (path, query) = split_location(location);

    if let Some(segment) = reset_segment(&path) {
        return RouteInfo::from_token(decode_segment(segment));
    }

    let token = query
        .as_deref()
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(k, v)| k == RESET_TOKEN_PARAM && !v.is_empty())
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_default();

    RouteInfo::from_token(token)
}

/// Whether the location still shows a reset link path.
pub fn is_reset_path(location: &str) -> bool {
    let (path, _) = split_location(location);
    path.starts_with(RESET_PATH_PREFIX.trim_end_matches('/'))
}

/// Split a location into its path and raw query.
///
/// Accepts full URLs as well as bare `path?query` forms.
pub fn split_location(location: &str) -> (String, Option<String>) {
    let base = Url::parse("http://localhost/").ok();
    let parsed = match base {
        Some(base) => base.join(location.trim()).ok(),
        None => None,
    };

    match parsed {
        Some(url) => (url.path().to_string(), url.query().map(str::to_string)),
        None => {
            let without_fragment = location.split('#').next().unwrap_or_default();
            match without_fragment.split_once('?') {
                Some((path, query)) => (path.to_string(), Some(query.to_string())),
                None => (without_fragment.to_string(), None),
            }
        }
    }
}

fn reset_segment(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(RESET_PATH_PREFIX)?;
    rest.rsplit('/').next().filter(|seg| !seg.is_empty())
}

fn decode_segment(segment: &str) -> String {
    match percent_decode_str(segment).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            tracing::warn!("reset link segment is not valid UTF-8 once decoded; using it verbatim");
            segment.to_string()
        }
    }
}
