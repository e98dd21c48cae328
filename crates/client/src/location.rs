//! The visible location of the client (path + query).

use parking_lot::Mutex;

/// Where the client currently "is", and a way to rewrite it in place.
///
/// `replace_path` changes what the user sees without reloading anything:
/// no state is re-resolved from the new location.
pub trait Location: Send + Sync {
    /// Current location as `path[?query]`, or a full URL.
    fn current(&self) -> String;

    /// Rewrite the visible location to `path`, dropping any query.
    fn replace_path(&self, path: &str);
}

/// In-process location, used by the CLI and by tests.
#[derive(Debug)]
pub struct MemoryLocation {
    href: Mutex<String>,
}

impl MemoryLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Mutex::new(href.into()),
        }
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Location for MemoryLocation {
    fn current(&self) -> String {
        self.href.lock().clone()
    }

    fn replace_path(&self, path: &str) {
        *self.href.lock() = path.to_string();
    }
}
