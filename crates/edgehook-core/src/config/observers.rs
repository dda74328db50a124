//! Built-in observer hook configuration.

use serde::{Deserialize, Serialize};

/// Selects which tracing observers are registered after installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Log every `addEventListener` registration.
    #[serde(default)]
    pub add_event_listener: bool,
    /// Log outbound `fetch` requests and their status.
    #[serde(default = "default_true")]
    pub fetch: bool,
    /// Log responses passed to `event.respondWith`.
    #[serde(default = "default_true")]
    pub respond_with: bool,
    /// Log `crypto.subtle.encrypt` / `decrypt` calls.
    #[serde(default)]
    pub crypto: bool,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            add_event_listener: false,
            fetch: true,
            respond_with: true,
            crypto: false,
        }
    }
}

fn default_true() -> bool {
    true
}
