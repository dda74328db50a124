//! Host harness configuration.

use serde::{Deserialize, Serialize};

/// Settings for the host bindings used by the `edgehook-host` harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Base URL that `fetch` forwards to. Requests are echoed when unset.
    #[serde(default)]
    pub upstream: Option<String>,
    /// Timeout applied to each upstream request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            upstream: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}
