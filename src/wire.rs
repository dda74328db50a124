//! Line-delimited JSON records exchanged on stdin/stdout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use edgehook_core::error::{AppError, ErrorKind};
use edgehook_engine::runtime::{Request, Response};

/// One incoming request.
#[derive(Debug, Deserialize)]
pub struct WireRequest {
    /// Opaque correlation value, echoed back.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// UTF-8 request body.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl WireRequest {
    pub fn into_request(self) -> Request {
        let mut request = Request::new(self.method, self.url);
        for (name, value) in self.headers {
            request = request.with_header(name, value);
        }
        if let Some(body) = self.body {
            request = request.with_body(body);
        }
        request
    }
}

/// One outgoing response.
#[derive(Debug, Serialize)]
pub struct WireResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
}

impl WireResponse {
    pub fn from_response(id: Option<serde_json::Value>, response: Response) -> Self {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in &response.headers {
            headers
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        Self {
            id,
            status: response.status,
            body: response.text(),
            headers,
        }
    }
}

/// A request that produced no response.
#[derive(Debug, Serialize)]
pub struct WireError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub error: ErrorKind,
    pub message: String,
}

impl WireError {
    pub fn new(id: Option<serde_json::Value>, err: &AppError) -> Self {
        Self {
            id,
            error: err.kind,
            message: err.message.clone(),
        }
    }
}
