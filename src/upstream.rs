//! The host's `fetch` binding: forward to an upstream with `reqwest`, or
//! echo when no upstream is configured.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;

use edgehook_core::config::host::HostConfig;
use edgehook_core::error::{AppError, ErrorKind};
use edgehook_core::AppResult;
use edgehook_engine::hooks::async_fn;
use edgehook_engine::runtime::{FetchFn, Request, Response, Scope};

/// Builds the `fetch` binding described by `config`.
pub fn fetch_binding(config: &HostConfig) -> AppResult<FetchFn> {
    let Some(upstream) = config.upstream.as_deref() else {
        tracing::info!("No upstream configured, fetch echoes requests");
        return Ok(echo());
    };

    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()
        .map_err(|e| AppError::with_source(ErrorKind::Network, "Failed to build HTTP client", e))?;
    let base = upstream.trim_end_matches('/').to_string();
    tracing::info!(upstream = %base, "Forwarding fetch to upstream");

    Ok(async_fn(move |_: Scope, (request,): (Request,)| {
        let client = client.clone();
        let url = resolve(&base, &request.url);
        async move { forward(client, url, request).await }
    }))
}

fn echo() -> FetchFn {
    async_fn(|_: Scope, (request,): (Request,)| async move {
        let body = if request.body.is_empty() {
            Bytes::from(format!("{} {}", request.method, request.url))
        } else {
            request.body.clone()
        };
        Ok(Response::ok(body)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_header("x-echo-method", request.method))
    })
}

/// Rebases the path and query of `url` onto `base`.
fn resolve(base: &str, url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            let mut target = format!("{base}{}", parsed.path());
            if let Some(query) = parsed.query() {
                target.push('?');
                target.push_str(query);
            }
            target
        }
        Err(_) => format!("{base}/{}", url.trim_start_matches('/')),
    }
}

async fn forward(client: Client, url: String, request: Request) -> AppResult<Response> {
    let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|e| {
        AppError::validation(format!("Invalid method '{}': {}", request.method, e))
    })?;

    let mut builder = client.request(method, &url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !request.body.is_empty() {
        builder = builder.body(request.body);
    }

    let upstream = builder.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            format!("Upstream request to {url} timed out")
        } else {
            format!("Upstream request to {url} failed")
        };
        AppError::with_source(ErrorKind::Network, message, e)
    })?;

    let status = upstream.status().as_u16();
    let headers = upstream
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = upstream.bytes().await.map_err(|e| {
        AppError::with_source(ErrorKind::Network, "Failed to read upstream body", e)
    })?;

    Ok(Response {
        status,
        headers,
        body,
    })
}
