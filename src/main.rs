//! EdgeHook host harness
//!
//! Runs a worker against an in-process host: installs the hook engine,
//! registers the configured observers and a proxy listener, then answers
//! one JSON request per stdin line with one JSON response per stdout line.

mod upstream;
mod wire;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt};

use edgehook_core::config::AppConfig;
use edgehook_core::error::AppError;
use edgehook_engine::hooks::sync_fn;
use edgehook_engine::runtime::{Event, EventListener, FETCH_EVENT, ResponseFuture, Scope};
use edgehook_engine::{MemoryHost, RuntimeAdapter, bootstrap, observers};

use crate::wire::{WireError, WireRequest, WireResponse};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("EDGEHOOK_CONFIG").unwrap_or_else(|_| "config/edgehook.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging. Logs go to stderr; stdout carries responses.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EdgeHook host v{}", env!("CARGO_PKG_VERSION"));

    let host = MemoryHost::new(upstream::fetch_binding(&config.host)?);
    let adapter = RuntimeAdapter::new(host.bindings(), config.runtime_env());

    let worker = bootstrap(
        |adapter: &RuntimeAdapter| {
            let slots = observers::register(adapter.hooks(), &config.observers);
            tracing::info!(slots, "Observers registered");
            Ok(())
        },
        register_proxy,
    );
    worker(&adapter)?;

    serve_stdin(&host).await
}

/// The payload: answer every fetch event by forwarding its request through
/// the current `fetch` binding.
fn register_proxy(adapter: &RuntimeAdapter) -> Result<(), AppError> {
    let fetch = adapter.bindings().fetch;
    let listener: EventListener = sync_fn(move |_: &Scope, (event,): (Event,)| {
        if let Event::Fetch(fetch_event) = event {
            let request = fetch_event.request().clone();
            let fetch = fetch.clone();
            fetch_event.respond_with(ResponseFuture::new(async move {
                fetch(Scope::GLOBAL, (request,)).await
            }))?;
        }
        Ok(())
    });
    adapter.add_event_listener(FETCH_EVENT, listener)
}

async fn serve_stdin(host: &MemoryHost) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<WireRequest>(&line) {
            Ok(wire) => {
                let id = wire.id.clone();
                match host.dispatch_fetch(wire.into_request()).await {
                    Ok(response) => {
                        serde_json::to_string(&WireResponse::from_response(id, response))?
                    }
                    Err(e) => {
                        tracing::warn!(kind = %e.kind, error = %e.message, "Request failed");
                        serde_json::to_string(&WireError::new(id, &e))?
                    }
                }
            }
            Err(e) => {
                let e = AppError::from(e);
                tracing::warn!(error = %e.message, "Malformed request line");
                serde_json::to_string(&WireError::new(None, &e))?
            }
        };

        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        handled += 1;
    }

    tracing::info!(handled, "Input closed, shutting down");
    Ok(())
}
