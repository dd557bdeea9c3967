#![warn(missing_docs)]
//! # qr-redirect-app
//!
//! ## Purpose
//! Orchestrates the access gate, classifier, presenter dispatch and redirect
//! race for `qr-redirect`.
//!
//! ## Responsibilities
//! - Enforce gate-before-classification ordering in [`ResolverSession`].
//! - Load [`ResolverConfig`] from JSON and `QR_REDIRECT_*` env vars.
//! - Install structured logging and keep secrets out of log text.
//!
//! ## Data flow
//! [`QrPayload`] -> [`ResolverSession`] (gate -> classify -> dispatch) ->
//! presenter selection, or redirect race -> navigation.
//!
//! ## Ownership and lifetimes
//! A session owns its gate, cached selection and race controller; no state is
//! shared between sessions.
//!
//! ## Error model
//! Resolution itself degrades instead of failing. Configuration, payload
//! decoding and verifier construction failures are wrapped in [`AppError`].
//!
//! ## Security and privacy notes
//! - Password values are never logged.
//! - [`redact_sensitive`] strips password/token markers from log text.

mod config;
mod session;

pub use config::{
    ENV_FALLBACK_TIMEOUT_MS, ENV_LOG_LEVEL, ENV_NATIVE_ON_DESKTOP, ENV_PLATFORM,
    ENV_PROGRESS_INTERVAL_MS, ENV_VERIFY_ENDPOINT, ResolverConfig,
};
pub use session::{ResolutionReport, ResolverSession, SessionCollaborators, UnavailableVerifier};

use qr_redirect_core::{CoreError, QrPayload};
use qr_redirect_gate::GateError;
use qr_redirect_race::RaceError;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("QR_REDIRECT_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Decodes a payload handed over by the fetch service.
///
/// # Errors
/// Returns [`AppError::Core`] when the JSON is malformed.
pub fn decode_payload(raw: &[u8]) -> Result<QrPayload, AppError> {
    Ok(QrPayload::from_json_bytes(raw)?)
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_level`; an unparsable level falls back to
/// `warn`. Calling twice is harmless.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Redacts common secret markers in log-safe output.
///
/// Everything after the first marker is dropped, since its extent cannot be
/// known reliably.
pub fn redact_sensitive(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let first_marker = ["password", "passwd", "token", "authorization", "bearer"]
        .iter()
        .filter_map(|key| lower.find(key).map(|position| (position, *key)))
        .min_by_key(|(position, _)| *position);

    match first_marker {
        Some((position, key)) => format!("{}{key}=<redacted>", &input[..position]),
        None => input.to_string(),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Payload decoding error.
    #[error("payload error: {0}")]
    Core(#[from] CoreError),
    /// Verifier construction or transport error.
    #[error("gate error: {0}")]
    Gate(#[from] GateError),
    /// Invalid race timings.
    #[error("race config error: {0}")]
    Race(#[from] RaceError),
    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
    /// Malformed JSON config.
    #[error("config decode failure: {0}")]
    Json(#[from] serde_json::Error),
    /// Config file could not be read.
    #[error("config io failure: {0}")]
    Io(#[from] std::io::Error),
}
