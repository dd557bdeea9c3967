#![warn(missing_docs)]
//! # qr-redirect binary
//!
//! Resolves one scanned payload from the command line and prints the
//! resolution report as JSON. The redirect race runs on a simulated clock,
//! so navigations are reported instead of performed.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use qr_redirect_app::{
    APP_VERSION, AppError, ResolutionReport, ResolverConfig, ResolverSession,
    SessionCollaborators, UnavailableVerifier, decode_payload, init_logging, redact_sensitive,
};
use qr_redirect_core::{ContentKind, GateStatus, QrPayload};
use qr_redirect_gate::{
    GateError, PasswordVerifier, VerifyClient, VerifyRequest, VerifyResponse, VerifyTransport,
};
use qr_redirect_race::{ClientPlatform, Navigator, RaceState, VisibilityTracker};
use serde::Serialize;
use tracing::{debug, error, info};

/// Exit code when the gate stays locked after all attempts.
const EXIT_LOCKED: u8 = 3;

/// Endpoint reported to the simulated backend when none is configured.
const LOCAL_VERIFY_ENDPOINT: &str = "https://localhost/api/qr/verify-password";

/// Resolve a scanned QR payload.
#[derive(Debug, Parser)]
#[command(name = "qr-redirect", version = APP_VERSION)]
struct Cli {
    /// Decoded QR content.
    content: Option<String>,

    /// Read a JSON payload (`raw_content`, `declared_type`, ...) instead.
    #[arg(long, conflicts_with = "content")]
    payload_file: Option<PathBuf>,

    /// Declared content type hint.
    #[arg(long, default_value = "text", value_parser = parse_kind)]
    declared_type: ContentKind,

    /// Treat the content as password protected.
    #[arg(long)]
    protected: bool,

    /// Secret the simulated verifier accepts.
    #[arg(long)]
    secret: Option<String>,

    /// Password attempt; repeat for several attempts in order.
    #[arg(long = "password")]
    passwords: Vec<String>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Client platform override (android, ios, desktop).
    #[arg(long, value_parser = parse_platform)]
    platform: Option<ClientPlatform>,

    /// Fallback timeout override in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Simulate the page being backgrounded and restored at this time.
    #[arg(long)]
    simulate_handoff_at_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CliOutput {
    navigations: Vec<String>,
    report: ResolutionReport,
}

#[derive(Debug, Default)]
struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, uri: &str) {
        info!(uri, "navigate");
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(uri.to_string());
        }
    }
}

/// In-process stand-in for the verify-password endpoint.
struct SimulatedBackend {
    secret: String,
}

impl VerifyTransport for SimulatedBackend {
    fn send(&self, endpoint: &str, request: &VerifyRequest) -> Result<VerifyResponse, GateError> {
        debug!(endpoint, qr_id = ?request.qr_id, "simulated password check");
        Ok(VerifyResponse {
            valid: request.password == self.secret,
        })
    }
}

fn parse_kind(value: &str) -> Result<ContentKind, String> {
    serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase()))
        .map_err(|_| format!("unknown content type `{value}`"))
}

fn parse_platform(value: &str) -> Result<ClientPlatform, String> {
    ClientPlatform::parse(value).ok_or_else(|| format!("unknown platform `{value}`"))
}

fn load_config(cli: &Cli) -> Result<ResolverConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => ResolverConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => ResolverConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(platform) = cli.platform {
        config.client_platform = platform;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.fallback_timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

fn load_payload(cli: &Cli) -> Result<QrPayload, AppError> {
    match (&cli.payload_file, &cli.content) {
        (Some(path), _) => decode_payload(&fs::read(path)?),
        (None, Some(content)) => Ok(QrPayload::new(
            content.as_str(),
            cli.declared_type,
            cli.protected,
        )),
        (None, None) => Err(AppError::Config(
            "either CONTENT or --payload-file is required".to_string(),
        )),
    }
}

fn run(cli: &Cli, config: &ResolverConfig) -> Result<CliOutput, AppError> {
    let payload = load_payload(cli)?;
    debug!(content = %redact_sensitive(&payload.raw_content), "loaded payload");

    let navigator = Arc::new(RecordingNavigator::default());
    let tracker = Arc::new(VisibilityTracker::new());
    let verifier: Arc<dyn PasswordVerifier> = match &cli.secret {
        Some(secret) => {
            let endpoint = config
                .verify_endpoint
                .as_deref()
                .unwrap_or(LOCAL_VERIFY_ENDPOINT);
            let backend = Arc::new(SimulatedBackend {
                secret: secret.clone(),
            });
            Arc::new(VerifyClient::new(endpoint, backend)?)
        }
        None => Arc::new(UnavailableVerifier),
    };

    let mut session = ResolverSession::new(
        payload,
        config,
        SessionCollaborators {
            navigator: navigator.clone(),
            handoff_signal: tracker.clone(),
            verifier,
        },
    )?;

    if session.gate_state().status != GateStatus::Unlocked {
        session.begin_challenge();
        for password in &cli.passwords {
            match session.submit_password(password) {
                Ok(_) => break,
                Err(denied) => info!(message = %denied.message, "password attempt denied"),
            }
        }
    }

    let mut now_ms = 0;
    let mut handoff_recorded = false;
    if session.begin_redirect(now_ms) == Some(RaceState::Attempting) {
        while let Some(next_ms) = session.next_poll_at(now_ms) {
            now_ms = next_ms;
            if let Some(hidden_at) = cli.simulate_handoff_at_ms
                && !handoff_recorded
                && hidden_at <= now_ms
            {
                tracker.record_hidden(hidden_at);
                tracker.record_visible(now_ms);
                handoff_recorded = true;
            }
            session.poll(now_ms);
        }
    }

    let report = session.report(now_ms);
    session.teardown();

    Ok(CliOutput {
        navigations: navigator.visited(),
        report,
    })
}

/// CLI entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("invalid configuration: {error}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config.log_level);

    match run(&cli, &config) {
        Ok(output) => {
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{json}"),
                Err(error) => {
                    error!(%error, "failed to encode report");
                    return ExitCode::FAILURE;
                }
            }
            if output.report.gate_status == GateStatus::Unlocked {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_LOCKED)
            }
        }
        Err(error) => {
            error!(%error, "resolution failed");
            ExitCode::FAILURE
        }
    }
}
