//! Shared fixtures for resolver integration tests.

use std::sync::{Arc, Mutex};

use qr_redirect_app::{ResolverConfig, ResolverSession, SessionCollaborators};
use qr_redirect_core::QrPayload;
use qr_redirect_gate::{GateError, PasswordVerifier};
use qr_redirect_race::{AppHandoffSignal, ClientPlatform, DisabledHandoffSignal, Navigator};

/// Navigator that records every URI it is asked to open.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// URIs navigated to so far, in order.
    #[allow(dead_code)]
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().expect("navigator lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, uri: &str) {
        self.visited
            .lock()
            .expect("navigator lock")
            .push(uri.to_string());
    }
}

/// Verifier accepting one secret and counting calls.
#[allow(dead_code)]
#[derive(Debug)]
pub struct CountingVerifier {
    secret: String,
    calls: Mutex<u32>,
}

impl CountingVerifier {
    /// Creates a verifier accepting `secret`.
    #[allow(dead_code)]
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            calls: Mutex::new(0),
        }
    }

    /// Number of verification requests received.
    #[allow(dead_code)]
    pub fn calls(&self) -> u32 {
        *self.calls.lock().expect("calls lock")
    }
}

impl PasswordVerifier for CountingVerifier {
    fn verify(&self, _qr_id: Option<&str>, password: &str) -> Result<bool, GateError> {
        *self.calls.lock().expect("calls lock") += 1;
        Ok(password == self.secret)
    }
}

/// Config with a 1s fallback window and 100ms polls on iOS.
#[allow(dead_code)]
pub fn fixture_config() -> ResolverConfig {
    ResolverConfig {
        fallback_timeout_ms: 1_000,
        progress_interval_ms: 100,
        client_platform: ClientPlatform::Ios,
        ..ResolverConfig::default()
    }
}

/// Builds a session with a disabled handoff signal.
#[allow(dead_code)]
pub fn fixture_session(
    payload: QrPayload,
    navigator: Arc<RecordingNavigator>,
    verifier: Arc<CountingVerifier>,
) -> ResolverSession {
    fixture_session_with_signal(payload, navigator, verifier, Arc::new(DisabledHandoffSignal))
}

/// Builds a session with a caller-provided handoff signal.
#[allow(dead_code)]
pub fn fixture_session_with_signal(
    payload: QrPayload,
    navigator: Arc<RecordingNavigator>,
    verifier: Arc<CountingVerifier>,
    handoff_signal: Arc<dyn AppHandoffSignal>,
) -> ResolverSession {
    ResolverSession::new(
        payload,
        &fixture_config(),
        SessionCollaborators {
            navigator,
            handoff_signal,
            verifier,
        },
    )
    .expect("session should build")
}
