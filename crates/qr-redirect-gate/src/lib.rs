#![warn(missing_docs)]
//! # qr-redirect-gate
//!
//! ## Purpose
//! Implements the password challenge guarding protected QR content.
//!
//! ## Responsibilities
//! - Model gate transitions (`locked -> challenging -> unlocked`).
//! - Delegate password checks to an injectable [`PasswordVerifier`].
//! - Validate the verification endpoint policy (HTTPS, fixed path).
//!
//! ## Data flow
//! View collects the password -> [`AccessGate::submit`] -> [`PasswordVerifier`]
//! (usually [`VerifyClient`] over a [`VerifyTransport`]) -> gate state update.
//!
//! ## Ownership and lifetimes
//! The gate owns its typed input and error message so the view can re-render
//! from a snapshot at any time.
//!
//! ## Error model
//! A rejected password is a [`Denied`] outcome, not an error: the gate stays
//! open for retry. Verifier failures are folded into `Denied` with a retry
//! message. [`GateError`] is reserved for construction-time policy checks
//! and transport plumbing.
//!
//! ## Security and privacy notes
//! The gate holds no secret material and never logs password values.
//! Attempts are not rate limited here.
//!
//! ## Example
//! ```rust
//! use qr_redirect_core::GateStatus;
//! use qr_redirect_gate::AccessGate;
//!
//! let gate = AccessGate::new(true);
//! assert_eq!(gate.status(), GateStatus::Locked);
//! ```

use std::sync::Arc;

use qr_redirect_core::{AccessGateState, FallbackReason, GateStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Required verification path suffix.
pub const REQUIRED_VERIFY_PATH: &str = "/api/qr/verify-password";

/// Message shown for a rejected password.
pub const INCORRECT_PASSWORD_MESSAGE: &str = "Incorrect password. Please try again.";

/// Message shown for a blank submission.
pub const EMPTY_PASSWORD_MESSAGE: &str = "Please enter the password.";

/// Message shown when the verifier cannot be reached.
pub const VERIFY_UNAVAILABLE_MESSAGE: &str = "Unable to verify the password right now. Please try again.";

/// Successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unlocked {
    /// `true` only for the submission that performed the unlock.
    pub first_unlock: bool,
}

/// Rejected submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denied {
    /// User-facing message, also stored as the gate's `last_error`.
    pub message: String,
    /// Degradation category.
    pub reason: FallbackReason,
}

/// Server-side password check.
pub trait PasswordVerifier: Send + Sync {
    /// Returns `Ok(true)` when `password` matches the secret for `qr_id`.
    ///
    /// # Errors
    /// Returns [`GateError`] when the check could not be performed.
    fn verify(&self, qr_id: Option<&str>, password: &str) -> Result<bool, GateError>;
}

/// Password challenge state machine for one resolver session.
#[derive(Debug, Clone)]
pub struct AccessGate {
    state: AccessGateState,
}

impl AccessGate {
    /// Creates a gate; unprotected content starts `Unlocked`.
    pub fn new(is_password_protected: bool) -> Self {
        Self {
            state: AccessGateState::initial(is_password_protected),
        }
    }

    /// Current status.
    pub fn status(&self) -> GateStatus {
        self.state.status
    }

    /// Full state snapshot for rendering.
    pub fn state(&self) -> &AccessGateState {
        &self.state
    }

    /// Returns `true` once content may be disclosed.
    pub fn is_unlocked(&self) -> bool {
        self.state.status == GateStatus::Unlocked
    }

    /// Shows the prompt: `Locked -> Challenging`. No-op in other states.
    pub fn begin_challenge(&mut self) {
        if self.state.status == GateStatus::Locked {
            self.state.status = GateStatus::Challenging;
        }
    }

    /// Mirrors the password field contents. Ignored once unlocked.
    pub fn set_input(&mut self, input: impl Into<String>) {
        if !self.is_unlocked() {
            self.state.attempt_input = input.into();
        }
    }

    /// Submits the current field contents.
    ///
    /// # Errors
    /// See [`submit`](Self::submit).
    pub fn submit_current(
        &mut self,
        verifier: &dyn PasswordVerifier,
        qr_id: Option<&str>,
    ) -> Result<Unlocked, Denied> {
        let password = self.state.attempt_input.clone();
        self.submit(verifier, qr_id, &password)
    }

    /// Submits a password attempt.
    ///
    /// Once unlocked, further submissions succeed with `first_unlock == false`
    /// and do not reach the verifier.
    ///
    /// # Errors
    /// Returns [`Denied`] for blank input, a wrong password, or a verifier
    /// failure. The typed input is kept and retries are unlimited.
    pub fn submit(
        &mut self,
        verifier: &dyn PasswordVerifier,
        qr_id: Option<&str>,
        password: &str,
    ) -> Result<Unlocked, Denied> {
        if self.is_unlocked() {
            return Ok(Unlocked {
                first_unlock: false,
            });
        }

        self.begin_challenge();
        self.state.attempt_input = password.to_string();

        if password.trim().is_empty() {
            return Err(self.deny(EMPTY_PASSWORD_MESSAGE));
        }

        match verifier.verify(qr_id, password) {
            Ok(true) => {
                info!("access gate unlocked");
                self.state.status = GateStatus::Unlocked;
                self.state.attempt_input.clear();
                self.state.last_error = None;
                Ok(Unlocked { first_unlock: true })
            }
            Ok(false) => {
                info!(reason = ?FallbackReason::PasswordDenied, "password rejected");
                Err(self.deny(INCORRECT_PASSWORD_MESSAGE))
            }
            Err(error) => {
                warn!(%error, "password verification unavailable");
                Err(self.deny(VERIFY_UNAVAILABLE_MESSAGE))
            }
        }
    }

    fn deny(&mut self, message: &str) -> Denied {
        self.state.status = GateStatus::Challenging;
        self.state.last_error = Some(message.to_string());
        Denied {
            message: message.to_string(),
            reason: FallbackReason::PasswordDenied,
        }
    }
}

/// Verification request forwarded to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// QR record id, when the payload carries one.
    pub qr_id: Option<String>,
    /// Submitted password.
    pub password: String,
}

/// Verification response returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether the password matched.
    pub valid: bool,
}

/// Abstract transport used by [`VerifyClient`].
pub trait VerifyTransport: Send + Sync {
    /// Sends a verification request to the backend.
    ///
    /// # Errors
    /// Returns [`GateError::Transport`] on network or server failure.
    fn send(&self, endpoint: &str, request: &VerifyRequest) -> Result<VerifyResponse, GateError>;
}

/// Verifier backed by the QR service's password endpoint.
#[derive(Clone)]
pub struct VerifyClient {
    endpoint: String,
    transport: Arc<dyn VerifyTransport>,
}

impl VerifyClient {
    /// Creates a validated client.
    ///
    /// # Errors
    /// Returns [`GateError::InvalidEndpoint`] when the URL is not HTTPS or does
    /// not end with [`REQUIRED_VERIFY_PATH`].
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn VerifyTransport>,
    ) -> Result<Self, GateError> {
        let endpoint = endpoint.into();
        validate_verify_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PasswordVerifier for VerifyClient {
    fn verify(&self, qr_id: Option<&str>, password: &str) -> Result<bool, GateError> {
        let response = self.transport.send(
            &self.endpoint,
            &VerifyRequest {
                qr_id: qr_id.map(str::to_string),
                password: password.to_string(),
            },
        )?;
        Ok(response.valid)
    }
}

/// Validates the verification endpoint policy.
///
/// # Errors
/// Returns [`GateError::InvalidEndpoint`] for non-HTTPS URLs or path mismatch.
pub fn validate_verify_endpoint(endpoint: &str) -> Result<(), GateError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| GateError::InvalidEndpoint(format!("invalid verify url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(GateError::InvalidEndpoint(
            "verify endpoint must use https".to_string(),
        ));
    }

    if !parsed.path().ends_with(REQUIRED_VERIFY_PATH) {
        return Err(GateError::InvalidEndpoint(format!(
            "verify endpoint path must end with {REQUIRED_VERIFY_PATH}"
        )));
    }

    Ok(())
}

/// Errors produced by verifier construction and transport.
#[derive(Debug, Error)]
pub enum GateError {
    /// Endpoint violates policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Transport failure from the verification backend.
    #[error("verify transport failure: {0}")]
    Transport(String),
}
