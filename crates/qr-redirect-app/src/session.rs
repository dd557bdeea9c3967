//! One resolver session per page load: gate, classification, presentation
//! and the redirect race, in that order.

use std::sync::Arc;

use qr_redirect_classifier::{parse_content, resolve_kind};
use qr_redirect_core::{AccessGateState, ContentKind, GateStatus, QrPayload, RedirectProgress};
use qr_redirect_gate::{AccessGate, Denied, GateError, PasswordVerifier, Unlocked};
use qr_redirect_presenter::{PresenterSelection, dispatch};
use qr_redirect_race::{AppHandoffSignal, Navigator, RaceState, RedirectRaceController};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{APP_VERSION, AppError, ResolverConfig};

/// External collaborators a session talks to.
#[derive(Clone)]
pub struct SessionCollaborators {
    /// Browser navigation sink.
    pub navigator: Arc<dyn Navigator>,
    /// App handoff heuristic.
    pub handoff_signal: Arc<dyn AppHandoffSignal>,
    /// Password verification backend.
    pub verifier: Arc<dyn PasswordVerifier>,
}

/// Verifier for deployments that serve no protected payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableVerifier;

impl PasswordVerifier for UnavailableVerifier {
    fn verify(&self, _qr_id: Option<&str>, _password: &str) -> Result<bool, GateError> {
        Err(GateError::Transport(
            "no password verifier configured".to_string(),
        ))
    }
}

/// Serializable snapshot of a session for logging, the CLI and contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// App version.
    pub version: String,
    /// Gate status.
    pub gate_status: GateStatus,
    /// Inline gate error, if any.
    pub gate_error: Option<String>,
    /// Resolved kind; absent while locked.
    pub kind: Option<ContentKind>,
    /// Presenter selection; absent while locked.
    pub selection: Option<PresenterSelection>,
    /// Redirect race state.
    pub race_state: RaceState,
    /// Redirect progress.
    pub progress: RedirectProgress,
}

/// Resolver session.
///
/// Content is never classified while the gate is locked or challenging.
pub struct ResolverSession {
    payload: QrPayload,
    gate: AccessGate,
    verifier: Arc<dyn PasswordVerifier>,
    race: RedirectRaceController,
    selection: Option<PresenterSelection>,
    torn_down: bool,
}

impl ResolverSession {
    /// Creates a session for `payload`.
    ///
    /// # Errors
    /// Returns [`AppError::Race`] when the configured timings are invalid.
    pub fn new(
        payload: QrPayload,
        config: &ResolverConfig,
        collaborators: SessionCollaborators,
    ) -> Result<Self, AppError> {
        let race = RedirectRaceController::new(
            config.race_config()?,
            collaborators.navigator,
            collaborators.handoff_signal,
        );
        debug!(
            declared = %payload.declared_type,
            protected = payload.is_password_protected,
            "resolver session created"
        );

        Ok(Self {
            gate: AccessGate::new(payload.is_password_protected),
            payload,
            verifier: collaborators.verifier,
            race,
            selection: None,
            torn_down: false,
        })
    }

    /// Input payload.
    pub fn payload(&self) -> &QrPayload {
        &self.payload
    }

    /// Gate snapshot for rendering the prompt.
    pub fn gate_state(&self) -> &AccessGateState {
        self.gate.state()
    }

    /// Shows the password prompt.
    pub fn begin_challenge(&mut self) {
        self.gate.begin_challenge();
    }

    /// Mirrors the password field.
    pub fn set_password_input(&mut self, input: impl Into<String>) {
        self.gate.set_input(input);
    }

    /// Submits a password attempt.
    ///
    /// # Errors
    /// Returns [`Denied`] when the attempt is rejected; retry is always allowed.
    pub fn submit_password(&mut self, password: &str) -> Result<Unlocked, Denied> {
        let qr_id = self.payload.qr_id.clone();
        self.gate
            .submit(self.verifier.as_ref(), qr_id.as_deref(), password)
    }

    /// Classifies and selects a presenter once unlocked.
    ///
    /// Returns `None` while the gate is not unlocked. The selection is a pure
    /// function of the payload, so repeated calls return the same value.
    pub fn resolve(&mut self) -> Option<&PresenterSelection> {
        if !self.gate.is_unlocked() {
            return None;
        }

        if self.selection.is_none() {
            let kind = resolve_kind(&self.payload);
            let parsed = parse_content(kind, &self.payload.raw_content);
            let selection = dispatch(kind, parsed);
            info!(kind = %selection.kind(), "payload resolved");
            self.selection = Some(selection);
        }

        self.selection.as_ref()
    }

    /// Starts the redirect race for URL content.
    ///
    /// Returns `None` when the content is locked, not a URL, or the session
    /// was torn down. Once a race exists for the target, repeated calls return
    /// its current state and navigate nowhere.
    pub fn begin_redirect(&mut self, now_ms: u64) -> Option<RaceState> {
        if self.torn_down {
            return None;
        }
        let target = self.resolve()?.redirect_target()?.clone();

        let state = self.race.state();
        if state != RaceState::Idle && self.race.target() == Some(&target) {
            debug!(?state, "redirect already started for target");
            return Some(state);
        }
        Some(self.race.start(target, now_ms))
    }

    /// Scheduled callback from the host loop.
    pub fn poll(&mut self, now_ms: u64) -> RaceState {
        self.race.poll(now_ms)
    }

    /// When the host should poll next, if a race is pending.
    pub fn next_poll_at(&self, now_ms: u64) -> Option<u64> {
        self.race.next_poll_at(now_ms)
    }

    /// Redirect progress for UI feedback.
    pub fn progress(&mut self, now_ms: u64) -> RedirectProgress {
        self.race.progress(now_ms)
    }

    /// Race state.
    pub fn race_state(&self) -> RaceState {
        self.race.state()
    }

    /// Cancels pending work. No navigation happens afterwards.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.race.teardown();
    }

    /// Snapshot of the session at `now_ms`.
    pub fn report(&mut self, now_ms: u64) -> ResolutionReport {
        let selection = self.resolve().cloned();
        let state = self.gate.state();
        ResolutionReport {
            version: APP_VERSION.to_string(),
            gate_status: state.status,
            gate_error: state.last_error.clone(),
            kind: selection.as_ref().map(PresenterSelection::kind),
            selection,
            race_state: self.race.state(),
            progress: self.race.progress(now_ms),
        }
    }
}
