#![warn(missing_docs)]
//! # qr-redirect-race
//!
//! ## Purpose
//! Races a native-app handoff against a bounded web fallback.
//!
//! ## Responsibilities
//! - Fire the native URI (or intent URI) without waiting for an outcome.
//! - Own the cancellable fallback timer for one resolver session.
//! - Treat a background/foreground round trip as a completed handoff.
//! - Report a monotonic progress ratio for UI feedback.
//!
//! ## Data flow
//! [`RedirectTarget`] -> [`RedirectRaceController::start`] -> host event loop
//! calls [`RedirectRaceController::poll`] -> [`Navigator`] receives the web
//! fallback when the timer fires.
//!
//! ## Ownership and lifetimes
//! The controller owns its [`FallbackTimer`]; there is no global scheduler.
//! Dropping or tearing down the controller drops the pending fallback with it.
//!
//! ## Error model
//! Only configuration can fail ([`RaceError`]). A native handoff has no
//! observable failure; the timeout fallback covers it.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//!
//! use qr_redirect_core::RedirectTarget;
//! use qr_redirect_race::{
//!     ClientPlatform, DisabledHandoffSignal, Navigator, RaceConfig, RaceState,
//!     RedirectRaceController,
//! };
//!
//! struct Ignore;
//! impl Navigator for Ignore {
//!     fn navigate(&self, _uri: &str) {}
//! }
//!
//! let config = RaceConfig::new(2_500, 50, ClientPlatform::Ios, false).unwrap();
//! let mut race =
//!     RedirectRaceController::new(config, Arc::new(Ignore), Arc::new(DisabledHandoffSignal));
//! let state = race.start(RedirectTarget::website("https://example.com"), 0);
//! assert_eq!(state, RaceState::Fallback);
//! ```

use std::sync::{Arc, Mutex};

use qr_redirect_core::{FallbackReason, RedirectProgress, RedirectTarget};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Default wait before falling back to the web URL.
pub const DEFAULT_FALLBACK_TIMEOUT_MS: u64 = 2_500;

/// Default cadence for progress polling.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 50;

/// Operating system family of the scanning client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientPlatform {
    /// Android; intent URIs are preferred when available.
    #[default]
    Android,
    /// iOS; custom schemes only.
    Ios,
    /// Desktop browsers.
    Desktop,
}

impl ClientPlatform {
    /// Parses a case-insensitive platform name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            "desktop" => Some(Self::Desktop),
            _ => None,
        }
    }
}

/// Race timing and platform policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceConfig {
    /// Wait before navigating to the web fallback.
    pub fallback_timeout_ms: u64,
    /// Suggested interval between host polls.
    pub progress_interval_ms: u64,
    /// Client platform.
    pub client_platform: ClientPlatform,
    /// Whether desktop clients also try the native URI.
    pub attempt_native_on_desktop: bool,
}

impl RaceConfig {
    /// Creates validated race configuration.
    ///
    /// # Errors
    /// Returns [`RaceError::InvalidTimeout`] when `fallback_timeout_ms == 0`
    /// and [`RaceError::InvalidProgressInterval`] when `progress_interval_ms == 0`.
    pub fn new(
        fallback_timeout_ms: u64,
        progress_interval_ms: u64,
        client_platform: ClientPlatform,
        attempt_native_on_desktop: bool,
    ) -> Result<Self, RaceError> {
        if fallback_timeout_ms == 0 {
            return Err(RaceError::InvalidTimeout);
        }
        if progress_interval_ms == 0 {
            return Err(RaceError::InvalidProgressInterval);
        }
        Ok(Self {
            fallback_timeout_ms,
            progress_interval_ms,
            client_platform,
            attempt_native_on_desktop,
        })
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            fallback_timeout_ms: DEFAULT_FALLBACK_TIMEOUT_MS,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            client_platform: ClientPlatform::default(),
            attempt_native_on_desktop: false,
        }
    }
}

/// Browser navigation sink.
pub trait Navigator: Send + Sync {
    /// Navigates the hosting page to `uri`. Fire-and-forget.
    fn navigate(&self, uri: &str);
}

/// Capability reporting whether an app appears to have taken over the page.
pub trait AppHandoffSignal: Send + Sync {
    /// Returns `true` when the page was backgrounded within
    /// `[since_ms, until_ms]` and has since returned to the foreground.
    fn handoff_observed(&self, since_ms: u64, until_ms: u64) -> bool;
}

/// Signal that never reports a handoff; the fallback always fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledHandoffSignal;

impl AppHandoffSignal for DisabledHandoffSignal {
    fn handoff_observed(&self, _since_ms: u64, _until_ms: u64) -> bool {
        false
    }
}

/// Page-visibility based handoff signal.
///
/// The host forwards `visibilitychange` events. Best effort: some devices
/// never background the page when an app opens.
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    log: Mutex<VisibilityLog>,
}

#[derive(Debug, Default, Clone, Copy)]
struct VisibilityLog {
    hidden_at_ms: Option<u64>,
    returned_at_ms: Option<u64>,
}

impl VisibilityTracker {
    /// Creates a tracker with no recorded events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the page going to the background.
    pub fn record_hidden(&self, at_ms: u64) {
        if let Ok(mut log) = self.log.lock() {
            log.hidden_at_ms = Some(at_ms);
            log.returned_at_ms = None;
        }
    }

    /// Records the page returning to the foreground.
    pub fn record_visible(&self, at_ms: u64) {
        if let Ok(mut log) = self.log.lock()
            && log.hidden_at_ms.is_some()
        {
            log.returned_at_ms = Some(at_ms);
        }
    }
}

impl AppHandoffSignal for VisibilityTracker {
    fn handoff_observed(&self, since_ms: u64, until_ms: u64) -> bool {
        let Ok(log) = self.log.lock() else {
            return false;
        };
        matches!(
            (log.hidden_at_ms, log.returned_at_ms),
            (Some(hidden), Some(returned))
                if (since_ms..=until_ms).contains(&hidden) && returned >= hidden
        )
    }
}

/// Owned, cancellable fallback deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTimer {
    started_at_ms: u64,
    deadline_ms: u64,
    cancelled: bool,
}

impl FallbackTimer {
    /// Arms a timer at `now_ms` that is due after `timeout_ms`.
    pub fn arm(now_ms: u64, timeout_ms: u64) -> Self {
        Self {
            started_at_ms: now_ms,
            deadline_ms: now_ms.saturating_add(timeout_ms),
            cancelled: false,
        }
    }

    /// Start timestamp.
    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// Deadline timestamp.
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Cancels the timer; it will never be due again.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Returns `true` when cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns `true` when armed and the deadline has passed.
    pub fn is_due(&self, now_ms: u64) -> bool {
        !self.cancelled && now_ms >= self.deadline_ms
    }

    /// Elapsed fraction of the window, clamped to `[0, 1]`.
    pub fn elapsed_ratio(&self, now_ms: u64) -> f64 {
        let window = self.deadline_ms.saturating_sub(self.started_at_ms);
        if window == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        (elapsed as f64 / window as f64).clamp(0.0, 1.0)
    }
}

/// Race lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceState {
    /// Not started.
    Idle,
    /// Native URI fired; fallback pending.
    Attempting,
    /// Page round-tripped through the background; no fallback.
    HandedOff,
    /// Navigated to the web URL.
    Fallback,
    /// Hosting view torn down; no further navigation.
    Cancelled,
}

impl RaceState {
    /// Returns `true` for states that end the race.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RaceState::HandedOff | RaceState::Fallback | RaceState::Cancelled
        )
    }
}

/// Native-vs-web redirect race for one resolver session.
pub struct RedirectRaceController {
    config: RaceConfig,
    navigator: Arc<dyn Navigator>,
    signal: Arc<dyn AppHandoffSignal>,
    state: RaceState,
    target: Option<RedirectTarget>,
    timer: Option<FallbackTimer>,
    reported_ratio: f64,
}

impl RedirectRaceController {
    /// Creates an idle controller.
    pub fn new(
        config: RaceConfig,
        navigator: Arc<dyn Navigator>,
        signal: Arc<dyn AppHandoffSignal>,
    ) -> Self {
        Self {
            config,
            navigator,
            signal,
            state: RaceState::Idle,
            target: None,
            timer: None,
            reported_ratio: 0.0,
        }
    }

    /// Current state.
    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Target of the current or last race.
    pub fn target(&self) -> Option<&RedirectTarget> {
        self.target.as_ref()
    }

    /// Pending fallback timer, if any.
    pub fn pending_timer(&self) -> Option<&FallbackTimer> {
        self.timer.as_ref().filter(|timer| !timer.is_cancelled())
    }

    /// Native URI this client would fire for `target`.
    ///
    /// Android prefers the intent URI; desktop clients skip the native
    /// attempt unless configured otherwise.
    pub fn native_uri<'a>(&self, target: &'a RedirectTarget) -> Option<&'a str> {
        let app_uri = target.app_uri.as_deref()?;
        match self.config.client_platform {
            ClientPlatform::Android => Some(target.os_intent_uri.as_deref().unwrap_or(app_uri)),
            ClientPlatform::Ios => Some(app_uri),
            ClientPlatform::Desktop if self.config.attempt_native_on_desktop => Some(app_uri),
            ClientPlatform::Desktop => None,
        }
    }

    /// Starts a race, superseding any pending one.
    ///
    /// Without a native candidate the controller navigates to the web URL
    /// immediately. A torn-down controller ignores the call.
    pub fn start(&mut self, target: RedirectTarget, now_ms: u64) -> RaceState {
        if self.state == RaceState::Cancelled {
            debug!("ignoring race start after teardown");
            return self.state;
        }

        if let Some(mut previous) = self.timer.take() {
            previous.cancel();
            debug!("superseded pending fallback timer");
        }
        self.reported_ratio = 0.0;

        match self.native_uri(&target).map(str::to_string) {
            None => {
                info!(
                    platform = %target.platform_label,
                    "no native candidate, navigating to web url"
                );
                self.navigator.navigate(&target.web_url);
                self.state = RaceState::Fallback;
                self.reported_ratio = 1.0;
            }
            Some(uri) => {
                info!(
                    platform = %target.platform_label,
                    timeout_ms = self.config.fallback_timeout_ms,
                    reason = ?FallbackReason::NativeHandoffUnobservable,
                    "attempting native handoff"
                );
                self.navigator.navigate(&uri);
                self.timer = Some(FallbackTimer::arm(now_ms, self.config.fallback_timeout_ms));
                self.state = RaceState::Attempting;
            }
        }

        self.target = Some(target);
        self.state
    }

    /// Scheduled callback; advances the race at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> RaceState {
        if self.state != RaceState::Attempting {
            return self.state;
        }
        let Some(timer) = self.timer.as_ref() else {
            return self.state;
        };

        if self
            .signal
            .handoff_observed(timer.started_at_ms(), timer.deadline_ms())
        {
            info!("page returned from background, treating handoff as complete");
            self.finish(RaceState::HandedOff);
            return self.state;
        }

        if timer.is_due(now_ms) {
            if let Some(target) = &self.target {
                info!(platform = %target.platform_label, "fallback timer fired, navigating to web url");
                self.navigator.navigate(&target.web_url);
            }
            self.finish(RaceState::Fallback);
            return self.state;
        }

        self.reported_ratio = self.reported_ratio.max(timer.elapsed_ratio(now_ms));
        self.state
    }

    /// When the host should call [`poll`](Self::poll) next, if at all.
    pub fn next_poll_at(&self, now_ms: u64) -> Option<u64> {
        let timer = self.pending_timer()?;
        if self.state != RaceState::Attempting {
            return None;
        }
        Some(
            now_ms
                .saturating_add(self.config.progress_interval_ms)
                .min(timer.deadline_ms()),
        )
    }

    /// Progress snapshot; the ratio never decreases within one race.
    pub fn progress(&mut self, now_ms: u64) -> RedirectProgress {
        let current = match (&self.state, &self.timer) {
            (RaceState::Attempting, Some(timer)) => timer.elapsed_ratio(now_ms),
            (RaceState::Idle, _) => 0.0,
            _ => self.reported_ratio,
        };
        self.reported_ratio = self.reported_ratio.max(current);

        RedirectProgress {
            elapsed_ratio: self.reported_ratio,
            resolved_platform: self
                .target
                .as_ref()
                .map(|target| target.platform_label.clone()),
        }
    }

    /// Cancels any pending fallback. No navigation happens afterwards.
    pub fn teardown(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        if self.state != RaceState::Cancelled {
            debug!(previous = ?self.state, "race controller torn down");
        }
        self.state = RaceState::Cancelled;
    }

    fn finish(&mut self, state: RaceState) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.reported_ratio = 1.0;
        self.state = state;
    }
}

impl Drop for RedirectRaceController {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Race configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RaceError {
    /// Fallback timeout must be positive.
    #[error("invalid fallback timeout: must be greater than zero")]
    InvalidTimeout,
    /// Progress interval must be positive.
    #[error("invalid progress interval: must be greater than zero")]
    InvalidProgressInterval,
}
