//! Resolver configuration: serde defaults, JSON files and `QR_REDIRECT_*`
//! environment overrides.

use qr_redirect_gate::validate_verify_endpoint;
use qr_redirect_race::{
    ClientPlatform, DEFAULT_FALLBACK_TIMEOUT_MS, DEFAULT_PROGRESS_INTERVAL_MS, RaceConfig,
};
use serde::{Deserialize, Serialize};

use crate::AppError;

/// Env var overriding [`ResolverConfig::fallback_timeout_ms`].
pub const ENV_FALLBACK_TIMEOUT_MS: &str = "QR_REDIRECT_FALLBACK_TIMEOUT_MS";
/// Env var overriding [`ResolverConfig::progress_interval_ms`].
pub const ENV_PROGRESS_INTERVAL_MS: &str = "QR_REDIRECT_PROGRESS_INTERVAL_MS";
/// Env var overriding [`ResolverConfig::client_platform`].
pub const ENV_PLATFORM: &str = "QR_REDIRECT_PLATFORM";
/// Env var overriding [`ResolverConfig::attempt_native_on_desktop`].
pub const ENV_NATIVE_ON_DESKTOP: &str = "QR_REDIRECT_NATIVE_ON_DESKTOP";
/// Env var overriding [`ResolverConfig::verify_endpoint`].
pub const ENV_VERIFY_ENDPOINT: &str = "QR_REDIRECT_VERIFY_ENDPOINT";
/// Env var overriding [`ResolverConfig::log_level`].
pub const ENV_LOG_LEVEL: &str = "QR_REDIRECT_LOG";

/// Resolver runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Wait before the web fallback fires.
    pub fallback_timeout_ms: u64,
    /// Host poll cadence while a race is pending.
    pub progress_interval_ms: u64,
    /// Client platform used to pick intent vs. custom-scheme URIs.
    pub client_platform: ClientPlatform,
    /// Whether desktop clients attempt native handoff.
    pub attempt_native_on_desktop: bool,
    /// Password verification endpoint, when protected payloads are served.
    pub verify_endpoint: Option<String>,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fallback_timeout_ms: DEFAULT_FALLBACK_TIMEOUT_MS,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            client_platform: ClientPlatform::default(),
            attempt_native_on_desktop: false,
            verify_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Parses and validates a JSON config; absent fields take defaults.
    ///
    /// # Errors
    /// Returns [`AppError::Json`] for malformed JSON, otherwise see
    /// [`validate`](Self::validate).
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with process environment overrides.
    ///
    /// # Errors
    /// See [`apply_env_with`](Self::apply_env_with).
    pub fn from_env() -> Result<Self, AppError> {
        Self::default().with_env_overrides()
    }

    /// Overlays process environment overrides.
    ///
    /// # Errors
    /// See [`apply_env_with`](Self::apply_env_with).
    pub fn with_env_overrides(self) -> Result<Self, AppError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlays overrides from `lookup`; unset keys keep current values.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when a value cannot be parsed, otherwise
    /// see [`validate`](Self::validate).
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_FALLBACK_TIMEOUT_MS) {
            self.fallback_timeout_ms = parse_millis(ENV_FALLBACK_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_PROGRESS_INTERVAL_MS) {
            self.progress_interval_ms = parse_millis(ENV_PROGRESS_INTERVAL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_PLATFORM) {
            self.client_platform = ClientPlatform::parse(&value).ok_or_else(|| {
                AppError::Config(format!("{ENV_PLATFORM}: unknown platform `{value}`"))
            })?;
        }
        if let Some(value) = lookup(ENV_NATIVE_ON_DESKTOP) {
            self.attempt_native_on_desktop = parse_flag(&value);
        }
        if let Some(value) = lookup(ENV_VERIFY_ENDPOINT) {
            let value = value.trim();
            self.verify_endpoint = (!value.is_empty()).then(|| value.to_string());
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL)
            && !value.trim().is_empty()
        {
            self.log_level = value.trim().to_string();
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks timings and the verify endpoint policy.
    ///
    /// # Errors
    /// Returns [`AppError::Race`] for invalid timings and [`AppError::Gate`]
    /// for a non-HTTPS or mis-pathed verify endpoint.
    pub fn validate(&self) -> Result<RaceConfig, AppError> {
        if let Some(endpoint) = &self.verify_endpoint {
            validate_verify_endpoint(endpoint)?;
        }
        self.race_config()
    }

    /// Validated race configuration.
    ///
    /// # Errors
    /// Returns [`AppError::Race`] for zero timeout or interval.
    pub fn race_config(&self) -> Result<RaceConfig, AppError> {
        Ok(RaceConfig::new(
            self.fallback_timeout_ms,
            self.progress_interval_ms,
            self.client_platform,
            self.attempt_native_on_desktop,
        )?)
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key}: expected milliseconds, got `{value}`")))
}

/// `1`, `true`, `on`, `yes` (case-insensitive) are true; anything else false.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
