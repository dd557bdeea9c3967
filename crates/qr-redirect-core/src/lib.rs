#![warn(missing_docs)]
//! # qr-redirect-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `qr-redirect` workspace.
//!
//! ## Responsibilities
//! - Represent the immutable scanned payload handed to a resolver session.
//! - Represent derived redirect targets, gate state and race progress.
//! - Represent the structured records extracted from non-URL payloads.
//! - Name the non-fatal degradations the resolver may take.
//!
//! ## Data flow
//! The fetch service hands a [`QrPayload`] to the resolver. The classifier
//! turns it into a [`ContentKind`] and a [`ParsedContent`]; URL content
//! carries a [`RedirectTarget`] built by the mapper.
//!
//! ## Ownership and lifetimes
//! All records own their strings so that sessions can keep them across event
//! loop turns without borrowing the transient scan buffer.
//!
//! ## Error model
//! Only JSON decoding of inbound payloads can fail, reported as [`CoreError`].
//! Everything else degrades to a [`FallbackReason`].
//!
//! ## Example
//! ```rust
//! use qr_redirect_core::{ContentKind, QrPayload};
//!
//! let payload = QrPayload::new("https://example.com", ContentKind::Url, false);
//! assert!(!payload.is_password_protected);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label used for targets without a platform rule.
pub const WEBSITE_LABEL: &str = "Website";

/// Content kinds recognized by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Absolute http(s) URL.
    Url,
    /// vCard contact.
    Vcard,
    /// WiFi network credentials.
    Wifi,
    /// Phone number (`tel:`).
    Phone,
    /// SMS draft (`sms:` / `SMSTO:`).
    Sms,
    /// Email draft (`mailto:`).
    Email,
    /// Geographic coordinates (`geo:`).
    Location,
    /// Anything else.
    Text,
}

impl ContentKind {
    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Url => "url",
            ContentKind::Vcard => "vcard",
            ContentKind::Wifi => "wifi",
            ContentKind::Phone => "phone",
            ContentKind::Sms => "sms",
            ContentKind::Email => "email",
            ContentKind::Location => "location",
            ContentKind::Text => "text",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable scanned payload supplied by the decode/fetch service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    /// Opaque QR record id, used by the password verifier.
    #[serde(default)]
    pub qr_id: Option<String>,
    /// Decoded QR content.
    pub raw_content: String,
    /// Type hint recorded when the code was generated.
    pub declared_type: ContentKind,
    /// Whether content is behind an access gate.
    #[serde(default)]
    pub is_password_protected: bool,
}

impl QrPayload {
    /// Creates a payload without a record id.
    pub fn new(
        raw_content: impl Into<String>,
        declared_type: ContentKind,
        is_password_protected: bool,
    ) -> Self {
        Self {
            qr_id: None,
            raw_content: raw_content.into(),
            declared_type,
            is_password_protected,
        }
    }

    /// Attaches the record id used for password verification.
    pub fn with_qr_id(mut self, qr_id: impl Into<String>) -> Self {
        self.qr_id = Some(qr_id.into());
        self
    }

    /// Deserializes a payload from JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON decoding fails.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(raw).map_err(CoreError::Codec)
    }

    /// Serializes the payload to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON encoding fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }
}

/// Candidate redirect destinations for one URL payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    /// Custom-scheme URI for the native app, if a rule produced one.
    pub app_uri: Option<String>,
    /// Web fallback; always present.
    pub web_url: String,
    /// Human-readable platform name.
    pub platform_label: String,
    /// Intent URI naming the app package, if one is known.
    pub os_intent_uri: Option<String>,
}

impl RedirectTarget {
    /// Web-only target with the [`WEBSITE_LABEL`] label.
    pub fn website(web_url: impl Into<String>) -> Self {
        Self {
            app_uri: None,
            web_url: web_url.into(),
            platform_label: WEBSITE_LABEL.to_string(),
            os_intent_uri: None,
        }
    }

    /// Returns `true` when a native handoff can be attempted.
    pub fn has_native_candidate(&self) -> bool {
        self.app_uri.is_some()
    }
}

/// Access gate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    /// Prompt not yet shown.
    Locked,
    /// Prompt shown; awaiting (re)submission.
    Challenging,
    /// Content disclosed for the rest of the session.
    Unlocked,
}

/// Snapshot of the access gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGateState {
    /// Current status.
    pub status: GateStatus,
    /// Text currently typed in the password field.
    pub attempt_input: String,
    /// User-facing message from the last denied attempt.
    pub last_error: Option<String>,
}

impl AccessGateState {
    /// Initial state for a payload.
    pub fn initial(is_password_protected: bool) -> Self {
        Self {
            status: if is_password_protected {
                GateStatus::Locked
            } else {
                GateStatus::Unlocked
            },
            attempt_input: String::new(),
            last_error: None,
        }
    }
}

/// UI feedback for a running redirect race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectProgress {
    /// Elapsed fraction of the fallback window, in `[0, 1]`.
    pub elapsed_ratio: f64,
    /// Platform label once the race has resolved.
    pub resolved_platform: Option<String>,
}

/// Parsed `sms:` / `SMSTO:` payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SmsData {
    /// Recipient number.
    pub phone_number: String,
    /// Pre-filled body; empty when absent.
    pub message: String,
}

/// Parsed `mailto:` payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmailData {
    /// Recipient address.
    pub address: String,
    /// Subject line.
    pub subject: Option<String>,
    /// Body text.
    pub body: Option<String>,
}

/// Parsed `tel:` payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhoneData {
    /// Dialable number.
    pub number: String,
}

/// WiFi security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WifiSecurity {
    /// WPA/WPA2/WPA3 personal.
    #[default]
    Wpa,
    /// Legacy WEP.
    Wep,
    /// Open network.
    Open,
}

impl WifiSecurity {
    /// Token used in the `T:` field of a WiFi payload.
    pub fn as_token(&self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::Open => "nopass",
        }
    }
}

/// Parsed `WIFI:` payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WifiData {
    /// Network name.
    pub ssid: String,
    /// Pre-shared key; empty for open networks.
    pub password: String,
    /// Security mode.
    pub security: WifiSecurity,
    /// Whether the SSID is hidden.
    pub hidden: bool,
}

/// Parsed vCard contact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VCardData {
    /// Formatted name (`FN`, or assembled from `N`).
    pub full_name: String,
    /// Organization (`ORG`).
    pub organization: Option<String>,
    /// Job title (`TITLE`).
    pub title: Option<String>,
    /// Phone numbers (`TEL`).
    pub phones: Vec<String>,
    /// Email addresses (`EMAIL`).
    pub emails: Vec<String>,
    /// Websites (`URL`).
    pub urls: Vec<String>,
    /// Postal address (`ADR`), components joined with `", "`.
    pub address: Option<String>,
    /// Free-form note (`NOTE`).
    pub note: Option<String>,
}

/// Parsed geographic location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationData {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Optional place label (`q=`).
    pub query: Option<String>,
}

/// Kind-specific parsed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ParsedContent {
    /// URL content with its redirect targets.
    Url(RedirectTarget),
    /// vCard record.
    Vcard(VCardData),
    /// WiFi record.
    Wifi(WifiData),
    /// Phone record.
    Phone(PhoneData),
    /// SMS record.
    Sms(SmsData),
    /// Email record.
    Email(EmailData),
    /// Location record.
    Location(LocationData),
    /// Plain text.
    Text(String),
}

impl ParsedContent {
    /// Kind this record belongs to.
    pub fn kind(&self) -> ContentKind {
        match self {
            ParsedContent::Url(_) => ContentKind::Url,
            ParsedContent::Vcard(_) => ContentKind::Vcard,
            ParsedContent::Wifi(_) => ContentKind::Wifi,
            ParsedContent::Phone(_) => ContentKind::Phone,
            ParsedContent::Sms(_) => ContentKind::Sms,
            ParsedContent::Email(_) => ContentKind::Email,
            ParsedContent::Location(_) => ContentKind::Location,
            ParsedContent::Text(_) => ContentKind::Text,
        }
    }
}

/// Non-fatal degradations taken by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Input matched no known structure; shown as plain text.
    ClassificationAmbiguous,
    /// URL could not be parsed; web-only target used.
    MalformedUrl,
    /// Password was rejected; gate stays open for retry.
    PasswordDenied,
    /// App-open outcome is not observable; timeout fallback applies.
    NativeHandoffUnobservable,
}

/// Error type for core model codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON encoding/decoding error.
    #[error("payload codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
