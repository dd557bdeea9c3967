#![warn(missing_docs)]
//! # qr-redirect-presenter
//!
//! ## Purpose
//! Selects the renderer for unlocked, classified content.
//!
//! ## Responsibilities
//! - Map a [`ContentKind`] plus its parsed record to a [`PresenterSelection`].
//! - List the values each presenter offers for copy-to-clipboard.
//! - Hand copy requests to a platform [`ClipboardSink`].
//!
//! ## Data flow
//! Classifier output -> [`dispatch`] -> view collaborators render the
//! selection; copy buttons -> [`copy_to_clipboard`].
//!
//! ## Error model
//! Dispatch is infallible: a record that does not match its kind falls back to
//! the text presenter. Clipboard failures are [`ClipboardError`].
//!
//! ## Security and privacy notes
//! Selections carry WiFi passwords for display; they are never logged.

use qr_redirect_core::{
    ContentKind, EmailData, FallbackReason, LocationData, ParsedContent, PhoneData,
    RedirectTarget, SmsData, VCardData, WifiData,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Renderer chosen for a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "presenter", content = "data", rename_all = "snake_case")]
pub enum PresenterSelection {
    /// Redirect page with native/web race.
    Redirect(RedirectTarget),
    /// Contact card.
    Contact(VCardData),
    /// WiFi credentials.
    Wifi(WifiData),
    /// SMS draft.
    Sms(SmsData),
    /// Email draft.
    Email(EmailData),
    /// Phone number.
    Phone(PhoneData),
    /// Map location.
    Location(LocationData),
    /// Plain text.
    Text(String),
}

impl PresenterSelection {
    /// Content kind rendered by this selection.
    pub fn kind(&self) -> ContentKind {
        match self {
            PresenterSelection::Redirect(_) => ContentKind::Url,
            PresenterSelection::Contact(_) => ContentKind::Vcard,
            PresenterSelection::Wifi(_) => ContentKind::Wifi,
            PresenterSelection::Sms(_) => ContentKind::Sms,
            PresenterSelection::Email(_) => ContentKind::Email,
            PresenterSelection::Phone(_) => ContentKind::Phone,
            PresenterSelection::Location(_) => ContentKind::Location,
            PresenterSelection::Text(_) => ContentKind::Text,
        }
    }

    /// Redirect target for URL selections.
    pub fn redirect_target(&self) -> Option<&RedirectTarget> {
        match self {
            PresenterSelection::Redirect(target) => Some(target),
            _ => None,
        }
    }
}

/// Chooses the presenter for `kind` from its parsed record.
///
/// Pure and idempotent. A record of another kind degrades to the text
/// presenter showing the record's best textual form.
pub fn dispatch(kind: ContentKind, parsed: ParsedContent) -> PresenterSelection {
    match (kind, parsed) {
        (ContentKind::Url, ParsedContent::Url(target)) => PresenterSelection::Redirect(target),
        (ContentKind::Vcard, ParsedContent::Vcard(card)) => PresenterSelection::Contact(card),
        (ContentKind::Wifi, ParsedContent::Wifi(wifi)) => PresenterSelection::Wifi(wifi),
        (ContentKind::Sms, ParsedContent::Sms(sms)) => PresenterSelection::Sms(sms),
        (ContentKind::Email, ParsedContent::Email(email)) => PresenterSelection::Email(email),
        (ContentKind::Phone, ParsedContent::Phone(phone)) => PresenterSelection::Phone(phone),
        (ContentKind::Location, ParsedContent::Location(location)) => {
            PresenterSelection::Location(location)
        }
        (_, ParsedContent::Text(text)) => PresenterSelection::Text(text),
        (kind, other) => {
            debug!(
                %kind,
                record = %other.kind(),
                reason = ?FallbackReason::ClassificationAmbiguous,
                "record does not match kind, presenting as text"
            );
            PresenterSelection::Text(fallback_text(&other))
        }
    }
}

fn fallback_text(parsed: &ParsedContent) -> String {
    match parsed {
        ParsedContent::Url(target) => target.web_url.clone(),
        ParsedContent::Vcard(card) => card.full_name.clone(),
        ParsedContent::Wifi(wifi) => wifi.ssid.clone(),
        ParsedContent::Phone(phone) => phone.number.clone(),
        ParsedContent::Sms(sms) => sms.phone_number.clone(),
        ParsedContent::Email(email) => email.address.clone(),
        ParsedContent::Location(location) => {
            format!("{},{}", location.latitude, location.longitude)
        }
        ParsedContent::Text(text) => text.clone(),
    }
}

/// Identifies which field a copy button belongs to, for UI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyField {
    /// Web URL.
    Url,
    /// WiFi network name.
    WifiSsid,
    /// WiFi password.
    WifiPassword,
    /// Phone number (phone, SMS or contact).
    PhoneNumber,
    /// SMS body.
    SmsMessage,
    /// Email address.
    EmailAddress,
    /// Email body.
    EmailBody,
    /// `lat,lng` pair.
    Coordinates,
    /// Plain text body.
    Text,
}

/// One copyable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardRequest {
    /// Field id echoed back for "copied" feedback.
    pub field: CopyField,
    /// Value to copy.
    pub value: String,
}

impl ClipboardRequest {
    fn new(field: CopyField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Lists copyable values for a selection, skipping empty ones.
pub fn copy_requests(selection: &PresenterSelection) -> Vec<ClipboardRequest> {
    let requests = match selection {
        PresenterSelection::Redirect(target) => {
            vec![ClipboardRequest::new(CopyField::Url, &target.web_url)]
        }
        PresenterSelection::Contact(card) => card
            .phones
            .iter()
            .map(|phone| ClipboardRequest::new(CopyField::PhoneNumber, phone))
            .chain(
                card.emails
                    .iter()
                    .map(|email| ClipboardRequest::new(CopyField::EmailAddress, email)),
            )
            .collect(),
        PresenterSelection::Wifi(wifi) => vec![
            ClipboardRequest::new(CopyField::WifiSsid, &wifi.ssid),
            ClipboardRequest::new(CopyField::WifiPassword, &wifi.password),
        ],
        PresenterSelection::Sms(sms) => vec![
            ClipboardRequest::new(CopyField::PhoneNumber, &sms.phone_number),
            ClipboardRequest::new(CopyField::SmsMessage, &sms.message),
        ],
        PresenterSelection::Email(email) => vec![
            ClipboardRequest::new(CopyField::EmailAddress, &email.address),
            ClipboardRequest::new(CopyField::EmailBody, email.body.clone().unwrap_or_default()),
        ],
        PresenterSelection::Phone(phone) => {
            vec![ClipboardRequest::new(CopyField::PhoneNumber, &phone.number)]
        }
        PresenterSelection::Location(location) => vec![ClipboardRequest::new(
            CopyField::Coordinates,
            format!("{},{}", location.latitude, location.longitude),
        )],
        PresenterSelection::Text(text) => vec![ClipboardRequest::new(CopyField::Text, text)],
    };

    requests
        .into_iter()
        .filter(|request| !request.value.is_empty())
        .collect()
}

/// Platform clipboard collaborator.
pub trait ClipboardSink: Send + Sync {
    /// Writes `value` to the clipboard.
    ///
    /// # Errors
    /// Returns [`ClipboardError::Unavailable`] when the platform refuses.
    fn write_text(&self, value: &str) -> Result<(), ClipboardError>;
}

/// Copies a value and returns its field id for "copied" feedback.
///
/// # Errors
/// Propagates [`ClipboardError`] from the sink.
pub fn copy_to_clipboard(
    sink: &dyn ClipboardSink,
    request: &ClipboardRequest,
) -> Result<CopyField, ClipboardError> {
    sink.write_text(&request.value)?;
    debug!(field = ?request.field, "copied field to clipboard");
    Ok(request.field)
}

/// Clipboard errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipboardError {
    /// Platform clipboard rejected the write.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for dispatch and copy lists.

    use super::*;

    #[test]
    fn mismatched_record_degrades_to_text() {
        let selection = dispatch(
            ContentKind::Wifi,
            ParsedContent::Phone(PhoneData {
                number: "555".to_string(),
            }),
        );
        assert_eq!(selection, PresenterSelection::Text("555".to_string()));
    }

    #[test]
    fn wifi_offers_ssid_and_password() {
        let selection = PresenterSelection::Wifi(WifiData {
            ssid: "home".to_string(),
            password: "hunter2".to_string(),
            ..WifiData::default()
        });
        let fields: Vec<CopyField> = copy_requests(&selection)
            .into_iter()
            .map(|request| request.field)
            .collect();
        assert_eq!(fields, vec![CopyField::WifiSsid, CopyField::WifiPassword]);
    }

    #[test]
    fn empty_sms_message_is_not_copyable() {
        let selection = PresenterSelection::Sms(SmsData {
            phone_number: "555".to_string(),
            message: String::new(),
        });
        assert_eq!(copy_requests(&selection).len(), 1);
    }
}
