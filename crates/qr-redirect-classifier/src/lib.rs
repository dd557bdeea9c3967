#![warn(missing_docs)]
//! # qr-redirect-classifier
//!
//! ## Purpose
//! Determines what a scanned payload is and extracts its structured fields.
//!
//! ## Responsibilities
//! - Classify raw content by structural prefix (`sms:`, `mailto:`, `WIFI:`,
//!   ...) or strict URL parsing.
//! - Reconcile the structural result with the payload's declared type.
//! - Parse each structured kind into its record.
//! - Serialize records back into canonical payload strings.
//!
//! ## Data flow
//! Unlocked [`QrPayload`] -> [`resolve_kind`] -> [`parse_content`] ->
//! [`ParsedContent`] handed to presenter dispatch.
//!
//! ## Error model
//! Classification never fails. Unrecognized or malformed input is plain
//! text, and percent-decoding failures keep the raw substring.
//!
//! ## Example
//! ```rust
//! use qr_redirect_classifier::{classify, parse_sms};
//! use qr_redirect_core::ContentKind;
//!
//! assert_eq!(classify("SMSTO:555:Hi"), ContentKind::Sms);
//! assert_eq!(parse_sms("SMSTO:555:Hi").message, "Hi");
//! ```

mod encode;
mod parse;

pub use encode::{
    encode_content, encode_email, encode_location, encode_phone, encode_sms, encode_vcard,
    encode_wifi,
};
pub use parse::{
    decode_component, parse_email, parse_location, parse_phone, parse_sms, parse_vcard,
    parse_wifi,
};

use qr_redirect_core::{ContentKind, FallbackReason, ParsedContent, QrPayload};
use qr_redirect_mapper::{map_to_targets, parse_web_url};
use tracing::debug;

/// Structural prefixes checked in order, case-insensitively.
const PREFIX_RULES: &[(&str, ContentKind)] = &[
    ("sms:", ContentKind::Sms),
    ("smsto:", ContentKind::Sms),
    ("mailto:", ContentKind::Email),
    ("tel:", ContentKind::Phone),
    ("begin:vcard", ContentKind::Vcard),
    ("wifi:", ContentKind::Wifi),
    ("geo:", ContentKind::Location),
];

/// Classifies raw scan content.
///
/// Pure string inspection; never performs I/O and never fails.
pub fn classify(raw_content: &str) -> ContentKind {
    let trimmed = raw_content.trim();

    for (prefix, kind) in PREFIX_RULES {
        if strip_prefix_ci(trimmed, prefix).is_some() {
            return *kind;
        }
    }

    if parse_web_url(trimmed).is_some() {
        return ContentKind::Url;
    }

    ContentKind::Text
}

/// Resolves the presentation kind for a payload.
///
/// A recognized structure always wins. When the content is structurally plain
/// text, the declared type is honored only if its parser accepts the content
/// as-is (bare phone numbers, bare `lat,lng` pairs).
pub fn resolve_kind(payload: &QrPayload) -> ContentKind {
    let structural = classify(&payload.raw_content);
    if structural != ContentKind::Text {
        return structural;
    }

    let raw = payload.raw_content.trim();
    let resolved = match payload.declared_type {
        ContentKind::Phone | ContentKind::Sms if parse::looks_like_phone_number(raw) => {
            payload.declared_type
        }
        ContentKind::Location if parse_location(raw).is_some() => ContentKind::Location,
        _ => ContentKind::Text,
    };

    if resolved == ContentKind::Text && payload.declared_type != ContentKind::Text {
        debug!(
            declared = %payload.declared_type,
            reason = ?FallbackReason::ClassificationAmbiguous,
            "declared type not supported by content, presenting as text"
        );
    }

    resolved
}

/// Parses content into the record for `kind`.
///
/// Location content that does not carry valid coordinates degrades to
/// [`ParsedContent::Text`].
pub fn parse_content(kind: ContentKind, raw_content: &str) -> ParsedContent {
    match kind {
        ContentKind::Url => ParsedContent::Url(map_to_targets(raw_content)),
        ContentKind::Vcard => ParsedContent::Vcard(parse_vcard(raw_content)),
        ContentKind::Wifi => ParsedContent::Wifi(parse_wifi(raw_content)),
        ContentKind::Phone => ParsedContent::Phone(parse_phone(raw_content)),
        ContentKind::Sms => ParsedContent::Sms(parse_sms(raw_content)),
        ContentKind::Email => ParsedContent::Email(parse_email(raw_content)),
        ContentKind::Location => match parse_location(raw_content) {
            Some(location) => ParsedContent::Location(location),
            None => {
                debug!(
                    reason = ?FallbackReason::ClassificationAmbiguous,
                    "location payload without valid coordinates"
                );
                ParsedContent::Text(raw_content.to_string())
            }
        },
        ContentKind::Text => ParsedContent::Text(raw_content.to_string()),
    }
}

/// Classifies and parses a payload in one step.
pub fn classify_payload(payload: &QrPayload) -> ParsedContent {
    parse_content(resolve_kind(payload), &payload.raw_content)
}

pub(crate) fn strip_prefix_ci<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for structural classification.

    use super::*;

    #[test]
    fn prefixes_are_case_insensitive() {
        assert_eq!(classify("SMS:555"), ContentKind::Sms);
        assert_eq!(classify("smsto:555:hi"), ContentKind::Sms);
        assert_eq!(classify("MAILTO:a@b.test"), ContentKind::Email);
        assert_eq!(classify("Tel:+15551234567"), ContentKind::Phone);
        assert_eq!(classify("begin:vcard\nFN:A\nEND:VCARD"), ContentKind::Vcard);
        assert_eq!(classify("wifi:S:home;;"), ContentKind::Wifi);
        assert_eq!(classify("GEO:40.7,-74.0"), ContentKind::Location);
    }

    #[test]
    fn url_requires_strict_http_parse() {
        assert_eq!(classify("https://example.com/a?b=c"), ContentKind::Url);
        assert_eq!(classify("  http://example.com  "), ContentKind::Url);
        assert_eq!(classify("www.example.com"), ContentKind::Text);
        assert_eq!(classify("https://exa mple.com"), ContentKind::Text);
        assert_eq!(classify("ftp://example.com"), ContentKind::Text);
        assert_eq!(classify("https://"), ContentKind::Text);
    }

    #[test]
    fn empty_and_non_ascii_input_is_text() {
        assert_eq!(classify(""), ContentKind::Text);
        assert_eq!(classify("日本語のテキスト"), ContentKind::Text);
    }

    #[test]
    fn declared_phone_accepts_bare_number() {
        let payload = QrPayload::new("+1 (555) 123-4567", ContentKind::Phone, false);
        assert_eq!(resolve_kind(&payload), ContentKind::Phone);

        let payload = QrPayload::new("call me maybe", ContentKind::Phone, false);
        assert_eq!(resolve_kind(&payload), ContentKind::Text);
    }

    #[test]
    fn structure_overrides_declared_type() {
        let payload = QrPayload::new("mailto:a@b.test", ContentKind::Url, false);
        assert_eq!(resolve_kind(&payload), ContentKind::Email);
    }

    #[test]
    fn invalid_geo_degrades_to_text() {
        let parsed = parse_content(ContentKind::Location, "geo:north,south");
        assert_eq!(parsed, ParsedContent::Text("geo:north,south".to_string()));
    }
}
