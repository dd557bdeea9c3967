//! Canonical payload encoders, the inverse of the sub-parsers.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use qr_redirect_core::{
    EmailData, LocationData, ParsedContent, PhoneData, SmsData, VCardData, WifiData,
    WifiSecurity,
};

/// Same unreserved set as `encodeURIComponent` minus `!*'()`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Serializes a record into the payload string a QR code would carry.
pub fn encode_content(content: &ParsedContent) -> String {
    match content {
        ParsedContent::Url(target) => target.web_url.clone(),
        ParsedContent::Vcard(card) => encode_vcard(card),
        ParsedContent::Wifi(wifi) => encode_wifi(wifi),
        ParsedContent::Phone(phone) => encode_phone(phone),
        ParsedContent::Sms(sms) => encode_sms(sms),
        ParsedContent::Email(email) => encode_email(email),
        ParsedContent::Location(location) => encode_location(location),
        ParsedContent::Text(text) => text.clone(),
    }
}

/// `sms:<num>[?body=<msg>]`.
pub fn encode_sms(sms: &SmsData) -> String {
    if sms.message.is_empty() {
        format!("sms:{}", sms.phone_number)
    } else {
        format!(
            "sms:{}?body={}",
            sms.phone_number,
            encode_component(&sms.message)
        )
    }
}

/// `mailto:<addr>[?subject=..][&body=..]`.
pub fn encode_email(email: &EmailData) -> String {
    let params: Vec<String> = [("subject", &email.subject), ("body", &email.body)]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(|value| format!("{key}={}", encode_component(value)))
        })
        .collect();

    if params.is_empty() {
        format!("mailto:{}", email.address)
    } else {
        format!("mailto:{}?{}", email.address, params.join("&"))
    }
}

/// `tel:<number>`.
pub fn encode_phone(phone: &PhoneData) -> String {
    format!("tel:{}", phone.number)
}

fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `WIFI:T:<sec>;S:<ssid>;[P:<pw>;][H:true;];`.
pub fn encode_wifi(wifi: &WifiData) -> String {
    let mut out = format!(
        "WIFI:T:{};S:{};",
        wifi.security.as_token(),
        escape_wifi(&wifi.ssid)
    );
    if wifi.security != WifiSecurity::Open && !wifi.password.is_empty() {
        out.push_str(&format!("P:{};", escape_wifi(&wifi.password)));
    }
    if wifi.hidden {
        out.push_str("H:true;");
    }
    out.push(';');
    out
}

fn escape_vcard(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// vCard 3.0 with one line per populated field.
pub fn encode_vcard(card: &VCardData) -> String {
    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", escape_vcard(&card.full_name)),
    ];

    if let Some(organization) = &card.organization {
        lines.push(format!("ORG:{}", escape_vcard(organization)));
    }
    if let Some(title) = &card.title {
        lines.push(format!("TITLE:{}", escape_vcard(title)));
    }
    lines.extend(card.phones.iter().map(|phone| format!("TEL:{}", escape_vcard(phone))));
    lines.extend(card.emails.iter().map(|email| format!("EMAIL:{}", escape_vcard(email))));
    lines.extend(card.urls.iter().map(|url| format!("URL:{}", escape_vcard(url))));
    if let Some(address) = &card.address {
        lines.push(format!("ADR:;;{};;;;", escape_vcard(address)));
    }
    if let Some(note) = &card.note {
        lines.push(format!("NOTE:{}", escape_vcard(note)));
    }
    lines.push("END:VCARD".to_string());

    lines.join("\n")
}

/// `geo:<lat>,<lng>[?q=<label>]`.
pub fn encode_location(location: &LocationData) -> String {
    match &location.query {
        Some(query) => format!(
            "geo:{},{}?q={}",
            location.latitude,
            location.longitude,
            encode_component(query)
        ),
        None => format!("geo:{},{}", location.latitude, location.longitude),
    }
}
