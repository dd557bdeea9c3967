//! Kind-specific payload parsers.

use percent_encoding::percent_decode_str;
use qr_redirect_core::{
    EmailData, LocationData, PhoneData, SmsData, VCardData, WifiData, WifiSecurity,
};

use crate::strip_prefix_ci;

/// Percent-decodes a URI component.
///
/// Malformed escapes or non-UTF-8 results return `raw` unchanged.
pub fn decode_component(raw: &str) -> String {
    if !has_well_formed_escapes(raw) {
        return raw.to_string();
    }

    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

fn has_well_formed_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let well_formed = index + 2 < bytes.len()
                && bytes[index + 1].is_ascii_hexdigit()
                && bytes[index + 2].is_ascii_hexdigit();
            if !well_formed {
                return false;
            }
            index += 3;
        } else {
            index += 1;
        }
    }
    true
}

/// Finds a query parameter by case-insensitive key and decodes its value.
fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| decode_component(value))
}

/// Parses `sms:<num>?body=<msg>`, `sms:<num>&body=<msg>` and
/// `SMSTO:<num>:<msg>`.
///
/// Anything else keeps the whole remainder as the phone number with an
/// empty message.
pub fn parse_sms(raw: &str) -> SmsData {
    let trimmed = raw.trim();

    if let Some(rest) = strip_prefix_ci(trimmed, "smsto:") {
        return match rest.split_once(':') {
            Some((number, message)) => SmsData {
                phone_number: number.to_string(),
                message: decode_component(message),
            },
            None => SmsData {
                phone_number: rest.to_string(),
                message: String::new(),
            },
        };
    }

    let Some(rest) = strip_prefix_ci(trimmed, "sms:") else {
        return SmsData {
            phone_number: trimmed.to_string(),
            message: String::new(),
        };
    };

    if let Some((number, query)) = rest.split_once('?') {
        return SmsData {
            phone_number: number.to_string(),
            message: query_param(query, "body").unwrap_or_default(),
        };
    }

    if let Some(position) = rest.to_ascii_lowercase().find("&body=") {
        return SmsData {
            phone_number: rest[..position].to_string(),
            message: decode_component(&rest[position + "&body=".len()..]),
        };
    }

    SmsData {
        phone_number: rest.to_string(),
        message: String::new(),
    }
}

/// Parses `mailto:<addr>[?subject=..&body=..]`.
pub fn parse_email(raw: &str) -> EmailData {
    let trimmed = raw.trim();
    let rest = strip_prefix_ci(trimmed, "mailto:").unwrap_or(trimmed);

    match rest.split_once('?') {
        Some((address, query)) => EmailData {
            address: decode_component(address),
            subject: query_param(query, "subject"),
            body: query_param(query, "body"),
        },
        None => EmailData {
            address: decode_component(rest),
            subject: None,
            body: None,
        },
    }
}

/// Parses `tel:<number>`, dropping URI parameters after `;`.
pub fn parse_phone(raw: &str) -> PhoneData {
    let trimmed = raw.trim();
    let rest = strip_prefix_ci(trimmed, "tel:").unwrap_or(trimmed);
    let number = rest.split(';').next().unwrap_or_default();

    PhoneData {
        number: decode_component(number).trim().to_string(),
    }
}

/// Returns `true` for bare dialable numbers (`+`, digits, separators).
pub(crate) fn looks_like_phone_number(raw: &str) -> bool {
    let digits = raw.chars().filter(char::is_ascii_digit).count();
    digits >= 3
        && raw
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | ' ' | '-' | '(' | ')' | '.'))
}

/// Splits on `separator` unless escaped by a backslash.
///
/// Escapes are kept in the returned pieces so nested splits still see them.
pub(crate) fn split_unescaped(value: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (index, ch) in value.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == separator {
            pieces.push(&value[start..index]);
            start = index + ch.len_utf8();
        }
    }
    pieces.push(&value[start..]);
    pieces
}

/// Removes backslash escapes; `\n`/`\N` become newlines.
pub(crate) fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Parses `WIFI:T:<security>;S:<ssid>;P:<password>;H:<hidden>;;`.
///
/// Missing fields default to empty; a missing `T:` is inferred from whether a
/// password is present.
pub fn parse_wifi(raw: &str) -> WifiData {
    let trimmed = raw.trim();
    let body = strip_prefix_ci(trimmed, "wifi:").unwrap_or(trimmed);

    let mut ssid = String::new();
    let mut password = String::new();
    let mut security = None;
    let mut hidden = false;

    for field in split_unescaped(body, ';') {
        let Some((key, value)) = field.split_once(':') else {
            continue;
        };
        let value = unescape(value);
        match key.trim().to_ascii_uppercase().as_str() {
            "S" => ssid = value,
            "P" => password = value,
            "T" => security = Some(parse_wifi_security(&value)),
            "H" => hidden = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    let security = security.unwrap_or(if password.is_empty() {
        WifiSecurity::Open
    } else {
        WifiSecurity::Wpa
    });

    WifiData {
        ssid,
        password,
        security,
        hidden,
    }
}

fn parse_wifi_security(token: &str) -> WifiSecurity {
    match token.trim().to_ascii_uppercase().as_str() {
        "WEP" => WifiSecurity::Wep,
        "" | "NOPASS" | "NONE" => WifiSecurity::Open,
        _ => WifiSecurity::Wpa,
    }
}

/// Parses a vCard (2.1, 3.0 or 4.0) into contact fields.
///
/// Folded continuation lines are joined; unknown properties are ignored.
pub fn parse_vcard(raw: &str) -> VCardData {
    let mut card = VCardData::default();
    let mut structured_name = None;

    for line in unfold_lines(raw) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let property = name.split(';').next().unwrap_or_default();
        // Grouped properties look like `item1.EMAIL`.
        let property = property.rsplit('.').next().unwrap_or(property);

        match property.to_ascii_uppercase().as_str() {
            "FN" => card.full_name = unescape(value).trim().to_string(),
            "N" => structured_name = Some(assemble_name(value)),
            "ORG" => card.organization = non_empty(join_components(value, " ")),
            "TITLE" => card.title = non_empty(unescape(value)),
            "TEL" => push_non_empty(&mut card.phones, unescape(value)),
            "EMAIL" => push_non_empty(&mut card.emails, unescape(value)),
            "URL" => push_non_empty(&mut card.urls, unescape(value)),
            "ADR" => card.address = non_empty(join_components(value, ", ")),
            "NOTE" => card.note = non_empty(unescape(value)),
            _ => {}
        }
    }

    if card.full_name.is_empty() {
        card.full_name = structured_name.unwrap_or_default();
    }

    card
}

fn unfold_lines(raw: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in raw.lines() {
        if let Some(continuation) = line.strip_prefix([' ', '\t'])
            && let Some(last) = lines.last_mut()
        {
            last.push_str(continuation);
            continue;
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// `N:Family;Given;Additional;Prefix;Suffix` -> `Prefix Given Additional Family Suffix`.
fn assemble_name(value: &str) -> String {
    let parts: Vec<String> = split_unescaped(value, ';')
        .into_iter()
        .map(|part| unescape(part).trim().to_string())
        .collect();
    let part = |index: usize| parts.get(index).map(String::as_str).unwrap_or_default();

    [part(3), part(1), part(2), part(0), part(4)]
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_components(value: &str, separator: &str) -> String {
    split_unescaped(value, ';')
        .into_iter()
        .map(|part| unescape(part).trim().to_string())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn push_non_empty(values: &mut Vec<String>, value: String) {
    if let Some(value) = non_empty(value) {
        values.push(value);
    }
}

/// Parses `geo:<lat>,<lng>[,<alt>][;params][?q=<label>]` or a bare `lat,lng`.
///
/// Returns `None` when coordinates are missing or out of range.
pub fn parse_location(raw: &str) -> Option<LocationData> {
    let trimmed = raw.trim();
    let rest = strip_prefix_ci(trimmed, "geo:").unwrap_or(trimmed);

    let (coordinates, query) = match rest.split_once('?') {
        Some((coordinates, query)) => (coordinates, Some(query)),
        None => (rest, None),
    };
    let coordinates = coordinates.split(';').next().unwrap_or_default();

    let mut parts = coordinates.split(',').map(str::trim);
    let latitude: f64 = parts.next()?.parse().ok()?;
    let longitude: f64 = parts.next()?.parse().ok()?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(LocationData {
        latitude,
        longitude,
        query: query
            .and_then(|query| query_param(query, "q"))
            .filter(|label| !label.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for sub-parsers.

    use super::*;

    #[test]
    fn sms_query_body_is_decoded() {
        let sms = parse_sms("sms:+15551234567?body=Hello%20there");
        assert_eq!(sms.phone_number, "+15551234567");
        assert_eq!(sms.message, "Hello there");
    }

    #[test]
    fn sms_ampersand_body() {
        let sms = parse_sms("sms:555&body=On%20my%20way");
        assert_eq!(sms.phone_number, "555");
        assert_eq!(sms.message, "On my way");
    }

    #[test]
    fn sms_malformed_escape_keeps_raw_message() {
        let sms = parse_sms("SMSTO:555:100%zz");
        assert_eq!(sms.message, "100%zz");

        let sms = parse_sms("sms:555?body=%E0%A4%A");
        assert_eq!(sms.message, "%E0%A4%A");

        let sms = parse_sms("sms:555?body=%FF");
        assert_eq!(sms.message, "%FF");
    }

    #[test]
    fn sms_unknown_parameters_leave_message_empty() {
        let sms = parse_sms("sms:555?subject=x");
        assert_eq!(sms.phone_number, "555");
        assert_eq!(sms.message, "");
    }

    #[test]
    fn email_with_subject_and_body() {
        let email = parse_email("mailto:team@example.test?subject=Hello&body=See%20you");
        assert_eq!(email.address, "team@example.test");
        assert_eq!(email.subject.as_deref(), Some("Hello"));
        assert_eq!(email.body.as_deref(), Some("See you"));
    }

    #[test]
    fn phone_drops_uri_parameters() {
        assert_eq!(parse_phone("tel:+1-555-0100;ext=12").number, "+1-555-0100");
    }

    #[test]
    fn wifi_handles_escapes_and_any_field_order() {
        let wifi = parse_wifi(r"WIFI:S:My\;Net;T:WPA;P:pa\:ss\\word;H:true;;");
        assert_eq!(wifi.ssid, "My;Net");
        assert_eq!(wifi.password, r"pa:ss\word");
        assert_eq!(wifi.security, WifiSecurity::Wpa);
        assert!(wifi.hidden);
    }

    #[test]
    fn wifi_without_type_infers_security() {
        assert_eq!(parse_wifi("WIFI:S:cafe;;").security, WifiSecurity::Open);
        assert_eq!(parse_wifi("WIFI:S:cafe;P:x;;").security, WifiSecurity::Wpa);
        assert_eq!(parse_wifi("WIFI:T:nopass;S:cafe;;").security, WifiSecurity::Open);
    }

    #[test]
    fn vcard_fields_and_folding() {
        let card = parse_vcard(
            "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;Jane;;Dr.;\r\nORG:Acme;Labs\r\n\
             TEL;TYPE=CELL:+15550100\r\nitem1.EMAIL:jane@acme.test\r\n\
             ADR:;;1 Main St;Springfield;;12345;US\r\nNOTE:first line\\nsecond\r\n \
             continued\r\nEND:VCARD",
        );
        assert_eq!(card.full_name, "Dr. Jane Doe");
        assert_eq!(card.organization.as_deref(), Some("Acme Labs"));
        assert_eq!(card.phones, vec!["+15550100"]);
        assert_eq!(card.emails, vec!["jane@acme.test"]);
        assert_eq!(
            card.address.as_deref(),
            Some("1 Main St, Springfield, 12345, US")
        );
        assert_eq!(card.note.as_deref(), Some("first line\nsecondcontinued"));
    }

    #[test]
    fn location_with_label_and_altitude() {
        let location = parse_location("geo:48.8584,2.2945,300?q=Eiffel%20Tower").unwrap();
        assert_eq!(location.latitude, 48.8584);
        assert_eq!(location.longitude, 2.2945);
        assert_eq!(location.query.as_deref(), Some("Eiffel Tower"));
        assert!(parse_location("geo:91,0").is_none());
        assert!(parse_location("40.7128, -74.0060").is_some());
    }
}
