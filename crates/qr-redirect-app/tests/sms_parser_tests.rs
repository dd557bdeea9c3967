//! Integration tests for SMS payload parsing.

use qr_redirect_classifier::parse_sms;
use qr_redirect_core::SmsData;

fn sms(phone_number: &str, message: &str) -> SmsData {
    SmsData {
        phone_number: phone_number.to_string(),
        message: message.to_string(),
    }
}

#[test]
fn sms_parser_tests_supports_all_three_encodings() {
    assert_eq!(
        parse_sms("sms:+15551234567?body=Hello%20there"),
        sms("+15551234567", "Hello there")
    );
    assert_eq!(parse_sms("sms:555&body=Hi%21"), sms("555", "Hi!"));
    assert_eq!(parse_sms("SMSTO:555:Hi"), sms("555", "Hi"));
}

#[test]
fn sms_parser_tests_number_only_has_empty_message() {
    assert_eq!(parse_sms("sms:555"), sms("555", ""));
    assert_eq!(parse_sms("SMSTO:555"), sms("555", ""));
}

#[test]
fn sms_parser_tests_smsto_message_keeps_later_colons() {
    assert_eq!(parse_sms("SMSTO:555:Meet at 10:30"), sms("555", "Meet at 10:30"));
}

#[test]
fn sms_parser_tests_decode_failure_falls_back_to_raw() {
    assert_eq!(parse_sms("sms:555?body=50%off"), sms("555", "50%off"));
}
