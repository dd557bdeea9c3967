//! Validates contract fixtures and live reports against frozen JSON schemas.

use std::sync::Arc;

use qr_redirect_app::{
    ResolverConfig, ResolverSession, SessionCollaborators, UnavailableVerifier, decode_payload,
};
use qr_redirect_contract_tests::{compile_validator, load_contract_json};
use qr_redirect_core::{ContentKind, QrPayload};
use qr_redirect_race::{DisabledHandoffSignal, Navigator};

struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&self, _uri: &str) {}
}

fn session(payload: QrPayload) -> ResolverSession {
    ResolverSession::new(
        payload,
        &ResolverConfig::default(),
        SessionCollaborators {
            navigator: Arc::new(NullNavigator),
            handoff_signal: Arc::new(DisabledHandoffSignal),
            verifier: Arc::new(UnavailableVerifier),
        },
    )
    .expect("session should build")
}

#[test]
fn payload_fixture_matches_schema() {
    let validator = compile_validator("qr-payload.schema.json").expect("schema should compile");
    let fixture = load_contract_json("fixtures/qr-payload.valid.json").expect("fixture should load");
    assert!(
        validator.is_valid(&fixture),
        "payload fixture should validate against schema"
    );

    let raw = serde_json::to_vec(&fixture).expect("fixture should encode");
    let payload = decode_payload(&raw).expect("fixture should decode");
    assert_eq!(payload.declared_type, ContentKind::Url);
    assert!(payload.is_password_protected);
}

#[test]
fn report_fixtures_match_schema() {
    let validator = compile_validator("resolution-report.schema.json").expect("schema should compile");
    for fixture in [
        "fixtures/resolution-report.valid.json",
        "fixtures/resolution-report.locked.json",
    ] {
        assert!(
            validator.is_valid(&load_contract_json(fixture).expect("fixture should load")),
            "{fixture} should validate against schema"
        );
    }
}

#[test]
fn live_reports_match_schema() {
    let validator = compile_validator("resolution-report.schema.json").expect("schema should compile");
    let payloads = [
        QrPayload::new("https://youtu.be/abc123", ContentKind::Url, false),
        QrPayload::new("WIFI:T:WPA;S:Office;P:hunter2;;", ContentKind::Wifi, false),
        QrPayload::new("geo:48.8584,2.2945", ContentKind::Location, false),
        QrPayload::new("top secret", ContentKind::Text, true),
    ];

    for payload in payloads {
        let mut session = session(payload);
        session.begin_redirect(0);
        session.poll(10_000);
        let report = serde_json::to_value(session.report(10_000)).expect("report should encode");
        assert!(validator.is_valid(&report), "report should validate: {report}");
    }
}

#[test]
fn payload_schema_rejects_unknown_kind() {
    let validator = compile_validator("qr-payload.schema.json").expect("schema should compile");
    let payload = serde_json::json!({
        "raw_content": "hello",
        "declared_type": "hologram"
    });
    assert!(!validator.is_valid(&payload));
}
