//! Integration tests for the password access gate.

mod common;

use std::sync::Arc;

use common::{CountingVerifier, RecordingNavigator, fixture_session};
use qr_redirect_core::{ContentKind, GateStatus, QrPayload};
use qr_redirect_gate::{AccessGate, INCORRECT_PASSWORD_MESSAGE};

#[test]
fn access_gate_tests_wrong_password_never_unlocks_and_keeps_input() {
    let verifier = CountingVerifier::new("opensesame");
    let mut gate = AccessGate::new(true);
    gate.begin_challenge();

    for attempt in 1..=25 {
        let denied = gate
            .submit(&verifier, Some("qr-7"), "guess")
            .expect_err("wrong password should be denied");
        assert_eq!(denied.message, INCORRECT_PASSWORD_MESSAGE);
        assert_eq!(gate.status(), GateStatus::Challenging);
        assert_eq!(gate.state().attempt_input, "guess");
        assert_eq!(
            gate.state().last_error.as_deref(),
            Some(INCORRECT_PASSWORD_MESSAGE)
        );
        assert_eq!(verifier.calls(), attempt);
    }
}

#[test]
fn access_gate_tests_correct_password_unlocks_exactly_once() {
    let verifier = CountingVerifier::new("opensesame");
    let mut gate = AccessGate::new(true);

    let _ = gate.submit(&verifier, None, "nope");
    let first = gate
        .submit(&verifier, None, "opensesame")
        .expect("correct password should unlock");
    assert!(first.first_unlock);
    assert_eq!(gate.status(), GateStatus::Unlocked);
    assert_eq!(gate.state().last_error, None);

    let again = gate
        .submit(&verifier, None, "anything")
        .expect("unlocked gate stays unlocked");
    assert!(!again.first_unlock);
    assert_eq!(gate.status(), GateStatus::Unlocked);
    assert_eq!(verifier.calls(), 2);
}

#[test]
fn access_gate_tests_session_submits_current_input() {
    let verifier = CountingVerifier::new("pw");
    let mut gate = AccessGate::new(true);
    gate.set_input("pw");
    gate.submit_current(&verifier, None)
        .expect("current input should unlock");
    assert!(gate.is_unlocked());
}

#[test]
fn access_gate_tests_unprotected_session_never_contacts_verifier() {
    let verifier = Arc::new(CountingVerifier::new("pw"));
    let mut session = fixture_session(
        QrPayload::new("hello", ContentKind::Text, false),
        Arc::new(RecordingNavigator::default()),
        verifier.clone(),
    );

    assert_eq!(session.gate_state().status, GateStatus::Unlocked);
    assert!(session.resolve().is_some());
    assert!(session.submit_password("pw").is_ok());
    assert_eq!(verifier.calls(), 0);
}
