//! Integration tests for VERSION propagation into reports.

use std::fs;
use std::sync::Arc;

use qr_redirect_app::{
    ResolverConfig, ResolverSession, SessionCollaborators, UnavailableVerifier, app_version,
};
use qr_redirect_core::{ContentKind, QrPayload};
use qr_redirect_race::{DisabledHandoffSignal, Navigator};

struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&self, _uri: &str) {}
}

#[test]
fn version_display_tests_matches_root_version_file() {
    let root_version_path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../VERSION");
    let root_version = fs::read_to_string(root_version_path).expect("VERSION should be readable");
    assert_eq!(app_version(), root_version.trim());
}

#[test]
fn version_display_tests_report_carries_app_version() {
    let mut session = ResolverSession::new(
        QrPayload::new("hello", ContentKind::Text, false),
        &ResolverConfig::default(),
        SessionCollaborators {
            navigator: Arc::new(NullNavigator),
            handoff_signal: Arc::new(DisabledHandoffSignal),
            verifier: Arc::new(UnavailableVerifier),
        },
    )
    .expect("session should build");

    assert_eq!(session.report(0).version, app_version());
}
