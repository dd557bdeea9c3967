//! Integration tests for the native-vs-web redirect race.

mod common;

use std::sync::Arc;

use common::RecordingNavigator;
use qr_redirect_core::RedirectTarget;
use qr_redirect_mapper::map_to_targets;
use qr_redirect_race::{
    ClientPlatform, DisabledHandoffSignal, RaceConfig, RaceState, RedirectRaceController,
    VisibilityTracker,
};

fn race(navigator: Arc<RecordingNavigator>) -> RedirectRaceController {
    let config = RaceConfig::new(1_000, 100, ClientPlatform::Ios, false).expect("valid config");
    RedirectRaceController::new(config, navigator, Arc::new(DisabledHandoffSignal))
}

#[test]
fn redirect_race_tests_missing_app_uri_falls_back_immediately() {
    let navigator = Arc::new(RecordingNavigator::default());
    let mut controller = race(navigator.clone());

    let state = controller.start(RedirectTarget::website("https://example.com/menu"), 10);
    assert_eq!(state, RaceState::Fallback);
    assert_eq!(navigator.visited(), vec!["https://example.com/menu"]);
    assert!(controller.pending_timer().is_none());
    assert_eq!(controller.progress(10).elapsed_ratio, 1.0);
}

#[test]
fn redirect_race_tests_falls_back_after_timeout() {
    let navigator = Arc::new(RecordingNavigator::default());
    let mut controller = race(navigator.clone());

    controller.start(map_to_targets("https://youtu.be/abc123"), 0);
    assert_eq!(controller.state(), RaceState::Attempting);
    assert_eq!(navigator.visited(), vec!["vnd.youtube://abc123"]);

    assert_eq!(controller.poll(999), RaceState::Attempting);
    assert_eq!(navigator.visited().len(), 1);

    assert_eq!(controller.poll(1_000), RaceState::Fallback);
    assert_eq!(controller.poll(5_000), RaceState::Fallback);
    assert_eq!(
        navigator.visited(),
        vec!["vnd.youtube://abc123", "https://youtu.be/abc123"]
    );
}

#[test]
fn redirect_race_tests_teardown_prevents_stale_navigation() {
    let navigator = Arc::new(RecordingNavigator::default());
    let mut controller = race(navigator.clone());

    controller.start(map_to_targets("https://instagram.com/someuser"), 0);
    controller.teardown();

    assert_eq!(controller.poll(10_000), RaceState::Cancelled);
    assert_eq!(controller.start(RedirectTarget::website("https://a.test"), 10_001), RaceState::Cancelled);
    assert_eq!(navigator.visited(), vec!["instagram://user?username=someuser"]);
}

#[test]
fn redirect_race_tests_dropping_controller_cancels_fallback() {
    let navigator = Arc::new(RecordingNavigator::default());
    {
        let mut controller = race(navigator.clone());
        controller.start(map_to_targets("https://t.me/channel"), 0);
    }
    assert_eq!(navigator.visited(), vec!["tg://resolve?domain=channel"]);
}

#[test]
fn redirect_race_tests_restart_cancels_prior_timer() {
    let navigator = Arc::new(RecordingNavigator::default());
    let mut controller = race(navigator.clone());

    controller.start(map_to_targets("https://youtu.be/first"), 0);
    controller.start(map_to_targets("https://youtu.be/second"), 500);

    // The first window would have ended at 1_000.
    assert_eq!(controller.poll(1_000), RaceState::Attempting);
    assert_eq!(controller.poll(1_500), RaceState::Fallback);
    controller.poll(3_000);

    let fallbacks: Vec<String> = navigator
        .visited()
        .into_iter()
        .filter(|uri| uri.starts_with("https://"))
        .collect();
    assert_eq!(fallbacks, vec!["https://youtu.be/second"]);
}

#[test]
fn redirect_race_tests_visibility_round_trip_is_handoff() {
    let navigator = Arc::new(RecordingNavigator::default());
    let tracker = Arc::new(VisibilityTracker::new());
    let config = RaceConfig::new(1_000, 100, ClientPlatform::Android, false).expect("valid config");
    let mut controller = RedirectRaceController::new(config, navigator.clone(), tracker.clone());

    controller.start(map_to_targets("https://wa.me/15551234567"), 0);
    tracker.record_hidden(200);
    assert_eq!(controller.poll(300), RaceState::Attempting);
    tracker.record_visible(700);
    assert_eq!(controller.poll(800), RaceState::HandedOff);
    assert_eq!(controller.poll(2_000), RaceState::HandedOff);

    let visited = navigator.visited();
    assert_eq!(visited.len(), 1);
    assert!(visited[0].starts_with("intent://wa.me/15551234567#Intent;package=com.whatsapp"));
}

#[test]
fn redirect_race_tests_late_visibility_round_trip_still_falls_back() {
    let navigator = Arc::new(RecordingNavigator::default());
    let tracker = Arc::new(VisibilityTracker::new());
    let config = RaceConfig::new(1_000, 100, ClientPlatform::Ios, false).expect("valid config");
    let mut controller = RedirectRaceController::new(config, navigator.clone(), tracker.clone());

    controller.start(map_to_targets("https://youtu.be/abc"), 0);
    tracker.record_hidden(1_500);
    tracker.record_visible(1_600);

    assert_eq!(controller.poll(1_700), RaceState::Fallback);
    assert_eq!(
        navigator.visited(),
        vec!["vnd.youtube://abc", "https://youtu.be/abc"]
    );
}

#[test]
fn redirect_race_tests_progress_is_monotonic() {
    let navigator = Arc::new(RecordingNavigator::default());
    let mut controller = race(navigator);
    assert_eq!(controller.progress(0).elapsed_ratio, 0.0);

    controller.start(map_to_targets("https://open.spotify.com/track/1"), 0);
    let mut last = 0.0;
    for now in [100, 400, 250, 900, 50] {
        controller.poll(now);
        let progress = controller.progress(now);
        assert!(progress.elapsed_ratio >= last);
        assert!((0.0..=1.0).contains(&progress.elapsed_ratio));
        assert_eq!(progress.resolved_platform.as_deref(), Some("Spotify"));
        last = progress.elapsed_ratio;
    }
    assert_eq!(last, 0.9);

    controller.poll(1_000);
    assert_eq!(controller.progress(1_000).elapsed_ratio, 1.0);
}
