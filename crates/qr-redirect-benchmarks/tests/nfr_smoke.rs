//! Benchmark smoke test for the classify/map/dispatch loop.

use std::time::Instant;

use qr_redirect_benchmarks::sample_payloads;
use qr_redirect_classifier::{classify_payload, resolve_kind};
use qr_redirect_presenter::{copy_requests, dispatch};

#[test]
fn benchmark_resolution_smoke_prints_latency() {
    let payloads = sample_payloads();
    let start = Instant::now();
    let mut copyable = 0usize;

    for _ in 0..1_000 {
        for payload in &payloads {
            let selection = dispatch(resolve_kind(payload), classify_payload(payload));
            copyable += copy_requests(&selection).len();
        }
    }

    let elapsed_ms = start.elapsed().as_millis();
    println!("benchmark_resolution_elapsed_ms={elapsed_ms}");
    println!("benchmark_copyable_fields_total={copyable}");

    assert!(copyable > 0);
    // Lightweight guardrail; strict latency targets are environment-specific.
    assert!(
        elapsed_ms < 5_000,
        "resolution smoke benchmark should stay bounded"
    );
}
