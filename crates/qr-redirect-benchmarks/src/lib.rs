//! Representative scan corpus for latency smoke checks.

use qr_redirect_core::{ContentKind, QrPayload};

/// One payload per content kind plus every recognized platform host.
pub fn sample_payloads() -> Vec<QrPayload> {
    [
        ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", ContentKind::Url),
        ("https://www.instagram.com/p/Cx1yZ", ContentKind::Url),
        ("https://www.tiktok.com/@creator/video/7001", ContentKind::Url),
        ("https://x.com/someone/status/42", ContentKind::Url),
        ("https://www.facebook.com/somepage", ContentKind::Url),
        ("https://www.linkedin.com/in/someone", ContentKind::Url),
        ("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC", ContentKind::Url),
        ("https://wa.me/15551234567?text=hi", ContentKind::Url),
        ("https://t.me/channel", ContentKind::Url),
        ("https://example.com/menu", ContentKind::Url),
        (
            "BEGIN:VCARD\nVERSION:3.0\nN:Lovelace;Ada;;;\nTEL:+441234567\nEND:VCARD",
            ContentKind::Vcard,
        ),
        ("WIFI:T:WPA;S:Office;P:correct horse;;", ContentKind::Wifi),
        ("sms:+15550100?body=hello%20there", ContentKind::Sms),
        ("mailto:help@example.test?subject=Hi", ContentKind::Email),
        ("tel:+15550199", ContentKind::Phone),
        ("geo:51.5007,-0.1246?q=Big%20Ben", ContentKind::Location),
        ("5551234", ContentKind::Phone),
        ("plain text note", ContentKind::Text),
    ]
    .into_iter()
    .map(|(raw, declared)| QrPayload::new(raw, declared, false))
    .collect()
}
