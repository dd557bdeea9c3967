#![warn(missing_docs)]
//! # qr-redirect-mapper
//!
//! ## Purpose
//! Maps a web URL to the native-app URIs that can open the same content.
//!
//! ## Responsibilities
//! - Hold the ordered platform rule table.
//! - Extract the identifiers each app deep link needs (video id, username,
//!   media id, track id, ...).
//! - Build intent URIs that name the app package and keep the original path
//!   and query.
//!
//! ## Data flow
//! URL payload -> [`map_to_targets`] -> [`RedirectTarget`] consumed by the
//! redirect race controller and the URL presenter.
//!
//! ## Error model
//! None. Unparseable or non-http(s) input yields a web-only target labelled
//! [`WEBSITE_LABEL`](qr_redirect_core::WEBSITE_LABEL).
//!
//! ## Example
//! ```rust
//! use qr_redirect_mapper::map_to_targets;
//!
//! let target = map_to_targets("https://youtu.be/abc123");
//! assert_eq!(target.platform_label, "YouTube");
//! assert_eq!(target.app_uri.as_deref(), Some("vnd.youtube://abc123"));
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use qr_redirect_core::RedirectTarget;
use tracing::debug;
use url::Url;

/// Characters left intact when embedding a value in a URI query.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Platforms with a native-app rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// youtube.com, youtu.be
    YouTube,
    /// instagram.com
    Instagram,
    /// tiktok.com
    TikTok,
    /// x.com, twitter.com
    X,
    /// facebook.com
    Facebook,
    /// linkedin.com
    LinkedIn,
    /// open.spotify.com
    Spotify,
    /// wa.me, whatsapp.com
    WhatsApp,
    /// t.me
    Telegram,
}

/// Deep-link candidates produced by a rule builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLinks {
    /// Custom-scheme URI.
    pub app_uri: String,
    /// Android package used for the intent URI, when one is known.
    pub package: Option<&'static str>,
}

/// One entry of the platform table.
#[derive(Debug, Clone, Copy)]
pub struct PlatformRule {
    /// Platform this rule resolves to.
    pub platform: Platform,
    /// Human-readable label.
    pub label: &'static str,
    /// Registrable domains matched by suffix.
    pub domains: &'static [&'static str],
    /// Derives deep links from the parsed URL.
    pub build: fn(&Url) -> AppLinks,
}

impl PlatformRule {
    /// Predicate: `true` when `host` is one of the rule's domains or a
    /// subdomain of one.
    pub fn matches(&self, host: &str) -> bool {
        self.domains.iter().any(|domain| host_in_domain(host, domain))
    }
}

/// Ordered rule table; first match wins.
pub const PLATFORM_RULES: &[PlatformRule] = &[
    PlatformRule {
        platform: Platform::YouTube,
        label: "YouTube",
        domains: &["youtube.com", "youtu.be", "youtube-nocookie.com"],
        build: youtube_links,
    },
    PlatformRule {
        platform: Platform::Instagram,
        label: "Instagram",
        domains: &["instagram.com", "instagr.am"],
        build: instagram_links,
    },
    PlatformRule {
        platform: Platform::TikTok,
        label: "TikTok",
        domains: &["tiktok.com"],
        build: tiktok_links,
    },
    PlatformRule {
        platform: Platform::X,
        label: "X",
        domains: &["x.com", "twitter.com"],
        build: x_links,
    },
    PlatformRule {
        platform: Platform::Facebook,
        label: "Facebook",
        domains: &["facebook.com", "fb.com", "fb.me", "fb.watch"],
        build: facebook_links,
    },
    PlatformRule {
        platform: Platform::LinkedIn,
        label: "LinkedIn",
        domains: &["linkedin.com", "lnkd.in"],
        build: linkedin_links,
    },
    PlatformRule {
        platform: Platform::Spotify,
        label: "Spotify",
        domains: &["spotify.com", "spotify.link"],
        build: spotify_links,
    },
    PlatformRule {
        platform: Platform::WhatsApp,
        label: "WhatsApp",
        domains: &["wa.me", "whatsapp.com"],
        build: whatsapp_links,
    },
    PlatformRule {
        platform: Platform::Telegram,
        label: "Telegram",
        domains: &["t.me", "telegram.me", "telegram.dog"],
        build: telegram_links,
    },
];

/// Returns the first rule whose predicate accepts `host`.
pub fn find_rule(host: &str) -> Option<&'static PlatformRule> {
    PLATFORM_RULES.iter().find(|rule| rule.matches(host))
}

/// Maps a web URL to native and web redirect targets.
///
/// Never fails. Input that is not an absolute http(s) URL with a host yields
/// a [`WEBSITE_LABEL`](qr_redirect_core::WEBSITE_LABEL) target whose `web_url` is the trimmed input.
pub fn map_to_targets(url: &str) -> RedirectTarget {
    let original = url.trim();
    let Some(parsed) = parse_web_url(original) else {
        debug!("malformed url, using web-only target");
        return RedirectTarget::website(original);
    };

    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    let Some(rule) = find_rule(&host) else {
        return RedirectTarget::website(original);
    };

    let links = (rule.build)(&parsed);
    let os_intent_uri = links
        .package
        .map(|package| intent_uri(&parsed, &host, package));
    debug!(
        platform = rule.label,
        has_intent = os_intent_uri.is_some(),
        "mapped url to platform"
    );

    RedirectTarget {
        app_uri: Some(links.app_uri),
        web_url: original.to_string(),
        platform_label: rule.label.to_string(),
        os_intent_uri,
    }
}

/// Strictly parses an absolute http(s) URL with a non-empty host.
pub fn parse_web_url(raw: &str) -> Option<Url> {
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return None;
    }

    let parsed = Url::parse(raw).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Some(parsed),
        _ => None,
    }
}

/// Builds `intent://<host><path>[?query]#Intent;package=<pkg>;scheme=https;end`.
pub fn intent_uri(url: &Url, host: &str, package: &str) -> String {
    let query = url
        .query()
        .map(|query| format!("?{query}"))
        .unwrap_or_default();
    format!(
        "intent://{host}{path}{query}#Intent;package={package};scheme=https;end",
        path = url.path()
    )
}

fn host_in_domain(host: &str, domain: &str) -> bool {
    host.strip_suffix(domain)
        .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
}

fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default()
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(name, value)| name == key && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Extracts a YouTube video id from short links, `?v=` and `/shorts/`-style paths.
pub fn youtube_video_id(url: &Url) -> Option<String> {
    let host = url.host_str().unwrap_or_default();
    let segments = segments(url);

    if host_in_domain(host, "youtu.be") {
        return segments.first().map(|id| (*id).to_string());
    }

    if let Some(id) = query_value(url, "v") {
        return Some(id);
    }

    match segments.as_slice() {
        ["shorts" | "embed" | "live" | "v", id, ..] => Some((*id).to_string()),
        _ => None,
    }
}

fn youtube_links(url: &Url) -> AppLinks {
    let app_uri = match youtube_video_id(url) {
        Some(id) => format!("vnd.youtube://{id}"),
        None => format!(
            "vnd.youtube://{}{}",
            url.host_str().unwrap_or_default(),
            url.path()
        ),
    };
    AppLinks {
        app_uri,
        package: Some("com.google.android.youtube"),
    }
}

fn instagram_links(url: &Url) -> AppLinks {
    let app_uri = match segments(url).as_slice() {
        [] => "instagram://app".to_string(),
        ["p" | "reel", id, ..] => format!("instagram://media?id={id}"),
        ["p" | "reel"] => "instagram://app".to_string(),
        [username, ..] => format!("instagram://user?username={username}"),
    };
    AppLinks {
        app_uri,
        package: Some("com.instagram.android"),
    }
}

fn tiktok_links(url: &Url) -> AppLinks {
    let app_uri = match segments(url).as_slice() {
        [user, "video", id, ..] if user.starts_with('@') => format!("tiktok://video/{id}"),
        [user, ..] if user.len() > 1 && user.starts_with('@') => {
            format!("tiktok://user?username={}", &user[1..])
        }
        _ => "tiktok://".to_string(),
    };
    AppLinks {
        app_uri,
        package: Some("com.zhiliaoapp.musically"),
    }
}

const X_RESERVED_PATHS: &[&str] = &[
    "home", "explore", "search", "i", "intent", "hashtag", "settings", "messages",
    "notifications",
];

fn x_links(url: &Url) -> AppLinks {
    match segments(url).as_slice() {
        [_, "status", id, ..] => AppLinks {
            app_uri: format!("twitter://status?id={id}"),
            package: Some("com.twitter.android"),
        },
        [user, ..] if !X_RESERVED_PATHS.contains(user) => AppLinks {
            app_uri: format!("twitter://user?screen_name={user}"),
            package: Some("com.twitter.android"),
        },
        _ => AppLinks {
            app_uri: "twitter://timeline".to_string(),
            package: None,
        },
    }
}

fn facebook_links(url: &Url) -> AppLinks {
    AppLinks {
        app_uri: format!(
            "fb://facewebmodal/f?href={}",
            encode_value(url.as_str())
        ),
        package: Some("com.facebook.katana"),
    }
}

fn linkedin_links(url: &Url) -> AppLinks {
    let app_uri = match segments(url).as_slice() {
        ["in", profile, ..] => format!("linkedin://in/{profile}"),
        ["company", company, ..] => format!("linkedin://company/{company}"),
        _ => "linkedin://".to_string(),
    };
    AppLinks {
        app_uri,
        package: None,
    }
}

const SPOTIFY_ENTITIES: &[&str] = &["track", "album", "playlist", "artist", "show", "episode"];

fn spotify_links(url: &Url) -> AppLinks {
    let mut segments = segments(url);
    // Localized links carry a leading `intl-xx` segment.
    if segments.first().is_some_and(|first| first.starts_with("intl-")) {
        segments.remove(0);
    }

    let app_uri = match segments.as_slice() {
        [entity, id, ..] if SPOTIFY_ENTITIES.contains(entity) => format!("spotify:{entity}:{id}"),
        _ => "spotify:".to_string(),
    };
    AppLinks {
        app_uri,
        package: None,
    }
}

fn whatsapp_links(url: &Url) -> AppLinks {
    let host = url.host_str().unwrap_or_default();
    let phone = if host_in_domain(host, "wa.me") {
        segments(url).first().map(|phone| (*phone).to_string())
    } else {
        query_value(url, "phone")
    };
    let text = query_value(url, "text");

    let app_uri = match (phone, text) {
        (Some(phone), Some(text)) => format!(
            "whatsapp://send?phone={}&text={}",
            encode_value(&phone),
            encode_value(&text)
        ),
        (Some(phone), None) => format!("whatsapp://send?phone={}", encode_value(&phone)),
        (None, Some(text)) => format!("whatsapp://send?text={}", encode_value(&text)),
        (None, None) => "whatsapp://".to_string(),
    };
    AppLinks {
        app_uri,
        package: Some("com.whatsapp"),
    }
}

fn telegram_links(url: &Url) -> AppLinks {
    let app_uri = match segments(url).as_slice() {
        ["joinchat", code, ..] => format!("tg://join?invite={code}"),
        [invite, ..] if invite.len() > 1 && invite.starts_with('+') => {
            format!("tg://join?invite={}", &invite[1..])
        }
        [name, ..] => format!("tg://resolve?domain={name}"),
        [] => "tg://".to_string(),
    };
    AppLinks {
        app_uri,
        package: None,
    }
}
