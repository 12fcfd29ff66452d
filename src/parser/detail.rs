use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

// Each pattern accepts literal or JSON-escaped slashes.
static YOUTUBE_EMBED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"youtube\.com\\?/embed\\?/([^"'&?/\\\s<>]{11})"#).unwrap()
});
static YOUTUBE_SHORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"youtu\.be\\?/([^"'&?/\\\s<>]{11})"#).unwrap());
static VIMEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com\\?/video\\?/(\d{5,15})").unwrap());

struct VideoPattern {
    platform: &'static str,
    re: &'static LazyLock<Regex>,
    canonical: fn(&str) -> String,
}

static PATTERNS: [VideoPattern; 3] = [
    VideoPattern {
        platform: "youtube_embed",
        re: &YOUTUBE_EMBED_RE,
        canonical: youtube_watch_url,
    },
    VideoPattern {
        platform: "youtube_short",
        re: &YOUTUBE_SHORT_RE,
        canonical: youtube_watch_url,
    },
    VideoPattern {
        platform: "vimeo",
        re: &VIMEO_RE,
        canonical: vimeo_url,
    },
];

fn youtube_watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

fn vimeo_url(id: &str) -> String {
    format!("https://vimeo.com/{}", id)
}

/// Find a playable video URL in a project detail page.
///
/// Patterns are tried in priority order and only their first match counts.
/// A match carrying template braces is skipped in favor of the next pattern.
pub fn parse_video_ref(html: &str) -> Option<String> {
    PATTERNS.iter().find_map(|p| {
        let id = p.re.captures(html)?.get(1)?.as_str();
        if id.contains('{') {
            debug!(platform = p.platform, id, "Rejecting templated video id");
            return None;
        }
        Some((p.canonical)(id))
    })
}
