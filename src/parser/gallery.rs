use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{Category, ProjectStub, GALLERY_BASE_URL};

// Slashes may be JSON-escaped (`gallery\/123\/slug`) when the link sits in an inline script.
static GALLERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"gallery\\?/(\d+)(?:\\?/([A-Za-z0-9_%-]+))?").unwrap()
});
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""name"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">([^<>]{5,50})<").unwrap());
static COVER_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:original|max_1200|808|max_808|404|405)"\s*:\s*"([^"]+)""#).unwrap()
});
static COVER_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:https?:)?(?:\\?/){2}[^\s"'<>()]*?/(?:original|max_1200|max_808|808|404|405)/[^\s"'<>()]*?\.(?:jpg|png|webp)"#,
    )
    .unwrap()
});

const WINDOW_BEFORE: usize = 1000;
const WINDOW_AFTER: usize = 2000;

/// Scan for `gallery/{id}` links. The first occurrence of each id is kept;
/// title and cover are searched for in a window around that occurrence,
/// looking after the link first and only then before it.
pub fn extract(html: &str) -> Vec<ProjectStub> {
    let mut seen = HashSet::new();
    let mut stubs = Vec::new();

    for caps in GALLERY_RE.captures_iter(html) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let id = id.as_str();
        if !seen.insert(id.to_string()) {
            continue;
        }

        let (before, after) = window_around(html, whole.start(), whole.end());
        let source_url = match caps.get(2) {
            Some(slug) => format!("{}/{}/{}", GALLERY_BASE_URL, id, slug.as_str()),
            None => format!("{}/{}", GALLERY_BASE_URL, id),
        };

        stubs.push(ProjectStub {
            external_id: id.to_string(),
            title: find_title(after)
                .or_else(|| find_title(before))
                .unwrap_or_default(),
            source_url,
            cover_url: find_cover(after).or_else(|| find_cover(before)),
            suggested_category: Category::Videoclips,
        });
    }

    stubs
}

/// Text before the link, and text from the link onward. On compact listings
/// the part before belongs to the previous card.
fn window_around(html: &str, start: usize, end: usize) -> (&str, &str) {
    let from = floor_boundary(html, start.saturating_sub(WINDOW_BEFORE));
    let to = ceil_boundary(html, end.saturating_add(WINDOW_AFTER).min(html.len()));
    (&html[from..start], &html[start..to])
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

fn find_title(window: &str) -> Option<String> {
    if let Some(caps) = NAME_RE.captures(window) {
        return Some(caps[1].to_string());
    }
    TEXT_RE
        .captures_iter(window)
        .map(|c| c[1].trim().to_string())
        .find(|t| t.chars().count() >= 5)
}

fn find_cover(window: &str) -> Option<String> {
    if let Some(caps) = COVER_FIELD_RE.captures(window) {
        return Some(caps[1].to_string());
    }
    COVER_URL_RE.find(window).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_with_slug_and_name_field() {
        let html = r#"<div><a href="https://www.behance.net/gallery/123456/Summer-Reel">
            <script>{"name":"Summer Reel","covers":{"max_808":"//mir-s3-cdn-cf.behance.net/projects/808/abc.jpg"}}</script></div>"#;
        let stubs = extract(html);
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].external_id, "123456");
        assert_eq!(stubs[0].title, "Summer Reel");
        assert_eq!(stubs[0].source_url, "https://www.behance.net/gallery/123456/Summer-Reel");
        assert_eq!(
            stubs[0].cover_url.as_deref(),
            Some("//mir-s3-cdn-cf.behance.net/projects/808/abc.jpg")
        );
    }

    #[test]
    fn bare_gallery_link() {
        let html = r#"<a href="/gallery/42">Untitled Project Name</a>"#;
        let stubs = extract(html);
        assert_eq!(stubs[0].source_url, "https://www.behance.net/gallery/42");
        assert_eq!(stubs[0].title, "Untitled Project Name");
    }

    #[test]
    fn escaped_slashes() {
        let html = r#"{"url":"https:\/\/www.behance.net\/gallery\/987\/Brand-Film","name":"Brand Film"}"#;
        let stubs = extract(html);
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].external_id, "987");
        assert_eq!(stubs[0].source_url, "https://www.behance.net/gallery/987/Brand-Film");
    }

    #[test]
    fn first_occurrence_wins() {
        let html = r#"<a href="/gallery/5/First-Slug">one</a> <a href="/gallery/5/Second-Slug">two</a>"#;
        let stubs = extract(html);
        assert_eq!(stubs.len(), 1);
        assert!(stubs[0].source_url.ends_with("First-Slug"));
    }

    #[test]
    fn cover_url_fallback_scan() {
        let html = r#"<a href="/gallery/77/Clip"><img src="https://mir-s3-cdn-cf.behance.net/projects/404/cover77.png"></a>"#;
        let stubs = extract(html);
        assert_eq!(
            stubs[0].cover_url.as_deref(),
            Some("https://mir-s3-cdn-cf.behance.net/projects/404/cover77.png")
        );
    }

    #[test]
    fn cover_field_preferred_over_url_scan() {
        let html = r#"<img src="https://cdn.example.net/p/404/early.jpg">
            <a href="/gallery/8/Spot">x</a>{"original":"https://cdn.example.net/p/original/field.jpg"}"#;
        let stubs = extract(html);
        assert_eq!(
            stubs[0].cover_url.as_deref(),
            Some("https://cdn.example.net/p/original/field.jpg")
        );
    }

    #[test]
    fn window_is_bounded() {
        let padding = "x".repeat(WINDOW_AFTER + 100);
        let html = format!(r#"<a href="/gallery/9/Far">x</a>{}{{"name":"Too Far Away"}}"#, padding);
        let stubs = extract(&html);
        assert_eq!(stubs.len(), 1);
        assert_ne!(stubs[0].title, "Too Far Away");
    }

    #[test]
    fn window_respects_multibyte_text() {
        let html = format!("{}<a href=\"/gallery/3/Ré\">Résumé du projet</a>", "é".repeat(800));
        let stubs = extract(&html);
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].title, "Résumé du projet");
    }

    #[test]
    fn adjacent_cards_keep_their_own_names() {
        let html = r#"<div><a href="/gallery/1/Alpha-Film"></a>{"name":"Alpha Film"}</div><div><a href="/gallery/2/Beta-Spot"></a>{"name":"Beta Spot"}</div>"#;
        let got: Vec<_> = extract(html)
            .into_iter()
            .map(|s| (s.external_id, s.title))
            .collect();
        assert_eq!(
            got,
            vec![
                ("1".to_string(), "Alpha Film".to_string()),
                ("2".to_string(), "Beta Spot".to_string()),
            ]
        );
    }

    #[test]
    fn adjacent_cards_keep_their_own_covers() {
        let html = r#"<a href="/gallery/1/A"><img src="https://cdn.example.net/p/404/one.jpg"></a><a href="/gallery/2/B"><img src="https://cdn.example.net/p/404/two.jpg"></a>"#;
        let stubs = extract(html);
        assert_eq!(
            stubs[0].cover_url.as_deref(),
            Some("https://cdn.example.net/p/404/one.jpg")
        );
        assert_eq!(
            stubs[1].cover_url.as_deref(),
            Some("https://cdn.example.net/p/404/two.jpg")
        );
    }

    #[test]
    fn name_before_link_used_when_nothing_follows() {
        let html = r#"{"name":"Lead Name"}<a href="/gallery/6/Lead"></a>"#;
        let stubs = extract(html);
        assert_eq!(stubs[0].title, "Lead Name");
    }

    #[test]
    fn padded_short_text_is_not_a_title() {
        let html = r#"<a href="/gallery/4/X">   abcd   </a>"#;
        assert_eq!(extract(html)[0].title, "");

        let html = r#"<a href="/gallery/4/X">   abcd   </a><span>Night Drive</span>"#;
        assert_eq!(extract(html)[0].title, "Night Drive");
    }

    #[test]
    fn no_links_no_stubs() {
        assert!(extract("<html><body>portfolio</body></html>").is_empty());
    }
}
