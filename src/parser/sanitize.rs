use std::collections::HashSet;

use super::ProjectStub;

/// Decode JSON-style `\uXXXX` escapes, including surrogate pairs.
/// Malformed escapes are left as-is.
pub fn decode_unicode_escapes(s: &str) -> String {
    if !s.contains("\\u") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut units: Vec<u16> = Vec::new();
    let mut rest = s;

    while let Some(ch) = rest.chars().next() {
        if let Some(unit) = escape_unit(rest) {
            units.push(unit);
            rest = &rest[6..];
            continue;
        }
        flush_units(&mut units, &mut out);
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    flush_units(&mut units, &mut out);
    out
}

fn escape_unit(s: &str) -> Option<u16> {
    let hex = s.strip_prefix("\\u")?.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    out.extend(
        char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Clean a raw title lifted out of markup or embedded JSON.
pub fn clean_title(raw: &str) -> String {
    let unescaped = raw.replace("\\/", "/").replace("\\\"", "\"");
    let decoded = decode_entities(&decode_unicode_escapes(&unescaped));
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, '"' | '\\' | ',' | ';' | ':'))
        .trim()
        .to_string()
}

/// Titles of three characters or fewer, or carrying template braces,
/// come from parser confusion rather than real projects.
pub fn is_plausible_title(title: &str) -> bool {
    title.chars().count() > 3 && !title.contains('{') && !title.contains('}')
}

/// Normalize a cover image value to an absolute URL.
///
/// srcset-like lists keep their first token; protocol-relative URLs get
/// `https:`; bare CDN hosts get `https://`.
pub fn normalize_cover_url(raw: &str) -> Option<String> {
    let unescaped = raw.replace("\\/", "/");
    let first = unescaped
        .split(|c: char| c.is_whitespace() || c == ',')
        .find(|t| !t.is_empty())?;

    let url = if first.starts_with("//") {
        format!("https:{}", first)
    } else if first.starts_with("https://") || first.starts_with("http://") {
        first.to_string()
    } else if looks_like_bare_host(first) {
        format!("https://{}", first)
    } else {
        first.to_string()
    };
    Some(url)
}

fn looks_like_bare_host(s: &str) -> bool {
    let host = s.split('/').next().unwrap_or("");
    s.contains('/')
        && host.contains('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Keep the first stub for each external id, preserving order.
pub fn dedup_by_external_id(stubs: Vec<ProjectStub>) -> Vec<ProjectStub> {
    let mut seen = HashSet::new();
    stubs
        .into_iter()
        .filter(|s| seen.insert(s.external_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Category;

    fn stub(id: &str, title: &str) -> ProjectStub {
        ProjectStub {
            external_id: id.into(),
            title: title.into(),
            source_url: format!("https://www.behance.net/gallery/{}", id),
            cover_url: None,
            suggested_category: Category::Videoclips,
        }
    }

    #[test]
    fn protocol_relative_cover() {
        assert_eq!(
            normalize_cover_url("//mir-s3-cdn-cf.behance.net/x/original/foo.jpg").as_deref(),
            Some("https://mir-s3-cdn-cf.behance.net/x/original/foo.jpg")
        );
    }

    #[test]
    fn bare_host_cover() {
        assert_eq!(
            normalize_cover_url("mir-s3-cdn-cf.behance.net/projects/404/abc.png").as_deref(),
            Some("https://mir-s3-cdn-cf.behance.net/projects/404/abc.png")
        );
    }

    #[test]
    fn srcset_takes_first_candidate() {
        let srcset = "https://cdn.example.net/a/808/one.jpg 1x, https://cdn.example.net/a/original/two.jpg 2x";
        assert_eq!(
            normalize_cover_url(srcset).as_deref(),
            Some("https://cdn.example.net/a/808/one.jpg")
        );
    }

    #[test]
    fn escaped_slashes_in_cover() {
        assert_eq!(
            normalize_cover_url(r"https:\/\/cdn.example.net\/max_1200\/x.webp").as_deref(),
            Some("https://cdn.example.net/max_1200/x.webp")
        );
    }

    #[test]
    fn blank_cover_is_none() {
        assert!(normalize_cover_url("  ,  ").is_none());
    }

    #[test]
    fn absolute_and_relative_paths_untouched() {
        assert_eq!(
            normalize_cover_url("https://a.b/c.jpg").as_deref(),
            Some("https://a.b/c.jpg")
        );
        assert_eq!(
            normalize_cover_url("/images/local.jpg").as_deref(),
            Some("/images/local.jpg")
        );
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(decode_unicode_escapes(r"Caf\u00e9"), "Café");
        assert_eq!(decode_unicode_escapes(r"\ud83c\udfac Reel"), "\u{1f3ac} Reel");
        assert_eq!(decode_unicode_escapes(r"bad \u12 escape"), r"bad \u12 escape");
        assert_eq!(decode_unicode_escapes("plain"), "plain");
    }

    #[test]
    fn title_cleanup() {
        assert_eq!(clean_title(r#"  Brand & Co ""#), "Brand & Co");
        assert_eq!(clean_title("Tom &amp; Jerry,"), "Tom & Jerry");
        assert_eq!(clean_title("Line\n   break"), "Line break");
        assert_eq!(clean_title(r"AC\/DC Tribute"), "AC/DC Tribute");
    }

    #[test]
    fn plausible_titles() {
        assert!(is_plausible_title("Summer Reel"));
        assert!(!is_plausible_title("Ad"));
        assert!(!is_plausible_title("abc"));
        assert!(!is_plausible_title("{{title}}"));
        assert!(!is_plausible_title("Open } brace"));
    }

    #[test]
    fn dedup_keeps_first() {
        let stubs = vec![stub("1", "First"), stub("2", "Second"), stub("1", "Again")];
        let out = dedup_by_external_id(stubs);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "First");
        assert_eq!(out[1].external_id, "2");
    }
}
