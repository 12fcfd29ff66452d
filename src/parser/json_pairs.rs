use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{Category, ProjectStub, GALLERY_BASE_URL};

static ID_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""id"\s*:\s*(\d+)\s*,\s*"name"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap()
});

/// Fallback for pages whose project list only survives as embedded JSON.
/// No cover is available here and the detail URL uses a generic slug.
pub fn extract(html: &str) -> Vec<ProjectStub> {
    let mut seen = HashSet::new();

    ID_NAME_RE
        .captures_iter(html)
        .filter(|caps| seen.insert(caps[1].to_string()))
        .map(|caps| ProjectStub {
            external_id: caps[1].to_string(),
            title: caps[2].to_string(),
            source_url: format!("{}/{}/project", GALLERY_BASE_URL, &caps[1]),
            cover_url: None,
            suggested_category: Category::Videoclips,
        })
        .collect()
}
