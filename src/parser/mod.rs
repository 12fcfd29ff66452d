pub mod detail;
pub mod gallery;
pub mod json_pairs;
pub mod sanitize;

use serde::Serialize;
use tracing::{debug, info};

pub const GALLERY_BASE_URL: &str = "https://www.behance.net/gallery";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Videoclips,
    Commercial,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Videoclips => "videoclips",
            Category::Commercial => "commercial",
        }
    }
}

/// A project discovered on the profile page, before import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStub {
    pub external_id: String,
    pub title: String,
    pub source_url: String,
    pub cover_url: Option<String>,
    pub suggested_category: Category,
}

/// Profile extraction strategies, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `gallery/{id}/{slug}` links with a text window around each.
    GalleryLinks,
    /// Bare `"id":N,"name":"..."` pairs from embedded JSON.
    JsonObjects,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::GalleryLinks, Strategy::JsonObjects];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::GalleryLinks => "gallery_links",
            Strategy::JsonObjects => "json_objects",
        }
    }

    fn extract(&self, html: &str) -> Vec<ProjectStub> {
        match self {
            Strategy::GalleryLinks => gallery::extract(html),
            Strategy::JsonObjects => json_pairs::extract(html),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileParse {
    /// First strategy that produced candidates, if any.
    pub strategy: Option<Strategy>,
    pub stubs: Vec<ProjectStub>,
}

/// Extract project stubs from profile HTML.
///
/// Strategies run in priority order; the first one yielding any candidate
/// wins and later strategies are not consulted. Candidates then go through
/// title cleanup, the title guard, cover normalization and dedup.
pub fn parse_profile(html: &str) -> ProfileParse {
    for strategy in Strategy::ALL {
        let raw = strategy.extract(html);
        if raw.is_empty() {
            debug!(strategy = strategy.name(), "Strategy found nothing");
            continue;
        }

        let candidates = raw.len();
        let stubs = postprocess(raw);
        info!(
            strategy = strategy.name(),
            candidates,
            kept = stubs.len(),
            "Profile strategy matched"
        );
        return ProfileParse {
            strategy: Some(strategy),
            stubs,
        };
    }

    info!(bytes = html.len(), "No profile strategy matched");
    ProfileParse::default()
}

fn postprocess(raw: Vec<ProjectStub>) -> Vec<ProjectStub> {
    let cleaned = raw
        .into_iter()
        .filter_map(|mut stub| {
            stub.title = sanitize::clean_title(&stub.title);
            if !sanitize::is_plausible_title(&stub.title) {
                debug!(id = %stub.external_id, title = %stub.title, "Discarding stub");
                return None;
            }
            stub.cover_url = stub
                .cover_url
                .as_deref()
                .and_then(sanitize::normalize_cover_url);
            Some(stub)
        })
        .collect();
    sanitize::dedup_by_external_id(cleaned)
}
