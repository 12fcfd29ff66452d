use std::collections::HashSet;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::db::{self, NewProject, SyncRunRow};
use crate::error::SyncError;
use crate::fetch::PageFetcher;
use crate::parser::{self, detail, Category, ProjectStub, Strategy};

/// Description stored on every imported project. Display code blanks it.
pub const IMPORTED_DESCRIPTION: &str = "Imported from Behance";

#[derive(Debug, Clone, Serialize)]
pub struct ImportedProject {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub video_url: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub profile_url: String,
    pub strategy: Strategy,
    /// Stubs the profile parser produced.
    pub found: usize,
    pub imported: Vec<ImportedProject>,
    pub skipped_titles: Vec<String>,
}

impl SyncReport {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }
}

/// A found video makes it a clip; otherwise fall back to the title.
pub fn resolve_category(video_ref: Option<&str>, title: &str) -> Category {
    if video_ref.is_some() || title.to_lowercase().contains("video") {
        Category::Videoclips
    } else {
        Category::Commercial
    }
}

/// Import projects from a profile page that are not stored yet.
///
/// Existing projects are never updated. Detail pages are fetched one at a
/// time for new stubs only; all new projects are then written in a single
/// transaction, appended after the current last sort position.
pub async fn sync_profile<F: PageFetcher>(
    conn: &Connection,
    fetcher: &F,
    settings: &Settings,
    profile_url: &str,
) -> Result<SyncReport, SyncError> {
    info!(profile_url, "Fetching profile");
    let html = fetcher
        .fetch(profile_url)
        .await
        .map_err(SyncError::ProfileUnavailable)?;

    let parse = parser::parse_profile(&html);
    let strategy = match parse.strategy {
        Some(s) if !parse.stubs.is_empty() => s,
        _ => {
            return Err(SyncError::NoProjectsFound {
                page_bytes: html.len(),
            })
        }
    };
    let found = parse.stubs.len();

    let (fresh, skipped_titles) = partition_new(conn, parse.stubs)?;
    info!(found, new = fresh.len(), skipped = skipped_titles.len(), "Checked for existing projects");

    let pb = ProgressBar::new(fresh.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut planned = Vec::with_capacity(fresh.len());
    for stub in fresh {
        pb.set_message(stub.title.clone());
        let video_ref = match fetcher.fetch(&stub.source_url).await {
            Ok(detail_html) => detail::parse_video_ref(&detail_html),
            Err(_) => None,
        };
        let category = resolve_category(video_ref.as_deref(), &stub.title);
        info!(
            title = %stub.title,
            category = category.as_str(),
            video = video_ref.as_deref().unwrap_or("-"),
            "Planned import"
        );
        planned.push((stub, category, video_ref));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let first_order = db::next_sort_order(conn)?;
    let rows: Vec<NewProject> = planned
        .iter()
        .zip(first_order..)
        .map(|((stub, category, video_ref), sort_order)| NewProject {
            title: stub.title.clone(),
            description: IMPORTED_DESCRIPTION.to_string(),
            category: category.as_str().to_string(),
            image_url: stub
                .cover_url
                .clone()
                .unwrap_or_else(|| settings.placeholder_image.clone()),
            video_url: video_ref.clone(),
            source_url: Some(stub.source_url.clone()),
            external_id: Some(stub.external_id.clone()),
            published: true,
            sort_order,
            author_id: settings.author_id.clone(),
        })
        .collect();
    let ids = db::insert_projects(conn, &rows)?;

    let imported = ids
        .into_iter()
        .zip(rows)
        .zip(planned)
        .map(|((id, row), (_, category, _))| ImportedProject {
            id,
            title: row.title,
            category,
            video_url: row.video_url,
            sort_order: row.sort_order,
        })
        .collect::<Vec<_>>();

    info!(
        imported = imported.len(),
        skipped = skipped_titles.len(),
        strategy = strategy.name(),
        "Sync finished"
    );

    Ok(SyncReport {
        profile_url: profile_url.to_string(),
        strategy,
        found,
        imported,
        skipped_titles,
    })
}

/// Split stubs into new ones and titles of those already stored or
/// repeated earlier in the same pass.
fn partition_new(
    conn: &Connection,
    stubs: Vec<ProjectStub>,
) -> Result<(Vec<ProjectStub>, Vec<String>), SyncError> {
    let mut fresh = Vec::new();
    let mut skipped = Vec::new();
    let mut titles = HashSet::new();
    let mut urls = HashSet::new();

    for stub in stubs {
        if let Some(id) = db::find_existing(conn, &stub.title, &stub.source_url)? {
            info!(title = %stub.title, existing_id = id, "Already imported, skipping");
            skipped.push(stub.title);
            continue;
        }
        if titles.contains(&stub.title) || urls.contains(&stub.source_url) {
            info!(title = %stub.title, "Repeated within this pass, skipping");
            skipped.push(stub.title);
            continue;
        }
        titles.insert(stub.title.clone());
        urls.insert(stub.source_url.clone());
        fresh.push(stub);
    }

    Ok((fresh, skipped))
}

/// Run a sync pass and record its outcome in `sync_runs`, success or not.
pub async fn run_and_record<F: PageFetcher>(
    conn: &Connection,
    fetcher: &F,
    settings: &Settings,
    profile_url: &str,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    let result = sync_profile(conn, fetcher, settings, profile_url).await;

    let run = match &result {
        Ok(report) => SyncRunRow {
            profile_url: profile_url.to_string(),
            strategy: Some(report.strategy.name().to_string()),
            found: report.found,
            imported: report.imported_count(),
            skipped: report.skipped_titles.len(),
            error: None,
            started_at,
            finished_at: Utc::now(),
        },
        Err(e) => SyncRunRow {
            profile_url: profile_url.to_string(),
            strategy: None,
            found: 0,
            imported: 0,
            skipped: 0,
            error: Some(format!("{}: {}", e.kind(), e)),
            started_at,
            finished_at: Utc::now(),
        },
    };
    if let Err(e) = db::record_run(conn, &run) {
        warn!(error = %e, "Failed to record sync run");
    }

    result
}
