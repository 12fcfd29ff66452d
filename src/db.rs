use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS projects (
            id           INTEGER PRIMARY KEY,
            title        TEXT NOT NULL,
            description  TEXT NOT NULL DEFAULT '',
            category     TEXT NOT NULL,
            image_url    TEXT NOT NULL,
            video_url    TEXT,
            source_url   TEXT,
            external_id  TEXT,
            published    BOOLEAN NOT NULL DEFAULT 0,
            sort_order   INTEGER NOT NULL DEFAULT 0,
            author_id    TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_projects_title ON projects(title);
        CREATE INDEX IF NOT EXISTS idx_projects_video_url ON projects(video_url);
        CREATE INDEX IF NOT EXISTS idx_projects_source_url ON projects(source_url);
        CREATE INDEX IF NOT EXISTS idx_projects_category ON projects(category, sort_order);

        CREATE TABLE IF NOT EXISTS sync_runs (
            id           INTEGER PRIMARY KEY,
            profile_url  TEXT NOT NULL,
            strategy     TEXT,
            found        INTEGER NOT NULL DEFAULT 0,
            imported     INTEGER NOT NULL DEFAULT 0,
            skipped      INTEGER NOT NULL DEFAULT 0,
            error        TEXT,
            started_at   TEXT NOT NULL,
            finished_at  TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

// ── Projects ──

pub struct NewProject {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub video_url: Option<String>,
    pub source_url: Option<String>,
    pub external_id: Option<String>,
    pub published: bool,
    pub sort_order: i64,
    pub author_id: String,
}

/// Id of a project whose title matches exactly, or whose stored video or
/// source URL equals `url`.
pub fn find_existing(conn: &Connection, title: &str, url: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM projects
             WHERE title = ?1 OR video_url = ?2 OR source_url = ?2
             ORDER BY id LIMIT 1",
            params![title, url],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Sort position just past the current last project.
pub fn next_sort_order(conn: &Connection) -> Result<i64> {
    let order: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM projects",
        [],
        |r| r.get(0),
    )?;
    Ok(order)
}

/// Insert all projects in one transaction. Returns their ids in input order.
pub fn insert_projects(conn: &Connection, rows: &[NewProject]) -> Result<Vec<i64>> {
    let now = Utc::now().to_rfc3339();
    let tx = conn.unchecked_transaction()?;
    let mut ids = Vec::with_capacity(rows.len());
    {
        let mut stmt = tx.prepare(
            "INSERT INTO projects
             (title, description, category, image_url, video_url, source_url, external_id,
              published, sort_order, author_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        )?;
        for p in rows {
            stmt.execute(params![
                p.title, p.description, p.category, p.image_url, p.video_url, p.source_url,
                p.external_id, p.published, p.sort_order, p.author_id, now,
            ])?;
            ids.push(tx.last_insert_rowid());
        }
    }
    tx.commit()?;
    Ok(ids)
}

pub struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub video_url: Option<String>,
    pub published: bool,
    pub sort_order: i64,
}

pub fn list_projects(
    conn: &Connection,
    category: Option<&str>,
    limit: usize,
) -> Result<Vec<ProjectRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, category, image_url, video_url, published, sort_order
         FROM projects
         WHERE ?1 IS NULL OR category = ?1
         ORDER BY sort_order, id
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![category, limit as i64], |row| {
            Ok(ProjectRow {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                category: row.get(3)?,
                image_url: row.get(4)?,
                video_url: row.get(5)?,
                published: row.get(6)?,
                sort_order: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Sync runs ──

pub struct SyncRunRow {
    pub profile_url: String,
    pub strategy: Option<String>,
    pub found: usize,
    pub imported: usize,
    pub skipped: usize,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub fn record_run(conn: &Connection, run: &SyncRunRow) -> Result<i64> {
    conn.execute(
        "INSERT INTO sync_runs
         (profile_url, strategy, found, imported, skipped, error, started_at, finished_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            run.profile_url,
            run.strategy,
            run.found as i64,
            run.imported as i64,
            run.skipped as i64,
            run.error,
            run.started_at.to_rfc3339(),
            run.finished_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Stats ──

pub struct RunSummary {
    pub started_at: String,
    pub strategy: Option<String>,
    pub found: usize,
    pub imported: usize,
    pub skipped: usize,
    pub error: Option<String>,
}

pub struct Stats {
    pub total: usize,
    pub published: usize,
    pub imported: usize,
    pub by_category: Vec<(String, usize)>,
    pub recent_runs: Vec<RunSummary>,
}

pub fn get_stats(conn: &Connection, imported_marker: &str, runs: usize) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM projects", [], |r| r.get(0))?;
    let published: usize =
        conn.query_row("SELECT COUNT(*) FROM projects WHERE published = 1", [], |r| r.get(0))?;
    let imported: usize = conn.query_row(
        "SELECT COUNT(*) FROM projects WHERE description = ?1",
        [imported_marker],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT category, COUNT(*) FROM projects GROUP BY category ORDER BY category",
    )?;
    let by_category = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT started_at, strategy, found, imported, skipped, error
         FROM sync_runs ORDER BY id DESC LIMIT ?1",
    )?;
    let recent_runs = stmt
        .query_map([runs as i64], |r| {
            Ok(RunSummary {
                started_at: r.get(0)?,
                strategy: r.get(1)?,
                found: r.get(2)?,
                imported: r.get(3)?,
                skipped: r.get(4)?,
                error: r.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stats {
        total,
        published,
        imported,
        by_category,
        recent_runs,
    })
}
