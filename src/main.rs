mod config;
mod db;
mod error;
mod fetch;
mod parser;
mod sync;

use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::fetch::HttpFetcher;

#[derive(Parser)]
#[command(name = "behance_sync", about = "Import portfolio projects from a Behance profile")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the project database
    Init,
    /// Import new projects from the configured profile
    Sync {
        /// Profile URL (overrides the configured one)
        #[arg(short, long)]
        profile: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the parsers on a saved HTML page, offline
    Inspect {
        /// Path to the saved HTML
        file: String,
        /// Treat the page as a project detail page
        #[arg(short, long)]
        detail: bool,
        /// Print the extracted stubs as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored projects in display order
    List {
        /// Filter by category (videoclips, commercial)
        #[arg(short, long)]
        category: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show project counts and recent sync runs
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Init => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            println!("Database ready at {}", settings.db_path);
            Ok(())
        }
        Commands::Sync { profile, json } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let fetcher = HttpFetcher::new(&settings)?;
            let profile_url = profile.unwrap_or_else(|| settings.profile_url.clone());

            let report = sync::run_and_record(&conn, &fetcher, &settings, &profile_url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            if report.imported.is_empty() {
                println!(
                    "Up to date: {} projects found via {}, none new.",
                    report.found,
                    report.strategy.name()
                );
            } else {
                println!(
                    "Imported {} of {} projects (via {}):",
                    report.imported_count(),
                    report.found,
                    report.strategy.name()
                );
                for p in &report.imported {
                    println!(
                        "  #{:<5} {:<11} {} {}",
                        p.id,
                        p.category.as_str(),
                        truncate(&p.title, 40),
                        p.video_url.as_deref().unwrap_or("")
                    );
                }
            }
            if !report.skipped_titles.is_empty() {
                println!("Skipped {} existing:", report.skipped_titles.len());
                for title in &report.skipped_titles {
                    println!("  {}", truncate(title, 60));
                }
            }
            Ok(())
        }
        Commands::Inspect { file, detail, json } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file))?;

            if detail {
                match parser::detail::parse_video_ref(&html) {
                    Some(url) => println!("Video: {}", url),
                    None => println!("No video reference found."),
                }
                return Ok(());
            }

            let parse = parser::parse_profile(&html);
            let Some(strategy) = parse.strategy else {
                println!("No strategy matched ({} bytes).", html.len());
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&parse.stubs)?);
                return Ok(());
            }
            println!("Strategy: {} ({} stubs)", strategy.name(), parse.stubs.len());
            println!("{:>12} | {:<40} | {}", "ID", "Title", "Cover");
            println!("{}", "-".repeat(90));
            for s in &parse.stubs {
                println!(
                    "{:>12} | {:<40} | {}",
                    s.external_id,
                    truncate(&s.title, 40),
                    s.cover_url.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Commands::List { category, limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::list_projects(&conn, category.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No projects found.");
                return Ok(());
            }

            println!(
                "{:>5} | {:>5} | {:<32} | {:<11} | {:<3} | {:<24} | {}",
                "#", "Order", "Title", "Category", "Pub", "Description", "Video"
            );
            println!("{}", "-".repeat(110));
            for r in &rows {
                println!(
                    "{:>5} | {:>5} | {:<32} | {:<11} | {:<3} | {:<24} | {}",
                    r.id,
                    r.sort_order,
                    truncate(&r.title, 32),
                    r.category,
                    if r.published { "yes" } else { "no" },
                    truncate(display_description(&r.description), 24),
                    r.video_url.as_deref().unwrap_or(&r.image_url)
                );
            }
            println!("\n{} projects", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn, sync::IMPORTED_DESCRIPTION, 5)?;
            println!("Projects:  {}", s.total);
            println!("Published: {}", s.published);
            println!("Imported:  {}", s.imported);
            for (category, count) in &s.by_category {
                println!("  {:<12} {}", category, count);
            }
            if !s.recent_runs.is_empty() {
                println!("\n--- Recent syncs ---");
                for r in &s.recent_runs {
                    match &r.error {
                        Some(e) => println!("  {}  failed: {}", r.started_at, e),
                        None => println!(
                            "  {}  {} found, {} imported, {} skipped ({})",
                            r.started_at,
                            r.found,
                            r.imported,
                            r.skipped,
                            r.strategy.as_deref().unwrap_or("-")
                        ),
                    }
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Imported projects carry a marker description that is not shown.
fn display_description(description: &str) -> &str {
    if description == sync::IMPORTED_DESCRIPTION {
        ""
    } else {
        description
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Café Racer", 4), "Café...");
        assert_eq!(truncate("Short", 10), "Short");
    }

    #[test]
    fn marker_description_hidden() {
        assert_eq!(display_description(sync::IMPORTED_DESCRIPTION), "");
        assert_eq!(display_description("Shot on film"), "Shot on film");
    }

    #[test]
    fn cli_parses_sync_flags() {
        let cli = Cli::try_parse_from([
            "behance_sync",
            "sync",
            "--profile",
            "https://www.behance.net/studio",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Sync { profile, json } => {
                assert_eq!(profile.as_deref(), Some("https://www.behance.net/studio"));
                assert!(json);
            }
            _ => panic!("expected sync"),
        }
    }
}
