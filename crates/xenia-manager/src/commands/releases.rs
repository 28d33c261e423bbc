//! Releases command

use anyhow::Result;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::ReleasesArgs;
use crate::output;

#[derive(Tabled)]
struct ReleaseRow {
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Published")]
    published: String,
    #[tabled(rename = "Pre-release")]
    prerelease: String,
    #[tabled(rename = "Installed")]
    installed: String,
}

pub async fn run(args: ReleasesArgs, root: Option<&Path>) -> Result<()> {
    let (manager, _) = super::open(root)?;

    let spinner = output::spinner(&format!(
        "Fetching {} releases from {}/{}...",
        args.variant.label(),
        args.variant.owner(),
        args.variant.repo()
    ));
    let releases = manager.releases(args.variant, args.limit).await;
    spinner.finish_and_clear();
    let releases = releases?;

    if args.json {
        let rows: Vec<serde_json::Value> = releases
            .iter()
            .map(|r| {
                serde_json::json!({
                    "tag": r.tag_name,
                    "name": r.name,
                    "published_at": r.published_at,
                    "prerelease": r.prerelease,
                    "installed": manager.is_installed(args.variant, &r.tag_name),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if releases.is_empty() {
        output::info(&format!("No releases published for {}", args.variant.label()));
        return Ok(());
    }

    let rows: Vec<ReleaseRow> = releases
        .iter()
        .map(|r| ReleaseRow {
            tag: r.tag_name.clone(),
            published: r
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            prerelease: if r.prerelease { "yes" } else { "" }.to_string(),
            installed: if manager.is_installed(args.variant, &r.tag_name) {
                "✓"
            } else {
                ""
            }
            .to_string(),
        })
        .collect();

    output::header(&format!("{} releases", args.variant.label()));
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);
    Ok(())
}
