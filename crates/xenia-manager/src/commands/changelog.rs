//! Changelog command

use anyhow::Result;
use std::path::Path;

use crate::cli::ChangelogArgs;
use crate::output;

pub async fn run(args: ChangelogArgs, root: Option<&Path>) -> Result<()> {
    let (manager, _) = super::open(root)?;
    let release = manager.release(args.variant, &args.tag).await?;

    output::header(&format!("{} {}", args.variant.label(), release.tag_name));
    if let Some(name) = release.name.as_deref().filter(|n| !n.is_empty()) {
        output::kv("Name", name);
    }
    if let Some(published) = release.published_at {
        output::kv("Published", &published.format("%Y-%m-%d %H:%M UTC").to_string());
    }
    println!();

    let body = release.changelog().trim();
    if body.is_empty() {
        output::info("No changelog published for this release");
    } else {
        println!("{}", body);
    }
    Ok(())
}
