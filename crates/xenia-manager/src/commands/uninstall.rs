//! Uninstall command

use anyhow::Result;
use dialoguer::Confirm;
use std::path::Path;

use crate::cli::UninstallArgs;
use crate::output;

pub fn run(args: UninstallArgs, root: Option<&Path>) -> Result<()> {
    let (manager, mut registry) = super::open(root)?;

    let what = match &args.version {
        Some(tag) => format!("{} {}", args.variant.label(), tag),
        None => format!("every installed {} version", args.variant.label()),
    };

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove {}?", what))
            .default(false)
            .interact()?;

        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    let report = manager.uninstall(&mut registry, args.variant, args.version.as_deref())?;

    for dir in &report.removed_dirs {
        output::kv("Removed", &dir.display().to_string());
    }
    for dir in &report.skipped {
        output::warning(&format!(
            "Left {} in place (outside the versions directory)",
            dir.display()
        ));
    }

    if report.count_removed() == 0 {
        output::info(&format!("Nothing to remove for {}", what));
    } else {
        output::success(&format!(
            "Removed {} director{}",
            report.count_removed(),
            if report.count_removed() == 1 { "y" } else { "ies" }
        ));
    }
    Ok(())
}
