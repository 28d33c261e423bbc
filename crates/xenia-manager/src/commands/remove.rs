//! Remove command

use anyhow::{Context, Result};
use dialoguer::Confirm;
use std::path::Path;

use crate::cli::RemoveArgs;
use crate::output;

pub fn run(args: RemoveArgs, root: Option<&Path>) -> Result<()> {
    let (manager, mut registry) = super::open(root)?;
    let path = std::path::absolute(&args.path)
        .with_context(|| format!("Invalid path {:?}", args.path))?;

    let versioned = manager.layout().version_of(&path);
    let prompt = match &versioned {
        Some((family, tag)) => format!(
            "Remove {} and the whole {}/{} install?",
            path.display(),
            family,
            tag
        ),
        None => format!("Delete {}?", path.display()),
    };

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    let report = manager.remove_executable(&mut registry, &path)?;
    if report.pruned.is_empty() && report.removed_dirs.is_empty() {
        output::warning(&format!("{} was not registered", path.display()));
    } else {
        output::success(&format!("Removed {}", path.display()));
    }
    Ok(())
}
