//! Detect command

use anyhow::Result;
use std::path::Path;

use crate::cli::DetectArgs;
use crate::output;

pub fn run(args: DetectArgs, root: Option<&Path>) -> Result<()> {
    let (manager, mut registry) = super::open(root)?;
    let report = manager.detect(&mut registry, &args.scan)?;

    if report.detected.is_empty() {
        output::info("No Xenia executables found");
        return Ok(());
    }

    output::header("Detected executables");
    for (path, tag) in &report.detected {
        output::kv(tag, path);
    }
    for path in &report.named {
        if let Some(name) = registry.display_name(path) {
            output::info(&format!("Named {} \"{}\"", path.display(), name));
        }
    }
    output::success(&format!(
        "Registry updated: {} executable(s)",
        report.detected.len()
    ));
    Ok(())
}
