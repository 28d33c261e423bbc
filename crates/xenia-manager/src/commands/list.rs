//! List command

use anyhow::Result;
use std::path::Path;
use xenia_manager_versions::group_installed;

use crate::cli::ListArgs;
use crate::output;

pub fn run(args: ListArgs, root: Option<&Path>) -> Result<()> {
    let (manager, registry) = super::open(root)?;
    let groups = group_installed(manager.layout(), registry.installed());

    if args.json {
        let value: serde_json::Map<String, serde_json::Value> = groups
            .iter()
            .map(|(group, paths)| {
                let entries = paths
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "path": p,
                            "name": registry.display_name(p),
                            "version": registry.version_of(p),
                        })
                    })
                    .collect();
                (group.clone(), serde_json::Value::Array(entries))
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if groups.is_empty() {
        output::info("Nothing installed. Run 'xenia-manager install <variant>' or 'xenia-manager detect'");
        return Ok(());
    }

    let preferred = registry.preferred_emulator();
    for (group, paths) in &groups {
        output::header(group);
        for path in paths {
            let marker = if preferred.as_deref() == Some(path.as_path()) {
                " (default)"
            } else {
                ""
            };
            match registry.display_name(path) {
                Some(name) => output::kv(name, &format!("{}{}", path.display(), marker)),
                None => println!("  {}{}", path.display(), marker),
            }
        }
    }
    Ok(())
}
