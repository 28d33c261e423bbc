//! Install command

use anyhow::Result;
use indicatif::ProgressBar;
use std::path::Path;
use xenia_manager_versions::download::human_readable_size;
use xenia_manager_versions::{
    CancelToken, DownloadProgress, InstallObserver, Phase, TracingObserver,
};

use crate::cli::InstallArgs;
use crate::output;

/// Renders install progress on an indicatif bar
struct BarObserver {
    bar: ProgressBar,
    log: TracingObserver,
}

impl InstallObserver for BarObserver {
    fn phase(&self, phase: Phase) {
        self.log.phase(phase);
        if phase != Phase::Downloading {
            self.bar.set_message(phase.to_string());
        }
    }

    fn download_started(&self, asset: &str, total: Option<u64>) {
        self.log.download_started(asset, total);
        match total {
            Some(total) => {
                self.bar.println(format!("Downloading {} ({})", asset, human_readable_size(total)));
                output::byte_bar(&self.bar, total);
            }
            None => output::byte_spinner(&self.bar),
        }
        self.bar.set_message(asset.to_string());
    }

    fn download_progress(&self, progress: &DownloadProgress) {
        if let Some(total) = progress.total {
            if self.bar.length() != Some(total) {
                output::byte_bar(&self.bar, total);
            }
        }
        self.bar.set_position(progress.downloaded);
    }

    fn executable_installed(&self, path: &Path) {
        self.log.executable_installed(path);
    }
}

pub async fn run(args: InstallArgs, root: Option<&Path>) -> Result<()> {
    let (manager, mut registry) = super::open(root)?;

    let wanted = args.version.as_deref().unwrap_or("latest");
    output::header(&format!("Installing {} ({})", args.variant.label(), wanted));

    // Ctrl-C only matters while downloading; later phases ignore the flag
    let cancel = CancelToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let observer = BarObserver {
        bar: output::spinner("Resolving release..."),
        log: TracingObserver::new("install"),
    };

    let result = manager
        .install(
            &mut registry,
            args.variant,
            args.version.as_deref(),
            &observer,
            &cancel,
        )
        .await;
    watcher.abort();
    observer.bar.finish_and_clear();

    match result {
        Ok(outcome) => {
            output::success(&format!(
                "Installed {} {} into {}",
                args.variant.label(),
                outcome.tag,
                outcome.install_dir.display()
            ));
            for exe in &outcome.executables {
                output::kv("Executable", &exe.display().to_string());
            }
            for link in &outcome.links {
                output::kv("Link", &link.link.display().to_string());
                if let Some(backup) = &link.backup {
                    output::warning(&format!(
                        "Existing file moved to {}",
                        backup.display()
                    ));
                }
            }
            if outcome.links.len() < outcome.executables.len() {
                output::warning("Some links could not be created; run with -v for details");
            }
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            output::info("Download cancelled");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!(
            "Failed to install {}",
            args.variant.label()
        ))),
    }
}
