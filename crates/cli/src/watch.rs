use anyhow::{Context, Result};
use notify::event::EventKind;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use scanshelf_core::{FileFilter, Organizer};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Whether a filesystem event could have added a document to the scan dir.
pub fn event_touches_documents(event: &Event, filter: &FileFilter) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    event.paths.iter().any(|p| path_accepted(p, filter))
}

fn path_accepted(path: &Path, filter: &FileFilter) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| filter.accepts(n))
        .unwrap_or(false)
}

async fn import_once(organizer: &Organizer) {
    match organizer.import().await {
        Ok(summary) if summary.imported.is_empty() => debug!("watch: nothing new"),
        Ok(summary) => info!(
            imported = summary.imported.len(),
            skipped = summary.skipped,
            "watch: imported {}",
            summary.imported.join(", ")
        ),
        Err(e) => error!("watch import failed: {e}"),
    }
}

/// Import whatever is already waiting, then import again whenever a matching
/// file shows up in the scan directory. Runs until the watcher channel closes.
pub async fn watch_scan_dir(organizer: &Organizer) -> Result<()> {
    let dir = organizer.scan_dir().to_path_buf();
    import_once(organizer).await;

    let (tx, rx) = channel();
    let mut watcher: RecommendedWatcher = Watcher::new(
        tx,
        notify::Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("watch {}", dir.display()))?;

    info!("watching {}", dir.display());
    println!("Watching {} (ctrl-c to stop)", dir.display());
    loop {
        match rx.recv() {
            Ok(Ok(event)) => {
                if event_touches_documents(&event, organizer.filter()) {
                    import_once(organizer).await;
                }
            }
            Ok(Err(e)) => warn!("watch error: {e}"),
            Err(_) => break,
        }
    }
    Ok(())
}
