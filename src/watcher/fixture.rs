use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// File system watcher for a document fixture
pub struct FixtureWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
}

impl FixtureWatcher {
    /// Watch `path` for modifications.
    ///
    /// The parent directory is watched instead of the file itself so that
    /// editors which save by rename are still picked up.
    pub fn new(path: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let file: PathBuf = path
            .file_name()
            .map(PathBuf::from)
            .with_context(|| format!("{} has no file name", path.display()))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    if event
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some_and(|name| name == file.as_os_str()))
                    {
                        let _ = tx.send(());
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_millis(500)),
        )?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Whether the fixture changed since the last call (non-blocking).
    /// Bursts of events collapse into one.
    pub fn changed(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}
