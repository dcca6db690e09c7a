//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::EdgeConfig;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Watches the configuration file and emits each successfully reloaded
/// configuration on a channel.
///
/// A change that fails to load or validate is logged and dropped; the
/// edge keeps serving with the configuration it already has.
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<EdgeConfig>,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<EdgeConfig>) {
        let (updates, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            updates,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned handle must stay alive for watching
    /// to continue.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let updates = self.updates;

        let mut watcher = RecommendedWatcher::new(
            move |event: notify::Result<Event>| match event {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    reload_and_send(&path, &updates);
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn reload_and_send(path: &Path, updates: &mpsc::UnboundedSender<EdgeConfig>) {
    tracing::info!("Configuration file changed, reloading");
    match load_config(path) {
        Ok(config) => {
            let _ = updates.send(config);
        }
        Err(e) => {
            tracing::error!(
                "Failed to reload config: {}. Keeping current configuration.",
                e
            );
        }
    }
}
