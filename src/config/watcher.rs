//! Configuration file watcher for hot reload.
//!
//! Only a file that parses and validates is forwarded. A broken edit is
//! logged and the running configuration stays in place.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AggregatorConfig;

/// Watches the aggregator config file and sends each accepted reload.
pub struct ConfigWatcher {
    path: PathBuf,
    reloads: mpsc::UnboundedSender<AggregatorConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its reloads.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AggregatorConfig>) {
        let (reloads, rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                reloads,
            },
            rx,
        )
    }

    /// Start watching. Reloads stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let ConfigWatcher { path, reloads } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    on_change(&path, &event.kind, &reloads);
                }
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %watched.display(), "Watching service config");
        Ok(watcher)
    }
}

/// Re-read `path` after a write or create event. Returns whether a reload was sent.
fn on_change(path: &Path, kind: &EventKind, reloads: &mpsc::UnboundedSender<AggregatorConfig>) -> bool {
    if !(kind.is_modify() || kind.is_create()) {
        return false;
    }

    match load_config(path) {
        Ok(config) => {
            tracing::info!(
                path = %path.display(),
                services = config.services.len(),
                "Service config changed"
            );
            reloads.send(config).is_ok()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Rejected config change, keeping current services");
            false
        }
    }
}
