//! Configuration watcher for hot reload.
//!
//! Polls the configuration source at a fixed interval and publishes a
//! freshly loaded [`Conf`] whenever it changes.
//!
//! Updates are published on a [`tokio::sync::watch`] channel: a single slot
//! that is replaced on every publish. A slow subscriber may skip
//! intermediate versions but always observes the latest one.

use crate::conf::Conf;
use crate::error::{ConfError, Result};
use crate::loader::{load, LoadOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::{broadcast, watch};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Polling configuration watcher.
pub struct ConfWatcher {
    /// Path or store key being watched.
    path: PathBuf,
    /// Options used for every reload.
    options: LoadOptions,
    /// Time between polls.
    interval: Duration,
    /// Slot holding the latest configuration.
    sender: watch::Sender<Conf>,
}

impl ConfWatcher {
    /// Create a watcher for the source `conf` was loaded from.
    ///
    /// `options` must select the same backend that produced `conf`.
    pub fn new(conf: Conf, options: LoadOptions, interval: Duration) -> Self {
        let path = conf.path().to_path_buf();
        let (sender, _) = watch::channel(conf);
        Self {
            path,
            options,
            interval,
            sender,
        }
    }

    /// Get the path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subscribe to configuration updates.
    ///
    /// The receiver starts out holding the current configuration, marked as
    /// seen.
    pub fn subscribe(&self) -> watch::Receiver<Conf> {
        self.sender.subscribe()
    }

    /// Run the watcher until `shutdown` fires.
    ///
    /// Returns `Ok` on shutdown. Any failure to stat, fetch or load the
    /// source ends the loop with that error; there are no retries.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!(
            path = %self.path.display(),
            interval = ?self.interval,
            store = self.options.uses_store(),
            "config watcher starting"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        if self.options.uses_store() {
            self.watch_store(ticker, &mut shutdown).await
        } else {
            self.watch_file(ticker, &mut shutdown).await
        }
    }

    async fn watch_file(
        &self,
        mut ticker: Interval,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<()> {
        let mut last_modified = modified(&self.path)?;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let current = modified(&self.path)?;
                    if current != last_modified {
                        last_modified = current;

                        debug!(path = %self.path.display(), "configuration file modified");
                        let conf = load(&self.path, &self.options)?;
                        self.publish(conf);
                    }
                }

                _ = shutdown.recv() => {
                    info!("config watcher shutting down");
                    return Ok(());
                }
            }
        }
    }

    async fn watch_store(
        &self,
        mut ticker: Interval,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let conf = load(&self.path, &self.options)?;
                    let changed = self.sender.borrow().content() != conf.content();
                    if changed {
                        self.publish(conf);
                    }
                }

                _ = shutdown.recv() => {
                    info!("config watcher shutting down");
                    return Ok(());
                }
            }
        }
    }

    fn publish(&self, conf: Conf) {
        info!(
            path = %self.path.display(),
            keys = conf.content().len(),
            subscribers = self.sender.receiver_count(),
            "configuration reloaded"
        );
        self.sender.send_replace(conf);
    }
}

fn modified(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| ConfError::Read {
            path: path.to_path_buf(),
            source,
        })
}
