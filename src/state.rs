//! Shared handle to the live configuration.

use crate::conf::Conf;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// The current configuration, readable from any task and replaced as a
/// whole on reload.
///
/// Readers always see a complete tree: a reload swaps in a new [`Conf`],
/// it never mutates the one being read.
#[derive(Clone)]
pub struct SharedConf {
    conf: Arc<ArcSwap<Conf>>,
}

impl SharedConf {
    pub fn new(conf: Conf) -> Self {
        Self {
            conf: Arc::new(ArcSwap::from_pointee(conf)),
        }
    }

    /// Get the current configuration.
    pub fn current(&self) -> arc_swap::Guard<Arc<Conf>> {
        self.conf.load()
    }

    /// Get an owned handle to the current configuration.
    pub fn snapshot(&self) -> Arc<Conf> {
        self.conf.load_full()
    }

    /// Swap the configuration atomically.
    pub fn store(&self, conf: Conf) {
        self.conf.store(Arc::new(conf));
    }

    /// Keep this handle up to date from a watcher's update channel.
    ///
    /// Returns once the watcher has gone away.
    pub async fn follow(&self, mut updates: watch::Receiver<Conf>) {
        while updates.changed().await.is_ok() {
            let conf = updates.borrow_and_update().clone();
            debug!(path = %conf.path().display(), "swapping in reloaded configuration");
            self.store(conf);
        }
    }
}
