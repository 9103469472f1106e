//! Cooperative stop signal for watcher loops.

use tokio::sync::broadcast;

/// Broadcasts a stop request to every subscribed watcher.
///
/// Watchers observe the request between polls; a load in progress always
/// runs to completion first.
#[derive(Clone)]
pub struct StopSignal {
    sender: broadcast::Sender<()>,
}

impl StopSignal {
    /// Create a new stop signal.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Subscribe to stop requests.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Request every subscriber to stop. Returns the number of subscribers
    /// that were notified.
    pub fn stop(&self) -> usize {
        self.sender.send(()).unwrap_or(0)
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stop_reaches_subscribers() {
        let signal = StopSignal::new();
        let mut a = signal.subscribe();
        let mut b = signal.clone().subscribe();

        assert_eq!(signal.stop(), 2);
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[test]
    fn test_stop_without_subscribers() {
        assert_eq!(StopSignal::default().stop(), 0);
    }
}
