// src/exec/cancel.rs

//! Bridging an external cancellation signal to process termination.
//!
//! The execution layer never owns the signal, it only subscribes to it for
//! the lifetime of one run. The subscription is a [`CancellationListener`],
//! released exactly once whichever way the run ends.
//!
//! Firing the signal only asks for the process to be killed. Classifying the
//! resulting close as cancelled is left to the arbiter.

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// External one-shot cancellation request.
pub trait CancellationSignal: Send + Sync {
    /// Whether cancellation has been requested.
    fn is_requested(&self) -> bool;

    /// Register `on_request` to run once when cancellation is requested.
    ///
    /// If the signal already fired, `on_request` may run immediately.
    /// Disposing the returned listener unregisters the callback.
    fn subscribe(&self, on_request: Box<dyn FnOnce() + Send + 'static>) -> CancellationListener;
}

/// One-shot subscription handle on a [`CancellationSignal`].
///
/// `dispose` consumes the listener; dropping an undisposed listener disposes
/// it. The release hook therefore runs exactly once.
pub struct CancellationListener {
    release: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl CancellationListener {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn dispose(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for CancellationListener {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl std::fmt::Debug for CancellationListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationListener")
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl CancellationSignal for CancellationToken {
    fn is_requested(&self) -> bool {
        self.is_cancelled()
    }

    /// Waits on the token in a background Tokio task; disposing aborts it.
    fn subscribe(&self, on_request: Box<dyn FnOnce() + Send + 'static>) -> CancellationListener {
        let token = self.clone();
        let waiter = tokio::spawn(async move {
            token.cancelled().await;
            on_request();
        });
        CancellationListener::new(move || waiter.abort())
    }
}

/// Per-run connection between a signal and the run loop.
pub(crate) struct CancellationBridge<'a> {
    signal: Option<&'a dyn CancellationSignal>,
    listener: Option<CancellationListener>,
    kill_rx: Option<oneshot::Receiver<()>>,
}

impl<'a> CancellationBridge<'a> {
    /// Subscribe to `signal`, if any.
    pub(crate) fn attach(signal: Option<&'a dyn CancellationSignal>) -> Self {
        let Some(signal) = signal else {
            return Self {
                signal: None,
                listener: None,
                kill_rx: None,
            };
        };

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let listener = signal.subscribe(Box::new(move || {
            // Receiver gone means the run already finished.
            let _ = kill_tx.send(());
        }));

        Self {
            signal: Some(signal),
            listener: Some(listener),
            kill_rx: Some(kill_rx),
        }
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.signal.is_some_and(|s| s.is_requested())
    }

    /// Resolves once the signal fires. Pending forever without a signal or
    /// after it has already been observed.
    pub(crate) async fn kill_requested(&mut self) {
        if let Some(rx) = self.kill_rx.as_mut() {
            let fired = rx.await.is_ok();
            self.kill_rx = None;
            if fired {
                return;
            }
            debug!("cancellation callback dropped without firing");
        }
        std::future::pending::<()>().await
    }

    /// Release the subscription. Later calls do nothing.
    pub(crate) fn release(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.dispose();
        }
        self.kill_rx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener(counter: &Arc<AtomicUsize>) -> CancellationListener {
        let counter = Arc::clone(counter);
        CancellationListener::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn dispose_releases_once() {
        let released = Arc::new(AtomicUsize::new(0));
        counting_listener(&released).dispose();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases_once() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let _listener = counting_listener(&released);
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bridge_without_signal_is_inert() {
        let mut bridge = CancellationBridge::attach(None);
        assert!(!bridge.is_requested());

        let fired =
            tokio::time::timeout(std::time::Duration::from_millis(20), bridge.kill_requested())
                .await;
        assert!(fired.is_err(), "no signal should never request a kill");
        bridge.release();
    }

    #[tokio::test]
    async fn token_cancellation_reaches_bridge() {
        let token = CancellationToken::new();
        let mut bridge = CancellationBridge::attach(Some(&token as &dyn CancellationSignal));
        assert!(!bridge.is_requested());

        token.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), bridge.kill_requested())
            .await
            .expect("kill request should arrive");
        assert!(bridge.is_requested());

        bridge.release();
        bridge.release();
    }

    #[tokio::test]
    async fn already_cancelled_token_fires_immediately() {
        let token = CancellationToken::new();
        token.cancel();

        let mut bridge = CancellationBridge::attach(Some(&token as &dyn CancellationSignal));
        assert!(bridge.is_requested());
        tokio::time::timeout(std::time::Duration::from_secs(1), bridge.kill_requested())
            .await
            .expect("kill request should arrive");
    }
}
