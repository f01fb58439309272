//! A [`CancellationSignal`] that counts how it is used.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use shellexec::exec::{CancellationListener, CancellationSignal};

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Manually fired cancellation signal.
///
/// Clones share state, so a test can hand one clone to the run and keep the
/// other to fire it and inspect the counters.
#[derive(Clone, Default)]
pub struct CountingSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    requested: AtomicBool,
    subscriptions: AtomicUsize,
    disposals: AtomicUsize,
    next_id: AtomicUsize,
    pending: Mutex<Vec<(usize, Callback)>>,
}

impl CountingSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that is already fired.
    pub fn requested() -> Self {
        let signal = Self::new();
        signal.request();
        signal
    }

    /// Fire the signal, running every registered callback once.
    pub fn request(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        let callbacks: Vec<_> = self
            .inner
            .pending
            .lock()
            .expect("pending callbacks lock poisoned")
            .drain(..)
            .collect();
        for (_, callback) in callbacks {
            callback();
        }
    }

    pub fn subscriptions(&self) -> usize {
        self.inner.subscriptions.load(Ordering::SeqCst)
    }

    pub fn disposals(&self) -> usize {
        self.inner.disposals.load(Ordering::SeqCst)
    }

    /// Callbacks registered and not yet fired or disposed.
    pub fn pending(&self) -> usize {
        self.inner
            .pending
            .lock()
            .expect("pending callbacks lock poisoned")
            .len()
    }
}

impl CancellationSignal for CountingSignal {
    fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    fn subscribe(&self, on_request: Callback) -> CancellationListener {
        self.inner.subscriptions.fetch_add(1, Ordering::SeqCst);

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        if self.is_requested() {
            on_request();
        } else {
            self.inner
                .pending
                .lock()
                .expect("pending callbacks lock poisoned")
                .push((id, on_request));
        }

        let inner = Arc::clone(&self.inner);
        CancellationListener::new(move || {
            inner.disposals.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut pending) = inner.pending.lock() {
                pending.retain(|(pending_id, _)| *pending_id != id);
            }
        })
    }
}
