//! One-shot termination signal for the server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Why the server was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A client requested `GET /done`.
    Done,
    /// The process received SIGINT or SIGTERM.
    Signal,
}

impl std::fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownReason::Done => write!(f, "done route"),
            ShutdownReason::Signal => write!(f, "signal"),
        }
    }
}

/// Coordinator for shutting the server down exactly once.
///
/// Cloning is cheap; every clone refers to the same signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    fired: AtomicBool,
    tx: watch::Sender<Option<ShutdownReason>>,
}

impl Shutdown {
    /// Create a new, untriggered coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                fired: AtomicBool::new(false),
                tx,
            }),
        }
    }

    /// Fire the signal. Returns `false` if it had already been fired.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        if self.inner.fired.swap(true, Ordering::SeqCst) {
            tracing::debug!(%reason, "Shutdown already requested");
            return false;
        }
        tracing::info!(%reason, "Shutdown requested");
        self.inner.tx.send_replace(Some(reason));
        true
    }

    /// Whether the signal has been fired.
    pub fn is_triggered(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    /// Subscribe to the signal. Subscribing after the trigger still observes it.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.inner.tx.subscribe(),
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<Option<ShutdownReason>>,
}

impl ShutdownSignal {
    /// Wait until the signal fires and return its reason.
    pub async fn recv(&mut self) -> ShutdownReason {
        let fired = match self.rx.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        };
        match fired {
            Some(reason) => reason,
            // Every `Shutdown` clone is gone, nobody can trigger anymore.
            None => std::future::pending().await,
        }
    }
}
