//! Cooperative cancellation over a `watch` channel.
//!
//! A `watch::Receiver<bool>` is the cancellation token throughout the crate:
//! `true` means stop. The same channel doubles as the process shutdown signal.

use tokio::sync::watch;

/// Resolves once the signal is `true`.
///
/// If the sender is dropped without ever signalling, this never resolves.
pub async fn cancelled(signal: &mut watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// A token that is never cancelled, for callers without a deadline.
pub fn never() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

/// True if cancellation has already been requested.
pub fn is_cancelled(signal: &watch::Receiver<bool>) -> bool {
    *signal.borrow()
}
