//! Poll loop.
//!
//! # Responsibilities
//! - Run a full poll cycle immediately, then every `checks.interval_secs`
//! - Stop issuing cycles on request
//!
//! # Design Decisions
//! - Stopping never aborts a cycle in progress; its checks run to completion
//! - A cycle that overruns the interval delays the next tick instead of
//!   bursting to catch up
//! - The loop holds a weak reference so dropping every handle also ends it

use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::{lock, Aggregator, Inner};

pub(crate) struct PollHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Aggregator {
    /// Start polling. Must be called within a tokio runtime.
    ///
    /// Returns `false` if the loop was already running.
    pub fn start(&self) -> bool {
        let mut poll = lock(&self.inner.poll);
        if poll.as_ref().is_some_and(|h| !h.task.is_finished()) {
            return false;
        }

        let interval = self.inner.checks.load().interval();
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(poll_loop(Arc::downgrade(&self.inner), interval, stop_rx));
        *poll = Some(PollHandle { stop_tx, task });

        tracing::info!(interval_secs = interval.as_secs(), services = self.service_count(), "Status monitoring started");
        true
    }

    /// Stop issuing poll cycles. Idempotent.
    ///
    /// Returns `false` if the loop was not running.
    pub fn stop(&self) -> bool {
        match self.take_poll() {
            Some(handle) => {
                let _ = handle.stop_tx.send(());
                tracing::info!("Status monitoring stopped");
                true
            }
            None => false,
        }
    }

    /// Stop and wait for a cycle in progress to settle.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.take_poll() {
            let _ = handle.stop_tx.send(());
            if let Err(e) = handle.task.await {
                tracing::error!(error = %e, "Poll loop ended abnormally");
            }
            tracing::info!("Status monitoring stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner.poll)
            .as_ref()
            .is_some_and(|h| !h.task.is_finished())
    }

    fn take_poll(&self) -> Option<PollHandle> {
        lock(&self.inner.poll).take()
    }
}

async fn poll_loop(inner: Weak<Inner>, interval: std::time::Duration, mut stop_rx: oneshot::Receiver<()>) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => {
                tracing::debug!("Poll loop received stop signal, exiting");
                break;
            }
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                Aggregator { inner }.check_all().await;
            }
        }
    }
}
