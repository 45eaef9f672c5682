//! "Data changed" signal shared by the refresh timer and local writes.
//!
//! Triggers are published on a `watch` channel, so a subscriber that is busy
//! sees at most one pending change. `RefreshGate` collapses refreshes that
//! would otherwise overlap.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    Startup,
    /// 本进程写入了产品数据
    LocalWrite,
    /// 定时检查
    Poll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub version: u64,
    pub reason: ChangeReason,
}

#[derive(Clone)]
pub struct ChangeNotifier {
    tx: Arc<watch::Sender<ChangeEvent>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ChangeEvent {
            version: 0,
            reason: ChangeReason::Startup,
        });
        Self { tx: Arc::new(tx) }
    }

    pub fn notify(&self, reason: ChangeReason) {
        self.tx.send_modify(|event| {
            event.version += 1;
            event.reason = reason;
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Allows one refresh at a time; `try_begin` returns `None` while another is running.
#[derive(Clone, Default)]
pub struct RefreshGate {
    in_flight: Arc<AtomicBool>,
}

pub struct RefreshTicket {
    in_flight: Arc<AtomicBool>,
}

impl RefreshGate {
    pub fn try_begin(&self) -> Option<RefreshTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshTicket {
                in_flight: self.in_flight.clone(),
            })
    }
}

impl Drop for RefreshTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
