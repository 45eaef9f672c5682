//! Background tasks.
//!
//! `spawn_all` starts the storefront refresh timer and the listener that
//! re-reads listed products whenever a change is signalled.

use std::time::Duration;

use crate::notify::{ChangeNotifier, ChangeReason};
use crate::services::StorefrontService;

const MIN_REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// `tokio::time::interval` panics on a zero period.
fn refresh_period(requested: Duration) -> Duration {
    requested.max(MIN_REFRESH_PERIOD)
}

/// Spawn all background tasks. Detached via `tokio::spawn`; does not block.
pub fn spawn_all(notifier: ChangeNotifier, storefront_service: StorefrontService, refresh_interval: Duration) {
    // 定时触发一次数据检查（文件可能被其他进程修改）
    {
        let notifier = notifier.clone();
        let period = refresh_period(refresh_interval);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                log::debug!("Storefront refresh timer fired");
                notifier.notify(ChangeReason::Poll);
            }
        });
    }

    // 数据变化监听：积压的多次变化只触发一次刷新
    {
        let mut rx = notifier.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let event = *rx.borrow_and_update();
                if storefront_service.refresh_if_changed().await {
                    log::info!(
                        "Storefront refreshed after change #{} ({:?})",
                        event.version,
                        event.reason
                    );
                }
            }
            log::warn!("Change notifier closed, storefront refresh listener stopped");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_period_never_zero() {
        assert_eq!(refresh_period(Duration::ZERO), Duration::from_secs(1));
        assert_eq!(refresh_period(Duration::from_secs(30)), Duration::from_secs(30));
    }
}
