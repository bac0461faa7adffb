use crate::repository::AchievementRepository;
use crate::utils::config::HeartbeatConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Ping the server for the active game until cancelled or the session ends.
///
/// `rich_presence_rx` carries the current rich presence text; its presence
/// also selects the ping interval.
pub fn spawn_heartbeat(
    repository: Arc<AchievementRepository>,
    config: HeartbeatConfig,
    rich_presence_rx: watch::Receiver<Option<String>>,
    mut cancel_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        log::debug!("[ra-sync] Heartbeat started");

        loop {
            let has_rich_presence = rich_presence_rx.borrow().is_some();
            let interval = config.interval(has_rich_presence);

            let cancelled = tokio::select! {
                _ = tokio::time::sleep(interval) => false,
                changed = cancel_rx.changed() => changed.is_err() || *cancel_rx.borrow(),
            };
            if cancelled {
                break;
            }

            let rich_presence = rich_presence_rx.borrow().clone();
            match repository
                .send_session_heartbeat(rich_presence.as_deref())
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_terminal() => {
                    log::info!("[ra-sync] Session is gone, stopping heartbeat");
                    break;
                }
                Err(e) => log::warn!("[ra-sync] Heartbeat failed: {}", e),
            }
        }

        log::debug!("[ra-sync] Heartbeat stopped");
    })
}
