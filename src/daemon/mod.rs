use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use watcher::{SettingsWatcher, SETTINGS_POLL_INTERVAL};

use crate::{
    reminder::{
        notifier::Notifier,
        scheduler::{scheduler_channel, ReminderScheduler, SchedulerHandle},
        settings::ReminderSettings,
    },
    storage::{file_store::FileStore, KeyValueStore},
    utils::clock::{DefaultClock, SharedClock},
};

pub mod args;
pub mod shutdown;
pub mod watcher;

/// Directory inside the application directory that holds the stored records.
pub const STORAGE_DIR: &str = "storage";

pub fn create_store(dir: &std::path::Path) -> Result<Arc<FileStore>> {
    Ok(Arc::new(FileStore::new(dir.join(STORAGE_DIR))?))
}

/// Represents the starting point for the daemon. `hourly_chime` adds a signal at the top of
/// every hour on top of the configured reminders.
pub async fn start_daemon(
    dir: PathBuf,
    notifier: Box<dyn Notifier>,
    hourly_chime: bool,
) -> Result<()> {
    let store = create_store(&dir)?;
    let clock = DefaultClock::shared();
    let shutdown_token = CancellationToken::new();

    let (handle, receiver) = scheduler_channel();
    let mut scheduler = create_scheduler(store.clone(), notifier, clock.clone()).await?;
    if hourly_chime {
        scheduler = scheduler.with_hourly_chime();
    }
    let watcher = create_watcher(
        store,
        handle,
        scheduler.settings(),
        clock,
        SETTINGS_POLL_INTERVAL,
        &shutdown_token,
    );

    info!("Reminder daemon started in {dir:?}");
    let (_, scheduler_result, watcher_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        scheduler.run(receiver, shutdown_token.clone()),
        watcher.run(),
    );

    if let Err(scheduler_result) = scheduler_result {
        error!("Scheduler got an error {:?}", scheduler_result);
    }

    if let Err(watcher_result) = watcher_result {
        error!("Settings watcher got an error {:?}", watcher_result);
    }

    info!("Reminder daemon stopped");
    Ok(())
}

async fn create_scheduler<S: KeyValueStore, N: Notifier>(
    store: S,
    notifier: N,
    clock: SharedClock,
) -> Result<ReminderScheduler<S, N>> {
    ReminderScheduler::load(store, notifier, clock).await
}

fn create_watcher<S: KeyValueStore>(
    store: S,
    handle: SchedulerHandle,
    last_seen: ReminderSettings,
    clock: SharedClock,
    poll_interval: Duration,
    shutdown_token: &CancellationToken,
) -> SettingsWatcher<S> {
    SettingsWatcher::new(
        store,
        handle,
        clock,
        last_seen,
        poll_interval,
        shutdown_token.clone(),
    )
}
