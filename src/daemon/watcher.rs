use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    reminder::{scheduler::SchedulerHandle, settings::ReminderSettings},
    storage::{records::load_record, KeyValueStore},
    utils::clock::SharedClock,
};

pub const SETTINGS_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Picks up reminder settings written by other processes (usually the CLI) and hands them to the
/// running scheduler.
pub struct SettingsWatcher<S> {
    store: S,
    scheduler: SchedulerHandle,
    clock: SharedClock,
    last_seen: ReminderSettings,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl<S: KeyValueStore> SettingsWatcher<S> {
    pub fn new(
        store: S,
        scheduler: SchedulerHandle,
        clock: SharedClock,
        last_seen: ReminderSettings,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            scheduler,
            clock,
            last_seen,
            poll_interval,
            shutdown,
        }
    }

    async fn poll(&mut self) -> Result<()> {
        let settings: ReminderSettings = load_record(&self.store, self.clock.time()).await?;
        if settings == self.last_seen {
            debug!("Stored reminder settings unchanged");
            return Ok(());
        }

        info!("Stored reminder settings changed to {settings:?}");
        self.scheduler.adopt(settings).await?;
        self.last_seen = settings;
        Ok(())
    }

    /// Executes the polling loop until shutdown. Each wait starts after the previous poll
    /// finished, a slow poll delays the next one instead of queueing more.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let poll_point = self.clock.instant() + self.poll_interval;

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.clock.sleep_until(poll_point) => ()
            }

            if let Err(e) = self.poll().await {
                error!("Failed to refresh reminder settings {e:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use anyhow::Result;
    use tokio_util::sync::CancellationToken;

    use crate::{
        reminder::{
            scheduler::{scheduler_channel, SchedulerCommand},
            settings::ReminderSettings,
        },
        storage::{memory_store::MemoryStore, records::save_record, KeyValueStore},
        utils::{clock::test_clock::TestClock, logging::TEST_LOGGING},
    };

    use super::SettingsWatcher;

    const MINUTE: Duration = Duration::from_secs(60);

    /// Store whose reads take five minutes.
    #[derive(Default)]
    struct SlowStore {
        loads: AtomicUsize,
    }

    impl KeyValueStore for SlowStore {
        async fn load(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(5 * MINUTE).await;
            Ok(None)
        }

        async fn save(&self, _key: &str, _value: Vec<u8>) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_polls_do_not_bunch_up() -> Result<()> {
        *TEST_LOGGING;
        let store = Arc::new(SlowStore::default());
        let (handle, _receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();
        let watcher = SettingsWatcher::new(
            store.clone(),
            handle,
            TestClock::shared(),
            ReminderSettings::default(),
            MINUTE,
            shutdown.clone(),
        );

        let (run_result, _) = tokio::join!(watcher.run(), async {
            // Polls start at minutes 1 and 7, each finishing five minutes later.
            tokio::time::sleep(12 * MINUTE + MINUTE / 2).await;
            assert_eq!(store.loads.load(Ordering::SeqCst), 2);
            shutdown.cancel();
        });
        run_result
    }

    #[tokio::test(start_paused = true)]
    async fn test_changed_settings_are_adopted_once() -> Result<()> {
        *TEST_LOGGING;
        let store = Arc::new(MemoryStore::new());
        let (handle, mut receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();
        let watcher = SettingsWatcher::new(
            store.clone(),
            handle,
            TestClock::shared(),
            ReminderSettings::default(),
            MINUTE,
            shutdown.clone(),
        );

        let (run_result, adopted) = tokio::join!(watcher.run(), async {
            let enabled = ReminderSettings::default().with_enabled(true);
            save_record(&store, &enabled).await?;
            tokio::time::sleep(5 * MINUTE).await;
            shutdown.cancel();

            let mut adopted = Vec::new();
            while let Ok(command) = receiver.try_recv() {
                adopted.push(command);
            }
            anyhow::Ok((enabled, adopted))
        });
        run_result?;

        let (enabled, adopted) = adopted?;
        assert_eq!(adopted.len(), 1);
        assert!(matches!(adopted[0], SchedulerCommand::Adopt(settings) if settings == enabled));
        Ok(())
    }
}
