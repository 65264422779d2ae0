use std::{future::pending, mem, time::Duration};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    storage::{
        records::{load_record, save_record},
        KeyValueStore,
    },
    utils::{
        clock::SharedClock,
        time::{until_next_local_hour, HOUR},
    },
};

use super::{
    notifier::{Notifier, ReminderKind, ReminderSignal},
    settings::{ReminderInterval, ReminderSettings},
};

const COMMAND_BUFFER: usize = 16;

/// A chime that would follow the previous one this closely is moved to the hour after.
const CHIME_SLACK: Duration = Duration::from_secs(60);

/// The reminder that will fire next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReminder {
    /// Wall time shown to the user.
    pub fire_at: DateTime<Utc>,
    /// Point the event loop sleeps until.
    pub deadline: Instant,
    pub interval: ReminderInterval,
}

/// There is a single slot for a pending reminder. Replacing the state is the only way to cancel
/// or reschedule, so two timers can never be pending at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Disarmed,
    Armed(PendingReminder),
}

impl SchedulerState {
    pub fn pending(&self) -> Option<&PendingReminder> {
        match self {
            SchedulerState::Disarmed => None,
            SchedulerState::Armed(pending) => Some(pending),
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, SchedulerState::Armed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub settings: ReminderSettings,
    pub next_reminder: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub enum SchedulerCommand {
    Toggle,
    SetEnabled(bool),
    SetInterval(ReminderInterval),
    /// Settings that were read back from storage. Applied without writing them again.
    Adopt(ReminderSettings),
    Status(oneshot::Sender<SchedulerStatus>),
}

/// Sending side of a running [ReminderScheduler].
#[derive(Clone)]
pub struct SchedulerHandle {
    sender: mpsc::Sender<SchedulerCommand>,
}

pub fn scheduler_channel() -> (SchedulerHandle, mpsc::Receiver<SchedulerCommand>) {
    let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
    (SchedulerHandle { sender }, receiver)
}

impl SchedulerHandle {
    pub async fn send(&self, command: SchedulerCommand) -> Result<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| anyhow!("Reminder scheduler is no longer running"))
    }

    pub async fn toggle(&self) -> Result<()> {
        self.send(SchedulerCommand::Toggle).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.send(SchedulerCommand::SetEnabled(enabled)).await
    }

    pub async fn set_interval(&self, interval: ReminderInterval) -> Result<()> {
        self.send(SchedulerCommand::SetInterval(interval)).await
    }

    pub async fn adopt(&self, settings: ReminderSettings) -> Result<()> {
        self.send(SchedulerCommand::Adopt(settings)).await
    }

    pub async fn status(&self) -> Result<SchedulerStatus> {
        let (sender, receiver) = oneshot::channel();
        self.send(SchedulerCommand::Status(sender)).await?;
        receiver
            .await
            .map_err(|_| anyhow!("Reminder scheduler stopped before answering"))
    }
}

/// Owns the reminder settings and the pending reminder derived from them. Settings are persisted
/// on every change; the timer is re-armed on every change while reminders are enabled.
pub struct ReminderScheduler<S, N> {
    settings: ReminderSettings,
    state: SchedulerState,
    /// Next top-of-the-hour signal, when enabled.
    chime: Option<Instant>,
    store: S,
    notifier: N,
    clock: SharedClock,
}

impl<S: KeyValueStore, N: Notifier> ReminderScheduler<S, N> {
    /// Restores stored settings and arms right away when reminders were left enabled.
    pub async fn load(store: S, notifier: N, clock: SharedClock) -> Result<Self> {
        let settings = load_record(&store, clock.time()).await?;
        info!("Loaded reminder settings {settings:?}");
        Ok(Self::new(settings, store, notifier, clock))
    }

    pub fn new(settings: ReminderSettings, store: S, notifier: N, clock: SharedClock) -> Self {
        let mut scheduler = Self {
            settings,
            state: SchedulerState::Disarmed,
            chime: None,
            store,
            notifier,
            clock,
        };
        scheduler.sync_timer();
        scheduler
    }

    /// Also signals at the top of every local hour. The chime runs regardless of the reminder
    /// settings and does not count as the pending reminder.
    pub fn with_hourly_chime(mut self) -> Self {
        let at = self.clock.instant() + until_next_local_hour(self.clock.time());
        info!("Hourly chime enabled");
        self.chime = Some(at);
        self
    }

    pub fn settings(&self) -> ReminderSettings {
        self.settings
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn next_reminder(&self) -> Option<DateTime<Utc>> {
        self.state.pending().map(|v| v.fire_at)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            settings: self.settings,
            next_reminder: self.next_reminder(),
        }
    }

    pub async fn toggle_reminders(&mut self) -> Result<()> {
        self.update(self.settings.toggled()).await
    }

    pub async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.update(self.settings.with_enabled(enabled)).await
    }

    pub async fn set_interval(&mut self, interval: ReminderInterval) -> Result<()> {
        self.update(self.settings.with_interval(interval)).await
    }

    async fn update(&mut self, settings: ReminderSettings) -> Result<()> {
        if self.adopt(settings) {
            save_record(&self.store, &self.settings).await?;
        }
        Ok(())
    }

    /// Applies settings without persisting them. Returns whether anything changed; unchanged
    /// settings leave the pending reminder alone.
    pub fn adopt(&mut self, settings: ReminderSettings) -> bool {
        if settings == self.settings {
            debug!("Reminder settings unchanged");
            return false;
        }
        info!("Reminder settings changed to {settings:?}");
        self.settings = settings;
        self.sync_timer();
        true
    }

    fn sync_timer(&mut self) {
        if self.settings.enabled {
            self.arm();
        } else {
            self.disarm();
        }
    }

    /// Schedules the next reminder one interval from now, replacing any pending one.
    pub fn arm(&mut self) {
        if !self.settings.enabled {
            debug!("Reminders are disabled, not arming");
            return;
        }

        let interval = self.settings.interval;
        let pending = PendingReminder {
            fire_at: self.clock.time() + interval.duration(),
            deadline: self.clock.instant() + interval.duration(),
            interval,
        };
        if let SchedulerState::Armed(previous) = &self.state {
            debug!("Replacing reminder due at {}", previous.fire_at);
        }
        info!("Next reminder at {}", pending.fire_at);
        self.state = SchedulerState::Armed(pending);
    }

    /// Drops the pending reminder, if any. Nothing fires until the next [Self::arm].
    pub fn disarm(&mut self) {
        if let SchedulerState::Armed(previous) = mem::take(&mut self.state) {
            info!("Cancelled reminder due at {}", previous.fire_at);
        }
    }

    /// Delivers the pending reminder and schedules the following one. Delivery failures are
    /// logged and the cadence continues.
    pub fn fire(&mut self) {
        let SchedulerState::Armed(pending) = self.state else {
            warn!("Asked to fire while disarmed");
            return;
        };

        let signal = ReminderSignal {
            due: pending.fire_at,
            kind: ReminderKind::Interval(pending.interval),
        };
        match self.notifier.notify(&signal) {
            Ok(()) => info!("Delivered reminder due at {}", signal.due),
            Err(e) => error!("Failed to deliver reminder {signal:?}: {e:?}"),
        }

        self.arm();
    }

    /// Delivers the hourly signal and schedules the next one.
    pub fn chime(&mut self) {
        let now = self.clock.time();
        let signal = ReminderSignal {
            due: now,
            kind: ReminderKind::OnTheHour,
        };
        if let Err(e) = self.notifier.notify(&signal) {
            error!("Failed to deliver hourly chime: {e:?}");
        }

        let mut wait = until_next_local_hour(now);
        if wait < CHIME_SLACK {
            wait += HOUR;
        }
        self.chime = Some(self.clock.instant() + wait);
    }

    async fn handle(&mut self, command: SchedulerCommand) -> Result<()> {
        debug!("Handling {command:?}");
        match command {
            SchedulerCommand::Toggle => self.toggle_reminders().await,
            SchedulerCommand::SetEnabled(enabled) => self.set_enabled(enabled).await,
            SchedulerCommand::SetInterval(interval) => self.set_interval(interval).await,
            SchedulerCommand::Adopt(settings) => {
                self.adopt(settings);
                Ok(())
            }
            SchedulerCommand::Status(reply) => {
                // The asking side may have given up already.
                let _ = reply.send(self.status());
                Ok(())
            }
        }
    }

    /// Executes the scheduler event loop until `shutdown` is cancelled or every
    /// [SchedulerHandle] is dropped. The pending reminder is cancelled on the way out.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SchedulerCommand>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        loop {
            let due = sleep_until_some(
                self.clock.clone(),
                self.state.pending().map(|v| v.deadline),
            );
            let chime = sleep_until_some(self.clock.clone(), self.chime);

            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Scheduler shutting down");
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Err(e) = self.handle(command).await {
                            error!("Failed to apply reminder command: {e:?}");
                        }
                    }
                    None => {
                        debug!("All scheduler handles dropped");
                        break;
                    }
                },
                _ = due => self.fire(),
                _ = chime => self.chime(),
            }
        }

        self.disarm();
        self.chime = None;
        commands.close();
        Ok(())
    }
}

async fn sleep_until_some(clock: SharedClock, deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => clock.sleep_until(deadline).await,
        None => pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::{anyhow, Result};
    use chrono::{TimeZone, Utc};
    use tokio_util::sync::CancellationToken;

    use crate::{
        reminder::{
            notifier::{MockNotifier, Notifier, ReminderKind, ReminderSignal},
            settings::{ReminderInterval, ReminderSettings},
        },
        storage::{memory_store::MemoryStore, records::load_record, KeyValueStore},
        utils::{
            clock::test_clock::{TestClock, TEST_START_DATE},
            logging::TEST_LOGGING,
            time::{until_next_local_hour, HOUR},
        },
    };

    use super::{scheduler_channel, ReminderScheduler, SchedulerState};

    const MINUTE: Duration = Duration::from_secs(60);

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        fired: Arc<Mutex<Vec<ReminderSignal>>>,
    }

    impl RecordingNotifier {
        fn count(&self) -> usize {
            self.fired.lock().unwrap().len()
        }

        fn kinds(&self) -> Vec<ReminderKind> {
            self.fired.lock().unwrap().iter().map(|v| v.kind).collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, signal: &ReminderSignal) -> Result<()> {
            self.fired.lock().unwrap().push(*signal);
            Ok(())
        }
    }

    fn start() -> chrono::DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_START_DATE)
    }

    async fn fresh_scheduler(
        store: Arc<MemoryStore>,
    ) -> Result<(
        ReminderScheduler<Arc<MemoryStore>, RecordingNotifier>,
        RecordingNotifier,
    )> {
        *TEST_LOGGING;
        let notifier = RecordingNotifier::default();
        let scheduler =
            ReminderScheduler::load(store, notifier.clone(), TestClock::shared()).await?;
        Ok((scheduler, notifier))
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_disarmed_by_default() -> Result<()> {
        let (scheduler, _) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;

        assert_eq!(scheduler.settings(), ReminderSettings::default());
        assert_eq!(*scheduler.state(), SchedulerState::Disarmed);
        assert_eq!(scheduler.next_reminder(), None);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_restored_enabled_settings_arm() -> Result<()> {
        let store = Arc::new(MemoryStore::new().with_value(
            "reminderSettings",
            "{\"remindersEnabled\":true,\"reminderInterval\":90}",
        ));
        let (scheduler, _) = fresh_scheduler(store).await?;

        assert_eq!(
            scheduler.next_reminder(),
            Some(start() + chrono::Duration::minutes(90))
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_arms_disarms_and_persists() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        let (mut scheduler, _) = fresh_scheduler(store.clone()).await?;

        scheduler.toggle_reminders().await?;
        assert!(scheduler.state().is_armed());
        assert_eq!(
            scheduler.next_reminder(),
            Some(start() + chrono::Duration::minutes(60))
        );
        let stored: ReminderSettings = load_record(&store, Utc::now()).await?;
        assert!(stored.enabled);

        scheduler.toggle_reminders().await?;
        assert_eq!(*scheduler.state(), SchedulerState::Disarmed);
        assert_eq!(scheduler.next_reminder(), None);
        let stored: ReminderSettings = load_record(&store, Utc::now()).await?;
        assert!(!stored.enabled);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_rearms_from_now() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        let (mut scheduler, _) = fresh_scheduler(store.clone()).await?;
        scheduler.set_enabled(true).await?;

        tokio::time::sleep(10 * MINUTE).await;
        scheduler.set_interval(ReminderInterval::Thirty).await?;

        assert_eq!(
            scheduler.next_reminder(),
            Some(start() + chrono::Duration::minutes(40))
        );
        let stored: ReminderSettings = load_record(&store, Utc::now()).await?;
        assert_eq!(stored.interval, ReminderInterval::Thirty);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_while_disabled_stays_disarmed() -> Result<()> {
        let (mut scheduler, _) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;

        scheduler.set_interval(ReminderInterval::OneTwenty).await?;

        assert_eq!(*scheduler.state(), SchedulerState::Disarmed);
        assert_eq!(scheduler.settings().interval, ReminderInterval::OneTwenty);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_settings_keep_pending_reminder() -> Result<()> {
        let (mut scheduler, _) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;
        scheduler.set_enabled(true).await?;
        let first = *scheduler.state();

        tokio::time::sleep(5 * MINUTE).await;
        scheduler.set_enabled(true).await?;
        scheduler.set_interval(ReminderInterval::Sixty).await?;

        assert_eq!(*scheduler.state(), first);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_armed_exactly_when_enabled() -> Result<()> {
        let (mut scheduler, _) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;

        let steps: [Option<ReminderInterval>; 9] = [
            None,
            Some(ReminderInterval::Thirty),
            Some(ReminderInterval::Ninety),
            None,
            Some(ReminderInterval::Sixty),
            None,
            None,
            Some(ReminderInterval::OneTwenty),
            None,
        ];
        for step in steps {
            match step {
                None => scheduler.toggle_reminders().await?,
                Some(interval) => scheduler.set_interval(interval).await?,
            }
            assert_eq!(scheduler.state().is_armed(), scheduler.settings().enabled);
            if let Some(pending) = scheduler.state().pending() {
                assert_eq!(pending.interval, scheduler.settings().interval);
            }
        }
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_notifies_and_rearms() -> Result<()> {
        *TEST_LOGGING;
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|signal| signal.kind == ReminderKind::Interval(ReminderInterval::Thirty))
            .times(1)
            .returning(|_| Ok(()));
        let settings = ReminderSettings {
            enabled: true,
            interval: ReminderInterval::Thirty,
        };
        let mut scheduler = ReminderScheduler::new(
            settings,
            Arc::new(MemoryStore::new()),
            notifier,
            TestClock::shared(),
        );

        tokio::time::sleep(30 * MINUTE).await;
        scheduler.fire();

        assert_eq!(
            scheduler.next_reminder(),
            Some(start() + chrono::Duration::minutes(60))
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delivery_still_rearms() -> Result<()> {
        *TEST_LOGGING;
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(anyhow!("no display")));
        let settings = ReminderSettings {
            enabled: true,
            interval: ReminderInterval::Sixty,
        };
        let mut scheduler = ReminderScheduler::new(
            settings,
            Arc::new(MemoryStore::new()),
            notifier,
            TestClock::shared(),
        );

        scheduler.fire();

        assert!(scheduler.state().is_armed());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_while_disarmed_does_nothing() -> Result<()> {
        *TEST_LOGGING;
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();
        let mut scheduler = ReminderScheduler::new(
            ReminderSettings::default(),
            Arc::new(MemoryStore::new()),
            notifier,
            TestClock::shared(),
        );

        scheduler.fire();

        assert_eq!(*scheduler.state(), SchedulerState::Disarmed);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_loop_fires_on_cadence() -> Result<()> {
        let (scheduler, notifier) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;
        let (handle, receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();

        let run = scheduler.run(receiver, shutdown.clone());

        let (run_result, test_result) = tokio::join!(run, async {
            handle.set_interval(ReminderInterval::Thirty).await?;
            handle.set_enabled(true).await?;

            let first = handle
                .status()
                .await?
                .next_reminder
                .ok_or_else(|| anyhow!("reminder should be pending"))?;
            assert_eq!(first, start() + chrono::Duration::minutes(30));

            tokio::time::sleep(29 * MINUTE).await;
            assert_eq!(notifier.count(), 0);

            tokio::time::sleep(2 * MINUTE).await;
            assert_eq!(notifier.count(), 1);
            assert_eq!(
                handle.status().await?.next_reminder,
                Some(first + chrono::Duration::minutes(30))
            );

            tokio::time::sleep(60 * MINUTE).await;
            assert_eq!(notifier.count(), 3);

            shutdown.cancel();
            anyhow::Ok(())
        });

        run_result?;
        test_result
    }

    #[tokio::test(start_paused = true)]
    async fn test_hourly_chime_runs_without_reminders() -> Result<()> {
        let (scheduler, notifier) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;
        let scheduler = scheduler.with_hourly_chime();
        let (handle, receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();
        let first = until_next_local_hour(start());

        let run = scheduler.run(receiver, shutdown.clone());

        let (run_result, test_result) = tokio::join!(run, async {
            tokio::time::sleep(first - Duration::from_secs(1)).await;
            assert_eq!(notifier.count(), 0);

            tokio::time::sleep(Duration::from_secs(2)).await;
            assert_eq!(notifier.kinds(), vec![ReminderKind::OnTheHour]);

            tokio::time::sleep(HOUR).await;
            assert_eq!(notifier.count(), 2);
            assert_eq!(handle.status().await?.next_reminder, None);

            shutdown.cancel();
            anyhow::Ok(())
        });

        run_result?;
        test_result
    }

    #[tokio::test(start_paused = true)]
    async fn test_hourly_chime_alongside_interval_reminders() -> Result<()> {
        let (scheduler, notifier) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;
        let scheduler = scheduler.with_hourly_chime();
        let (handle, receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();

        let run = scheduler.run(receiver, shutdown.clone());

        let (run_result, test_result) = tokio::join!(run, async {
            handle.set_interval(ReminderInterval::Thirty).await?;
            handle.set_enabled(true).await?;

            tokio::time::sleep(2 * HOUR + Duration::from_secs(1)).await;
            let kinds = notifier.kinds();
            let chimes = kinds.iter().filter(|v| **v == ReminderKind::OnTheHour).count();
            assert_eq!(chimes, 2);
            assert_eq!(kinds.len() - chimes, 4);

            shutdown.cancel();
            anyhow::Ok(())
        });

        run_result?;
        test_result
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_loop_disable_before_firing() -> Result<()> {
        let (scheduler, notifier) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;
        let (handle, receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();

        let run = scheduler.run(receiver, shutdown.clone());

        let (run_result, test_result) = tokio::join!(run, async {
            handle.toggle().await?;
            assert!(handle.status().await?.next_reminder.is_some());

            tokio::time::sleep(20 * MINUTE).await;
            handle.toggle().await?;
            let status = handle.status().await?;
            assert!(!status.settings.enabled);
            assert_eq!(status.next_reminder, None);

            tokio::time::sleep(5 * 60 * MINUTE).await;
            assert_eq!(notifier.count(), 0);

            shutdown.cancel();
            anyhow::Ok(())
        });

        run_result?;
        test_result
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_loop_rearm_replaces_pending_timer() -> Result<()> {
        let (scheduler, notifier) = fresh_scheduler(Arc::new(MemoryStore::new())).await?;
        let (handle, receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();

        let run = scheduler.run(receiver, shutdown.clone());

        let (run_result, test_result) = tokio::join!(run, async {
            handle.set_interval(ReminderInterval::Thirty).await?;
            handle.set_enabled(true).await?;

            tokio::time::sleep(20 * MINUTE).await;
            handle.set_interval(ReminderInterval::Sixty).await?;

            // The 30 minute timer was replaced, the next one is due at minute 80.
            tokio::time::sleep(59 * MINUTE).await;
            assert_eq!(notifier.count(), 0);

            tokio::time::sleep(2 * MINUTE).await;
            assert_eq!(notifier.count(), 1);

            shutdown.cancel();
            anyhow::Ok(())
        });

        run_result?;
        test_result
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_loop_teardown_cancels_reminder() -> Result<()> {
        let store = Arc::new(MemoryStore::new().with_value(
            "reminderSettings",
            "{\"remindersEnabled\":true,\"reminderInterval\":30}",
        ));
        let (scheduler, notifier) = fresh_scheduler(store).await?;
        let (handle, receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();

        let run = scheduler.run(receiver, shutdown.clone());

        let (run_result, _) = tokio::join!(run, async {
            tokio::time::sleep(10 * MINUTE).await;
            shutdown.cancel();
        });
        run_result?;

        tokio::time::sleep(60 * MINUTE).await;
        assert_eq!(notifier.count(), 0);
        assert!(handle.status().await.is_err());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_loop_adopt_does_not_persist() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        let (scheduler, _) = fresh_scheduler(store.clone()).await?;
        let (handle, receiver) = scheduler_channel();
        let shutdown = CancellationToken::new();

        let run = scheduler.run(receiver, shutdown.clone());

        let (run_result, test_result) = tokio::join!(run, async {
            handle
                .adopt(ReminderSettings {
                    enabled: true,
                    interval: ReminderInterval::Ninety,
                })
                .await?;
            let status = handle.status().await?;
            assert_eq!(
                status.next_reminder,
                Some(start() + chrono::Duration::minutes(90))
            );

            shutdown.cancel();
            anyhow::Ok(())
        });

        run_result?;
        test_result?;
        assert_eq!(store.load("reminderSettings").await?, None);
        Ok(())
    }
}
