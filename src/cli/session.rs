//! Interactive single-screen session. Intake actions run inline. Reminders either run alongside
//! on the same task, or, when a reminder daemon is already running, stay with the daemon and the
//! session only edits the stored settings. Leaving the session tears its own scheduler down.

use std::{
    io::{self, BufRead, Write},
    path::Path,
    str::FromStr,
    thread,
    time::Duration,
};

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    daemon::{create_store, shutdown::detect_shutdown},
    intake::{IntakeTracker, ResetOutcome, RESET_PROMPT},
    reminder::{
        notifier::ConsoleNotifier,
        scheduler::{scheduler_channel, ReminderScheduler, SchedulerHandle},
        settings::{ReminderInterval, ReminderSettings},
    },
    storage::{records::load_record, KeyValueStore},
    utils::clock::{DefaultClock, SharedClock},
};

use super::{
    output::{
        render_daemon_reminders, render_header, render_help, render_increments, render_progress,
        render_reminder_status,
    },
    process::daemon_running,
    update_settings,
};

/// How often the displayed hour is refreshed.
pub const CLOCK_REFRESH: Duration = Duration::from_secs(60);

const STDIN_BUFFER: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Add,
    Reset { confirmed: bool },
    Toggle,
    SetEnabled(bool),
    Interval(ReminderInterval),
    Status,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().unwrap_or("status").to_lowercase();
        let argument = words.next();

        let parsed = match (command.as_str(), argument) {
            ("add" | "a" | "drink", None) => SessionCommand::Add,
            ("reset", None) => SessionCommand::Reset { confirmed: false },
            ("reset", Some("yes" | "-y" | "--yes")) => SessionCommand::Reset { confirmed: true },
            ("toggle" | "t", None) => SessionCommand::Toggle,
            ("on", None) => SessionCommand::SetEnabled(true),
            ("off", None) => SessionCommand::SetEnabled(false),
            ("interval" | "i", Some(minutes)) => SessionCommand::Interval(minutes.parse()?),
            ("interval" | "i", None) => return Err(anyhow!("Usage: interval <30|60|90|120>")),
            ("status" | "s", None) => SessionCommand::Status,
            ("help" | "?", None) => SessionCommand::Help,
            ("quit" | "q" | "exit", None) => SessionCommand::Quit,
            _ => return Err(anyhow!("Unknown command {s:?}, type help for the list")),
        };
        Ok(parsed)
    }
}

/// Where reminder changes made in the session end up.
pub enum ReminderControl<S> {
    /// The session runs its own scheduler.
    Scheduler(SchedulerHandle),
    /// A background daemon owns the timer. Changes are written to storage and the daemon adopts
    /// them on its next poll.
    Stored(S),
}

impl<S: KeyValueStore> ReminderControl<S> {
    async fn toggle(&self) -> Result<()> {
        match self {
            ReminderControl::Scheduler(handle) => handle.toggle().await,
            ReminderControl::Stored(store) => {
                update_settings(store, ReminderSettings::toggled).await?;
                Ok(())
            }
        }
    }

    async fn set_enabled(&self, enabled: bool) -> Result<()> {
        match self {
            ReminderControl::Scheduler(handle) => handle.set_enabled(enabled).await,
            ReminderControl::Stored(store) => {
                update_settings(store, |v| v.with_enabled(enabled)).await?;
                Ok(())
            }
        }
    }

    async fn set_interval(&self, interval: ReminderInterval) -> Result<()> {
        match self {
            ReminderControl::Scheduler(handle) => handle.set_interval(interval).await,
            ReminderControl::Stored(store) => {
                update_settings(store, |v| v.with_interval(interval)).await?;
                Ok(())
            }
        }
    }

    async fn render_status(&self, clock: &SharedClock) -> Result<String> {
        match self {
            ReminderControl::Scheduler(handle) => {
                Ok(render_reminder_status(&handle.status().await?))
            }
            ReminderControl::Stored(store) => {
                let settings: ReminderSettings = load_record(store, clock.time()).await?;
                Ok(render_daemon_reminders(&settings))
            }
        }
    }
}

enum SessionEvent {
    Shutdown,
    Tick,
    Line(Option<io::Result<String>>),
}

/// Lines typed into stdin, read on a plain thread. The thread may stay blocked in a read once the
/// session is over, but unlike the runtime's blocking pool it does not keep the process alive.
fn stdin_lines() -> ReceiverStream<io::Result<String>> {
    let (sender, receiver) = mpsc::channel(STDIN_BUFFER);
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
    });
    ReceiverStream::new(receiver)
}

pub async fn run_session(dir: &Path) -> Result<()> {
    let store = create_store(dir)?;
    let clock = DefaultClock::shared();
    let shutdown = CancellationToken::new();

    let mut tracker = IntakeTracker::load(store.clone(), clock.clone()).await?;
    let (reminders, scheduler) = if daemon_running()? {
        info!("Reminder daemon is running, leaving reminders to it");
        (ReminderControl::Stored(store), None)
    } else {
        let (handle, receiver) = scheduler_channel();
        let scheduler =
            ReminderScheduler::load(store, ConsoleNotifier::stdout(), clock.clone()).await?;
        (ReminderControl::Scheduler(handle), Some((scheduler, receiver)))
    };
    let scheduler_task = async {
        match scheduler {
            Some((scheduler, receiver)) => scheduler.run(receiver, shutdown.clone()).await,
            None => Ok(()),
        }
    };

    let mut out = io::stdout();

    info!("Session started");
    let (_, scheduler_result, session_result) = tokio::join!(
        detect_shutdown(shutdown.clone()),
        scheduler_task,
        drive_session(
            &mut tracker,
            reminders,
            stdin_lines(),
            clock,
            shutdown.clone(),
            &mut out
        ),
    );
    info!("Session ended");

    scheduler_result?;
    session_result
}

/// Reads commands until the input ends, `quit` is entered or `shutdown` is cancelled. Always
/// cancels `shutdown` on the way out so everything running next to the session stops too.
pub async fn drive_session<S, R, L, W>(
    tracker: &mut IntakeTracker<S>,
    reminders: ReminderControl<R>,
    mut lines: L,
    clock: SharedClock,
    shutdown: CancellationToken,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    R: KeyValueStore,
    L: Stream<Item = io::Result<String>> + Unpin,
    W: Write,
{
    let result: Result<()> = async {
        let mut hour = clock.local_hour();
        let mut next_tick = clock.instant() + CLOCK_REFRESH;
        render_screen(out, hour, tracker, &reminders, &clock).await?;

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => SessionEvent::Shutdown,
                _ = clock.sleep_until(next_tick) => SessionEvent::Tick,
                line = lines.next() => SessionEvent::Line(line),
            };

            let line = match event {
                SessionEvent::Shutdown => return Ok(()),
                SessionEvent::Tick => {
                    next_tick += CLOCK_REFRESH;
                    hour = clock.local_hour();
                    continue;
                }
                SessionEvent::Line(None) => return Ok(()),
                SessionEvent::Line(Some(line)) => line?,
            };

            let command = match line.parse::<SessionCommand>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
            };
            debug!("Session command {command:?}");

            match command {
                SessionCommand::Add => {
                    tracker.add_water().await?;
                    render_screen(out, hour, tracker, &reminders, &clock).await?;
                }
                SessionCommand::Reset { confirmed } => {
                    let confirmed = if confirmed {
                        true
                    } else {
                        write!(out, "{RESET_PROMPT} [y/N] ")?;
                        out.flush()?;
                        let answer = tokio::select! {
                            _ = shutdown.cancelled() => return Ok(()),
                            line = lines.next() => line.transpose()?.unwrap_or_default(),
                        };
                        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
                    };
                    match tracker.reset_daily_intake(&confirmed).await? {
                        ResetOutcome::Reset => {
                            render_screen(out, hour, tracker, &reminders, &clock).await?
                        }
                        ResetOutcome::Declined => writeln!(out, "Nothing was reset")?,
                    }
                }
                SessionCommand::Toggle => {
                    reminders.toggle().await?;
                    writeln!(out, "{}", reminders.render_status(&clock).await?)?;
                }
                SessionCommand::SetEnabled(enabled) => {
                    reminders.set_enabled(enabled).await?;
                    writeln!(out, "{}", reminders.render_status(&clock).await?)?;
                }
                SessionCommand::Interval(interval) => {
                    reminders.set_interval(interval).await?;
                    writeln!(out, "{}", reminders.render_status(&clock).await?)?;
                }
                SessionCommand::Status => {
                    tracker.refresh().await?;
                    render_screen(out, hour, tracker, &reminders, &clock).await?
                }
                SessionCommand::Help => writeln!(out, "{}", render_help())?,
                SessionCommand::Quit => return Ok(()),
            }
        }
    }
    .await;

    if let Err(e) = &result {
        error!("Session failed {e:?}");
    }
    shutdown.cancel();
    result
}

async fn render_screen<S: KeyValueStore, R: KeyValueStore, W: Write>(
    out: &mut W,
    hour: u32,
    tracker: &IntakeTracker<S>,
    reminders: &ReminderControl<R>,
    clock: &SharedClock,
) -> Result<()> {
    let reminder_status = reminders.render_status(clock).await?;
    writeln!(out, "{}", render_header(hour))?;
    writeln!(out, "{}", render_progress(&tracker.progress()))?;
    writeln!(out, "{}", render_increments(&tracker.increments()))?;
    writeln!(out, "{reminder_status}")?;
    out.flush()?;
    Ok(())
}
