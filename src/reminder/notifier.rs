use std::{
    io::{self, Write},
    process::Command,
};

use ansi_term::Colour::Cyan;
use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::utils::time::format_local_time;

use super::settings::ReminderInterval;

pub const REMINDER_TITLE: &str = "Time to drink!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    /// One configured interval after the previous reminder.
    Interval(ReminderInterval),
    /// Top of the local hour.
    OnTheHour,
}

/// A reminder that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSignal {
    pub due: DateTime<Utc>,
    pub kind: ReminderKind,
}

impl ReminderSignal {
    pub fn body(&self) -> String {
        match self.kind {
            ReminderKind::Interval(interval) => format!(
                "It's been {} minutes since the last reminder, time for a glass of water.",
                interval.minutes()
            ),
            ReminderKind::OnTheHour => "It's on the hour, time to drink some water.".to_owned(),
        }
    }
}

/// Where due reminders are delivered. A failed delivery is reported back but never retried.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&mut self, signal: &ReminderSignal) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, signal: &ReminderSignal) -> Result<()> {
        (**self).notify(signal)
    }
}

/// Prints the reminder with a terminal bell.
pub struct ConsoleNotifier<W> {
    out: W,
}

impl ConsoleNotifier<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn notify(&mut self, signal: &ReminderSignal) -> Result<()> {
        writeln!(
            self.out,
            "\x07{} {} ({})",
            Cyan.bold().paint(REMINDER_TITLE),
            signal.body(),
            format_local_time(signal.due)
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Hands reminders to an external program, e.g. `notify-send`. Title and body are appended as
/// the last two arguments.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    /// Splits `command` on whitespace into a program and its leading arguments.
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("Notification command is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Notifier for CommandNotifier {
    fn notify(&mut self, signal: &ReminderSignal) -> Result<()> {
        debug!("Running {} for reminder {signal:?}", self.program);
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(REMINDER_TITLE)
            .arg(signal.body())
            .status()?;
        if !status.success() {
            bail!("{} exited with {status}", self.program);
        }
        Ok(())
    }
}
