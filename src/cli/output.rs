//! Text rendition of the widget screen.

use std::fmt::Write;

use ansi_term::Colour::{Blue, Green, Red, Yellow};

use crate::{
    intake::{Increment, Progress},
    reminder::scheduler::SchedulerStatus,
    reminder::settings::ReminderSettings,
    utils::time::{format_local_hour_minute, format_local_time},
};

const BAR_WIDTH: u32 = 20;

pub fn render_progress(progress: &Progress) -> String {
    let completion = progress.completion();
    let filled = (completion * BAR_WIDTH / 100) as usize;
    let empty = BAR_WIDTH as usize - filled;
    format!(
        "{} ml / {} ml\n[{}{}] {completion}%",
        progress.current_ml,
        progress.goal_ml,
        Blue.paint("#".repeat(filled)),
        "-".repeat(empty),
    )
}

/// One line per increment, `cumulative volume @ time`. Increments past the goal are highlighted.
pub fn render_increments(increments: &[Increment]) -> String {
    if increments.is_empty() {
        return "No water logged yet".to_owned();
    }

    let mut out = String::new();
    for increment in increments {
        let volume = format!("{:>5} ml", increment.cumulative_ml);
        let volume = if increment.within_goal {
            Blue.paint(volume)
        } else {
            Red.paint(volume)
        };
        // Writing into a String can't fail
        let _ = writeln!(
            out,
            "  {volume} @ {}",
            format_local_hour_minute(increment.time)
        );
    }
    out.pop();
    out
}

pub fn render_settings(settings: &ReminderSettings) -> String {
    let state = if settings.enabled {
        Green.paint("on")
    } else {
        Red.paint("off")
    };
    format!(
        "Reminders: {state}, every {} minutes",
        settings.interval.minutes()
    )
}

pub fn render_reminder_status(status: &SchedulerStatus) -> String {
    let mut out = render_settings(&status.settings);
    if let (true, Some(next)) = (status.settings.enabled, status.next_reminder) {
        let _ = write!(out, "\nNext reminder: {}", format_local_time(next));
    }
    out
}

/// Reminder settings when a background daemon owns the timer. The next reminder time is only
/// known to the daemon.
pub fn render_daemon_reminders(settings: &ReminderSettings) -> String {
    format!(
        "{}\nDelivered by the background daemon",
        render_settings(settings)
    )
}

pub fn render_help() -> String {
    [
        "Commands:",
        "  add            drink 300 ml",
        "  reset [yes]    reset today's intake",
        "  toggle         turn reminders on or off",
        "  on | off       turn reminders on or off explicitly",
        "  interval N     remind every N minutes (30, 60, 90, 120)",
        "  status         show the screen again",
        "  quit           leave the session",
    ]
    .join("\n")
}

pub fn render_header(hour: u32) -> String {
    Yellow
        .bold()
        .paint(format!("Hydrate ({hour:02}h)"))
        .to_string()
}
