//! Periodic drink reminders. [settings] holds what the user configured, [scheduler] turns it
//! into a single pending timer and [notifier] is where a due reminder ends up.

pub mod notifier;
pub mod scheduler;
pub mod settings;
