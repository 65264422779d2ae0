use std::{fmt::Display, str::FromStr, time::Duration};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::storage::{entities::ReminderSettingsEntity, records::PersistedRecord};

/// Allowed spacing between reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderInterval {
    Thirty,
    #[default]
    Sixty,
    Ninety,
    OneTwenty,
}

impl ReminderInterval {
    pub const ALL: [ReminderInterval; 4] = [
        ReminderInterval::Thirty,
        ReminderInterval::Sixty,
        ReminderInterval::Ninety,
        ReminderInterval::OneTwenty,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            ReminderInterval::Thirty => 30,
            ReminderInterval::Sixty => 60,
            ReminderInterval::Ninety => 90,
            ReminderInterval::OneTwenty => 120,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<ReminderInterval> {
        Self::ALL.into_iter().find(|v| v.minutes() == minutes)
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(u64::from(self.minutes()) * 60)
    }
}

impl Display for ReminderInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.minutes())
    }
}

impl FromStr for ReminderInterval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "30m" and "30min" are accepted as well
        let digits = s.trim().trim_end_matches("min").trim_end_matches('m');
        let minutes = digits.parse::<u32>()?;
        ReminderInterval::from_minutes(minutes)
            .ok_or_else(|| anyhow!("Interval must be one of 30, 60, 90 or 120 minutes, got {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub interval: ReminderInterval,
}

impl ReminderSettings {
    pub fn toggled(self) -> Self {
        Self {
            enabled: !self.enabled,
            ..self
        }
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    pub fn with_interval(self, interval: ReminderInterval) -> Self {
        Self { interval, ..self }
    }
}

impl PersistedRecord for ReminderSettings {
    const KEY: &'static str = "reminderSettings";

    type Entity = ReminderSettingsEntity;

    fn to_entity(&self) -> ReminderSettingsEntity {
        ReminderSettingsEntity {
            reminders_enabled: Some(self.enabled),
            reminder_interval: Some(self.interval.minutes()),
        }
    }

    fn from_entity(entity: ReminderSettingsEntity, _now: DateTime<Utc>) -> Self {
        let interval = match entity.reminder_interval {
            None | Some(0) => ReminderInterval::default(),
            Some(minutes) => ReminderInterval::from_minutes(minutes).unwrap_or_else(|| {
                warn!("Stored reminder interval {minutes} is not supported, using the default");
                ReminderInterval::default()
            }),
        };
        Self {
            enabled: entity.reminders_enabled.unwrap_or(false),
            interval,
        }
    }

    fn fallback(_now: DateTime<Utc>) -> Self {
        Self::default()
    }
}
