//! On-disk shapes of the stored records. Field names follow the documents written by earlier
//! versions of the widget, so existing data keeps loading.
//!
//! Every field is optional on read. A missing or `null` field falls back on its own, while a
//! document that doesn't parse at all falls back as a whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored under `waterIntake`.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntakeEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_intake: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Stored under `reminderSettings`.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettingsEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_interval: Option<u32>,
}
