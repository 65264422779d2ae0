//! Today's water intake. The tracker keeps a copy of the [IntakeRecord] for display, re-reads it
//! before every mutation and writes it back right after, so several processes can share one
//! store.

pub mod confirmation;

use anyhow::Result;
use chrono::{DateTime, Utc};
use confirmation::Confirmation;
use tracing::{debug, info};

use crate::{
    storage::{
        entities::IntakeEntity,
        records::{load_record, save_record, PersistedRecord},
        KeyValueStore,
    },
    utils::{clock::SharedClock, percentage::Percentage},
};

/// Volume logged by one "drink" action.
pub const WATER_INCREMENT_ML: u32 = 300;

/// Target volume used for progress. Not configurable.
pub const DAILY_GOAL_ML: u32 = 3000;

pub const RESET_PROMPT: &str = "Reset today's water intake?";

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct IntakeRecord {
    /// Milliliters consumed today.
    pub current_intake: u32,
    pub last_updated: DateTime<Utc>,
}

impl IntakeRecord {
    pub fn fallback_at(now: DateTime<Utc>) -> Self {
        Self {
            current_intake: 0,
            last_updated: now,
        }
    }
}

impl PersistedRecord for IntakeRecord {
    const KEY: &'static str = "waterIntake";

    type Entity = IntakeEntity;

    fn to_entity(&self) -> IntakeEntity {
        IntakeEntity {
            current_intake: Some(self.current_intake),
            last_updated: Some(self.last_updated),
        }
    }

    fn from_entity(entity: IntakeEntity, now: DateTime<Utc>) -> Self {
        Self {
            current_intake: entity.current_intake.unwrap_or(0),
            last_updated: entity.last_updated.unwrap_or(now),
        }
    }

    fn fallback(now: DateTime<Utc>) -> Self {
        Self::fallback_at(now)
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ResetOutcome {
    Reset,
    Declined,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Progress {
    pub current_ml: u32,
    pub goal_ml: u32,
    /// Unclamped share of the goal.
    pub ratio: Percentage,
}

impl Progress {
    /// Completion shown to the user, never above 100.
    pub fn completion(&self) -> u32 {
        self.ratio.display_clamped()
    }
}

/// One cell of today's log. Only the running total is stored, so every cell carries the time of
/// the latest update.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Increment {
    pub cumulative_ml: u32,
    pub time: DateTime<Utc>,
    pub within_goal: bool,
}

pub struct IntakeTracker<S> {
    record: IntakeRecord,
    store: S,
    clock: SharedClock,
}

impl<S: KeyValueStore> IntakeTracker<S> {
    /// Restores the stored record, falling back to `(0, now)` when it is absent or unreadable.
    pub async fn load(store: S, clock: SharedClock) -> Result<Self> {
        let record = load_record(&store, clock.time()).await?;
        info!("Loaded intake {record:?}");
        Ok(Self {
            record,
            store,
            clock,
        })
    }

    pub fn record(&self) -> IntakeRecord {
        self.record
    }

    /// Picks up changes another process wrote since the last read.
    pub async fn refresh(&mut self) -> Result<IntakeRecord> {
        let record = load_record(&self.store, self.clock.time()).await?;
        if record != self.record {
            debug!("Stored intake changed to {record:?}");
        }
        self.record = record;
        Ok(self.record)
    }

    /// Logs one glass of water. There is no upper bound, intake may go past the goal.
    pub async fn add_water(&mut self) -> Result<IntakeRecord> {
        self.refresh().await?;
        self.record = IntakeRecord {
            current_intake: self.record.current_intake.saturating_add(WATER_INCREMENT_ML),
            last_updated: self.clock.time(),
        };
        info!("Added {WATER_INCREMENT_ML} ml, now {}", self.record.current_intake);
        save_record(&self.store, &self.record).await?;
        Ok(self.record)
    }

    /// Clears today's intake once `confirmation` agrees. A declined reset leaves everything as it
    /// was, including storage.
    pub async fn reset_daily_intake(
        &mut self,
        confirmation: &impl Confirmation,
    ) -> Result<ResetOutcome> {
        if !confirmation.confirm(RESET_PROMPT)? {
            info!("Reset declined");
            return Ok(ResetOutcome::Declined);
        }

        self.refresh().await?;
        self.record = IntakeRecord::fallback_at(self.clock.time());
        info!("Intake reset");
        save_record(&self.store, &self.record).await?;
        Ok(ResetOutcome::Reset)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current_ml: self.record.current_intake,
            goal_ml: DAILY_GOAL_ML,
            ratio: Percentage::of(self.record.current_intake, DAILY_GOAL_ML),
        }
    }

    pub fn increments(&self) -> Vec<Increment> {
        increments_for(&self.record)
    }
}

/// One entry per started increment (`ceil(intake / 300)`). Entries past `ceil(goal / 300)` are
/// flagged as over the goal.
pub fn increments_for(record: &IntakeRecord) -> Vec<Increment> {
    let count = record.current_intake.div_ceil(WATER_INCREMENT_ML);
    let goal_cells = DAILY_GOAL_ML.div_ceil(WATER_INCREMENT_ML);
    (0..count)
        .map(|index| Increment {
            cumulative_ml: (index + 1) * WATER_INCREMENT_ML,
            time: record.last_updated,
            within_goal: index < goal_cells,
        })
        .collect()
}
