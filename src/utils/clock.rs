use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, Timelike, Utc};
use tokio::time::Instant;

/// Source of wall-clock time and timers for the whole application. Intake timestamps, reminder
/// deadlines and the displayed hour all come from here, so tests can swap in a controlled clock.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);

    /// Hour of the day in the local timezone. Shown in the session header.
    fn local_hour(&self) -> u32 {
        self.time().with_timezone(&Local).hour()
    }
}

pub type SharedClock = Arc<dyn Clock>;

pub struct DefaultClock;

impl DefaultClock {
    pub fn shared() -> SharedClock {
        Arc::new(DefaultClock)
    }
}

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
