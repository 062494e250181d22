use bevy_ecs::prelude::Resource;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

/// Source of "now" for date/time fallbacks and the calendar's today marker.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardClock {
    /// Local wall-clock time.
    #[default]
    System,
    /// Frozen instant, used by demos and tests.
    Fixed(NaiveDateTime),
}

impl DashboardClock {
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Self::System => Local::now().naive_local(),
            Self::Fixed(instant) => *instant,
        }
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current `(hour, minute)`.
    #[must_use]
    pub fn hour_minute(&self) -> (u32, u32) {
        let now = self.now();
        (now.hour(), now.minute())
    }
}
