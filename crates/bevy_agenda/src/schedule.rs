//! Professional roster and working-hours data, in the camelCase JSON shape the
//! dashboard's save callbacks exchange.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Standard hours for one weekday. Times are `HH:MM`, empty, or `FECHADO`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaySchedule {
    pub day: String,
    pub start: String,
    pub end: String,
    pub lunch_start: String,
    pub lunch_end: String,
}

/// One-off override, e.g. a holiday or vacation day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleException {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub start: String,
    pub end: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeSchedule {
    pub standard: Vec<DaySchedule>,
    pub exceptions: Vec<ScheduleException>,
}

impl EmployeeSchedule {
    /// Standard entry for `day`, if any.
    #[must_use]
    pub fn day(&self, day: &str) -> Option<&DaySchedule> {
        self.standard.iter().find(|entry| entry.day == day)
    }
}

/// Schedules keyed by professional name.
pub type ProfessionalSchedules = BTreeMap<String, EmployeeSchedule>;
