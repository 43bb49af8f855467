use chrono::NaiveDate;

use crate::models::{ScheduleId, UserSettings};

/// Ambient state every page reads: the day on screen, its shown schedule and the settings
#[derive(Debug, Clone)]
pub struct DeskContext {
    pub date: NaiveDate,
    pub schedule: Option<ScheduleId>,
    pub settings: UserSettings,
}

impl DeskContext {
    #[must_use]
    pub fn new(date: NaiveDate, settings: UserSettings) -> Self {
        Self {
            date,
            schedule: None,
            settings,
        }
    }
}
