use chrono::{Duration, NaiveDate};

/// Which calendar day the planner is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayNavigator {
    date: NaiveDate,
}

impl DayNavigator {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Partition key used by the backend (`YYYY-MM-DD`).
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn is_today(&self, today: NaiveDate) -> bool {
        self.date == today
    }

    /// Jump to an arbitrary date. Returns true if the date changed.
    pub fn set_date(&mut self, date: NaiveDate) -> bool {
        let changed = self.date != date;
        self.date = date;
        changed
    }

    pub fn next_day(&mut self) -> bool {
        self.step(1)
    }

    pub fn previous_day(&mut self) -> bool {
        self.step(-1)
    }

    fn step(&mut self, days: i64) -> bool {
        match self.date.checked_add_signed(Duration::days(days)) {
            Some(date) => self.set_date(date),
            None => false,
        }
    }
}
