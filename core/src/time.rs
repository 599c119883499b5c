use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    total_days: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self { total_days: 0 }
    }

    pub fn total_days(&self) -> u64 {
        self.total_days
    }

    pub fn advance_days(&mut self, days: u64) -> u64 {
        self.total_days = self.total_days.saturating_add(days);
        days
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub fn from_start() -> Self {
        Self::new(2025, 1, 1)
    }

    pub fn advance_days(&mut self, days: u64) {
        let mut remaining = days;
        while remaining > 0 {
            let days_in_month = days_in_month(self.year, self.month);
            if self.day as u64 + remaining <= days_in_month as u64 {
                self.day = (self.day as u64 + remaining) as u8;
                break;
            } else {
                remaining -= (days_in_month - self.day) as u64 + 1;
                self.day = 1;
                if self.month == 12 {
                    self.month = 1;
                    self.year += 1;
                } else {
                    self.month += 1;
                }
            }
        }
    }

    pub fn whole_years_until(&self, later: CalendarDate) -> u32 {
        if later <= *self {
            return 0;
        }
        let mut years = (later.year - self.year) as u32;
        if (later.month, later.day) < (self.month, self.day) {
            years = years.saturating_sub(1);
        }
        years
    }
}

#[inline]
fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

#[inline]
fn is_leap_year(year: u16) -> bool {
    (year as u32 % 4 == 0 && year as u32 % 100 != 0) || year as u32 % 400 == 0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTime {
    pub days: u64,
}

impl ScheduledTime {
    pub fn new(days: u64) -> Self {
        Self { days }
    }
}

impl Ord for ScheduledTime {
    fn cmp(&self, other: &Self) -> Ordering {
        other.days.cmp(&self.days)
    }
}

impl PartialOrd for ScheduledTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_advances_across_month_and_year() {
        let mut date = CalendarDate::from_start();
        date.advance_days(31);
        assert_eq!(date, CalendarDate::new(2025, 2, 1));
        date.advance_days(365);
        assert_eq!(date, CalendarDate::new(2026, 2, 1));
    }

    #[test]
    fn whole_years_counts_completed_years_only() {
        let start = CalendarDate::new(2025, 3, 15);
        assert_eq!(start.whole_years_until(CalendarDate::new(2026, 3, 14)), 0);
        assert_eq!(start.whole_years_until(CalendarDate::new(2026, 3, 15)), 1);
        assert_eq!(start.whole_years_until(CalendarDate::new(2028, 7, 1)), 3);
        assert_eq!(start.whole_years_until(CalendarDate::new(2024, 1, 1)), 0);
    }

    #[test]
    fn scheduled_time_orders_earliest_first_in_heap() {
        let early = ScheduledTime::new(5);
        let late = ScheduledTime::new(40);
        assert!(early > late);
    }
}
