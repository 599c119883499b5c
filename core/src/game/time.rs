use crate::{CalendarDate, GameClock, ScheduledTask, Scheduler};

pub(crate) struct SimulationClock {
    clock: GameClock,
    calendar: CalendarDate,
    scheduler: Scheduler,
}

pub(crate) struct DayOutcome {
    pub ready_tasks: Vec<ScheduledTask>,
}

impl SimulationClock {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            clock: GameClock::new(),
            calendar: CalendarDate::from_start(),
            scheduler,
        }
    }

    pub fn calendar_date(&self) -> CalendarDate {
        self.calendar
    }

    pub fn simulation_days(&self) -> u64 {
        self.clock.total_days()
    }

    pub fn advance_day(&mut self) -> DayOutcome {
        self.clock.advance_days(1);
        self.calendar.advance_days(1);
        let ready_tasks = self.scheduler.next_ready_tasks(&self.clock);
        DayOutcome { ready_tasks }
    }
}
