use std::collections::{BinaryHeap, VecDeque};

use crate::time::{GameClock, ScheduledTime};

pub const ONE_YEAR_DAYS: u64 = 365;
pub const ONE_MONTH_DAYS: u64 = 30;
const IMMEDIATE_THRESHOLD_DAYS: u64 = 1;
const COMPRESSED_BUCKET_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    AiWarCouncil,
    RebellionCheck,
    StrengthEvolution,
    ReparationTransfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSpec {
    EveryDays(u64),
    Monthly,
    Yearly,
}

impl ScheduleSpec {
    fn next_execution_days(&self, last_execution: u64) -> u64 {
        match self {
            ScheduleSpec::EveryDays(days) => last_execution + days,
            ScheduleSpec::Monthly => last_execution + ONE_MONTH_DAYS,
            ScheduleSpec::Yearly => last_execution + ONE_YEAR_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub kind: TaskKind,
    pub execute_at: ScheduledTime,
    pub schedule_spec: Option<ScheduleSpec>,
}

impl ScheduledTask {
    pub fn new(kind: TaskKind, execute_at: u64) -> Self {
        Self {
            kind,
            execute_at: ScheduledTime::new(execute_at),
            schedule_spec: None,
        }
    }

    pub fn with_schedule(mut self, spec: ScheduleSpec) -> Self {
        self.schedule_spec = Some(spec);
        self
    }

    fn reschedule(&self) -> Option<Self> {
        self.schedule_spec.map(|spec| {
            let next_days = spec.next_execution_days(self.execute_at.days);
            let mut next_task = self.clone();
            next_task.execute_at = ScheduledTime::new(next_days);
            next_task
        })
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.execute_at.cmp(&other.execute_at)
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default, Debug)]
pub struct Scheduler {
    immediate_queue: VecDeque<ScheduledTask>,
    short_term_tasks: BinaryHeap<ScheduledTask>,
    long_term_buckets: VecDeque<Vec<ScheduledTask>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            immediate_queue: VecDeque::new(),
            short_term_tasks: BinaryHeap::new(),
            long_term_buckets: VecDeque::new(),
        }
    }

    pub fn schedule(&mut self, task: ScheduledTask) {
        if task.execute_at.days <= IMMEDIATE_THRESHOLD_DAYS {
            self.immediate_queue.push_back(task);
            return;
        }

        if task.execute_at.days <= ONE_YEAR_DAYS {
            self.short_term_tasks.push(task);
        } else {
            let bucket_index =
                ((task.execute_at.days - ONE_YEAR_DAYS) / COMPRESSED_BUCKET_DAYS) as usize;
            while self.long_term_buckets.len() <= bucket_index {
                self.long_term_buckets.push_back(Vec::new());
            }
            if let Some(bucket) = self.long_term_buckets.get_mut(bucket_index) {
                bucket.push(task);
            }
        }
    }

    fn promote_long_term(&mut self, current_days: u64) {
        if current_days < ONE_YEAR_DAYS {
            return;
        }
        let elapsed_since_threshold = current_days - ONE_YEAR_DAYS;
        let buckets_to_promote = (elapsed_since_threshold / COMPRESSED_BUCKET_DAYS) as usize;
        for _ in 0..=buckets_to_promote {
            let promote_now = self
                .long_term_buckets
                .front()
                .map(|bucket| {
                    bucket
                        .iter()
                        .map(|task| task.execute_at.days)
                        .min()
                        .unwrap_or(u64::MAX)
                        <= current_days
                })
                .unwrap_or(false);
            if !promote_now {
                break;
            }
            if let Some(bucket) = self.long_term_buckets.pop_front() {
                for task in bucket {
                    if task.execute_at.days > current_days {
                        self.short_term_tasks.push(task);
                    } else {
                        self.immediate_queue.push_back(task);
                    }
                }
            } else {
                break;
            }
        }
    }

    pub fn next_ready_tasks(&mut self, clock: &GameClock) -> Vec<ScheduledTask> {
        let current_days = clock.total_days();
        self.promote_long_term(current_days);

        let mut ready = Vec::new();
        while let Some(task) = self.short_term_tasks.peek() {
            if task.execute_at.days > current_days {
                break;
            }
            let task = self.short_term_tasks.pop().expect("task popped after peek");
            if let Some(next_task) = task.reschedule() {
                self.schedule(next_task);
            }
            ready.push(task);
        }

        let mut pending = Vec::new();
        while let Some(task) = self.immediate_queue.pop_front() {
            if task.execute_at.days <= current_days {
                if let Some(next_task) = task.reschedule() {
                    self.schedule(next_task);
                }
                ready.push(task);
            } else {
                pending.push(task);
            }
        }
        for task in pending {
            self.immediate_queue.push_front(task);
        }

        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_schedule_requeues_on_day_count() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(
            ScheduledTask::new(TaskKind::AiWarCouncil, ONE_MONTH_DAYS)
                .with_schedule(ScheduleSpec::Monthly),
        );

        let mut clock = GameClock::new();
        clock.advance_days(ONE_MONTH_DAYS);
        let first = scheduler.next_ready_tasks(&clock);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, TaskKind::AiWarCouncil);

        clock.advance_days(ONE_MONTH_DAYS - 1);
        assert!(scheduler.next_ready_tasks(&clock).is_empty());

        clock.advance_days(1);
        let second = scheduler.next_ready_tasks(&clock);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].execute_at.days, ONE_MONTH_DAYS * 2);
    }

    #[test]
    fn yearly_schedule_survives_long_term_bucketing() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(
            ScheduledTask::new(TaskKind::ReparationTransfer, ONE_YEAR_DAYS)
                .with_schedule(ScheduleSpec::Yearly),
        );

        let mut clock = GameClock::new();
        clock.advance_days(ONE_YEAR_DAYS);
        let first = scheduler.next_ready_tasks(&clock);
        assert_eq!(first.len(), 1);

        clock.advance_days(ONE_YEAR_DAYS);
        let second = scheduler.next_ready_tasks(&clock);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].execute_at.days, ONE_YEAR_DAYS * 2);
    }

    #[test]
    fn tasks_fire_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ScheduledTask::new(TaskKind::StrengthEvolution, 30));
        scheduler.schedule(ScheduledTask::new(TaskKind::RebellionCheck, 10));

        let mut clock = GameClock::new();
        clock.advance_days(30);
        let ready = scheduler.next_ready_tasks(&clock);
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0].kind, TaskKind::RebellionCheck);
        assert_eq!(ready[1].kind, TaskKind::StrengthEvolution);
    }
}
