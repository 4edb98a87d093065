use std::time::{Duration, Instant};

/// Tasks a measurement session schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Periodic landmark scan.
    Scan,
    /// Periodic thinning of the measurement window.
    Thin,
    /// One-shot check whether the export sheet has been dismissed.
    ExportRecheck,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    kind: TaskKind,
    due: Instant,
    period: Option<Duration>,
}

/// Cancellable timers, advanced explicitly with the current time.
///
/// At most one task per [`TaskKind`] is scheduled; scheduling a kind again
/// replaces the previous task.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    /// Creates a scheduler with no tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire every `period`, first at `now + period`.
    pub fn schedule_repeating(&mut self, kind: TaskKind, period: Duration, now: Instant) {
        self.insert(ScheduledTask {
            kind,
            due: now + period,
            period: Some(period),
        });
    }

    /// Schedule `kind` to fire once at `now + delay`.
    pub fn schedule_once(&mut self, kind: TaskKind, delay: Duration, now: Instant) {
        self.insert(ScheduledTask {
            kind,
            due: now + delay,
            period: None,
        });
    }

    fn insert(&mut self, task: ScheduledTask) {
        self.cancel(task.kind);
        self.tasks.push(task);
    }

    /// Cancel `kind`. Returns whether a task was scheduled.
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.kind != kind);
        self.tasks.len() != before
    }

    /// Cancel every task.
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Whether `kind` is currently scheduled.
    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|task| task.kind == kind)
    }

    /// Collect the tasks due at `now`, earliest first.
    ///
    /// Each due task fires once per call. Repeating tasks are re-armed at
    /// `now + period`; one-shot tasks are removed.
    pub fn due(&mut self, now: Instant) -> Vec<TaskKind> {
        let mut fired: Vec<(Instant, TaskKind)> = Vec::new();

        self.tasks.retain_mut(|task| {
            if task.due > now {
                return true;
            }
            fired.push((task.due, task.kind));
            match task.period {
                Some(period) => {
                    task.due = now + period;
                    true
                }
                None => false,
            }
        });

        fired.sort_by_key(|(due, _)| *due);
        fired.into_iter().map(|(_, kind)| kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_repeating() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(TaskKind::Scan, 200 * MS, t0);

        assert!(scheduler.due(t0 + 199 * MS).is_empty());
        assert_eq!(scheduler.due(t0 + 200 * MS), vec![TaskKind::Scan]);
        assert!(scheduler.due(t0 + 300 * MS).is_empty());
        assert_eq!(scheduler.due(t0 + 400 * MS), vec![TaskKind::Scan]);
        assert!(scheduler.is_scheduled(TaskKind::Scan));
    }

    #[test]
    fn test_once() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_once(TaskKind::ExportRecheck, 1000 * MS, t0);

        assert_eq!(
            scheduler.due(t0 + 1500 * MS),
            vec![TaskKind::ExportRecheck]
        );
        assert!(!scheduler.is_scheduled(TaskKind::ExportRecheck));
        assert!(scheduler.due(t0 + 5000 * MS).is_empty());
    }

    #[test]
    fn test_due_order() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(TaskKind::Thin, 1000 * MS, t0);
        scheduler.schedule_repeating(TaskKind::Scan, 200 * MS, t0);

        assert_eq!(
            scheduler.due(t0 + 1000 * MS),
            vec![TaskKind::Scan, TaskKind::Thin]
        );
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(TaskKind::Scan, 200 * MS, t0);
        scheduler.schedule_repeating(TaskKind::Thin, 1000 * MS, t0);

        assert!(scheduler.cancel(TaskKind::Scan));
        assert!(!scheduler.cancel(TaskKind::Scan));
        assert_eq!(scheduler.due(t0 + 1000 * MS), vec![TaskKind::Thin]);

        scheduler.cancel_all();
        assert!(scheduler.due(t0 + 10_000 * MS).is_empty());
    }

    #[test]
    fn test_reschedule_replaces() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(TaskKind::Scan, 200 * MS, t0);
        scheduler.schedule_repeating(TaskKind::Scan, 500 * MS, t0);

        assert!(scheduler.due(t0 + 400 * MS).is_empty());
        assert_eq!(scheduler.due(t0 + 500 * MS), vec![TaskKind::Scan]);
    }
}
