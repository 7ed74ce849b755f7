//! Periodic task scheduling for background maintenance.
//!
//! The storage layer needs a recurring low-frequency task to probe
//! connection liveness. Rather than owning a runtime, it consumes a
//! [`Scheduler`] collaborator; deployments embed the probe into whatever
//! scheduler the host application already runs. [`ThreadScheduler`] is a
//! minimal standalone implementation backed by a detached thread.

use std::thread;
use std::time::Duration;

/// A fire-and-forget periodic task scheduler.
///
/// Implementations run the task repeatedly at a fixed period after an
/// initial delay. No return value of the task is observed and no handle
/// is returned; the task keeps itself alive (or not) through what it
/// captures.
pub trait Scheduler {
    /// Schedules `task` to run every `period`, starting after
    /// `initial_delay`.
    fn schedule_repeating(
        &self,
        task: Box<dyn FnMut() + Send + 'static>,
        initial_delay: Duration,
        period: Duration,
    );
}

/// A scheduler that runs each task on its own detached thread.
///
/// Suitable for standalone deployments and tests. The thread sleeps
/// between invocations and runs until the process exits; tasks that
/// should stop earlier must make themselves no-ops (for example by
/// holding only a weak reference to the state they service).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ingot::{Scheduler, ThreadScheduler};
///
/// let scheduler = ThreadScheduler;
/// scheduler.schedule_repeating(
///     Box::new(|| {}),
///     Duration::from_secs(60),
///     Duration::from_secs(60),
/// );
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_repeating(
        &self,
        mut task: Box<dyn FnMut() + Send + 'static>,
        initial_delay: Duration,
        period: Duration,
    ) {
        thread::spawn(move || {
            thread::sleep(initial_delay);
            loop {
                task();
                thread::sleep(period);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_thread_scheduler_runs_repeatedly() {
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = Arc::clone(&count);

        let scheduler = ThreadScheduler;
        scheduler.schedule_repeating(
            Box::new(move || {
                task_count.fetch_add(1, Ordering::SeqCst);
            }),
            Duration::from_millis(1),
            Duration::from_millis(5),
        );

        // Generous wait so the test is not timing-sensitive.
        thread::sleep(Duration::from_millis(200));
        assert!(count.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_thread_scheduler_respects_initial_delay() {
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = Arc::clone(&count);

        let scheduler = ThreadScheduler;
        scheduler.schedule_repeating(
            Box::new(move || {
                task_count.fetch_add(1, Ordering::SeqCst);
            }),
            Duration::from_secs(60),
            Duration::from_secs(60),
        );

        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
