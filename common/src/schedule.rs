//! Fixed-period task loops on an absolute schedule.

use std::time::{Duration, Instant};

/// Monotonic time source used by [`Schedule`].
pub trait Clock: Send {
    fn now(&self) -> Instant;

    /// Blocks until `deadline`. Returns immediately if it already passed.
    fn sleep_until(&self, deadline: Instant);
}

/// [`Clock`] backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

/// Wake-up times `start + n * period`.
///
/// Each [`Schedule::wait`] advances the deadline by exactly one period, never by
/// the time actually elapsed, so jitter in the work between waits does not
/// accumulate. A cycle that overruns its deadline wakes up immediately and the
/// following cycles catch up.
pub struct Schedule<C: Clock = MonotonicClock> {
    clock: C,
    period: Duration,
    next_deadline: Instant,
}

impl<C: Clock> Schedule<C> {
    /// Starts the schedule now; the first wait ends one period from now.
    pub fn new(clock: C, period: Duration) -> Self {
        let next_deadline = clock.now() + period;
        Self {
            clock,
            period,
            next_deadline,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleeps until the next deadline, then moves it one period ahead.
    ///
    /// Returns the deadline that was waited for.
    pub fn wait(&mut self) -> Instant {
        let deadline = self.next_deadline;
        self.clock.sleep_until(deadline);
        self.next_deadline = deadline + self.period;
        deadline
    }
}

/// One unit of periodic work.
pub trait PeriodicTask: Send {
    fn name(&self) -> &str;

    /// Performs one cycle. Must not block except on bounded waits.
    fn run_cycle(&mut self);
}

/// Runs `task` once per period for the rest of the process lifetime.
pub fn run_periodic<T: PeriodicTask, C: Clock>(mut task: T, mut schedule: Schedule<C>) -> ! {
    log::debug!(
        "{} started with a period of {:?}",
        task.name(),
        schedule.period()
    );

    loop {
        task.run_cycle();
        schedule.wait();
    }
}
