//! One tick source, several periods.
//!
//! Jobs register with [`Scheduler::on_tick`] and a period expressed in ticks.
//! Each call to [`Scheduler::tick`] advances a single counter and returns
//! the jobs whose period divides it, in registration order.

/// A periodic registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration<J> {
    period: u64,
    job: J,
}

#[derive(Debug, Clone)]
pub struct Scheduler<J> {
    tick_count: u64,
    registrations: Vec<Registration<J>>,
}

impl<J: Copy> Scheduler<J> {
    pub fn new() -> Self {
        Self {
            tick_count: 0,
            registrations: Vec::new(),
        }
    }

    /// Registers `job` to run every `period` ticks. A period of zero is
    /// treated as one.
    pub fn on_tick(&mut self, period: u64, job: J) -> &mut Self {
        self.registrations.push(Registration {
            period: period.max(1),
            job,
        });
        self
    }

    /// Advances the counter and returns the jobs due on this tick.
    pub fn tick(&mut self) -> Vec<J> {
        self.tick_count += 1;
        let n = self.tick_count;
        self.registrations
            .iter()
            .filter(|r| n % r.period == 0)
            .map(|r| r.job)
            .collect()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn reset(&mut self) {
        self.tick_count = 0;
    }
}

impl<J: Copy> Default for Scheduler<J> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Job {
        Fast,
        Medium,
        Slow,
    }

    fn scheduler() -> Scheduler<Job> {
        let mut s = Scheduler::new();
        s.on_tick(1, Job::Fast)
            .on_tick(10, Job::Medium)
            .on_tick(60, Job::Slow);
        s
    }

    #[test]
    fn test_first_tick_runs_only_every_tick_jobs() {
        let mut s = scheduler();
        assert_eq!(s.tick(), vec![Job::Fast]);
        assert_eq!(s.tick_count(), 1);
    }

    #[test]
    fn test_counts_over_one_minute() {
        let mut s = scheduler();
        let mut fast = 0;
        let mut medium = 0;
        let mut slow = 0;
        for _ in 0..120 {
            for job in s.tick() {
                match job {
                    Job::Fast => fast += 1,
                    Job::Medium => medium += 1,
                    Job::Slow => slow += 1,
                }
            }
        }
        assert_eq!(fast, 120);
        assert_eq!(medium, 12);
        assert_eq!(slow, 2);
    }

    #[test]
    fn test_sixtieth_tick_runs_everything_in_order() {
        let mut s = scheduler();
        for _ in 0..59 {
            s.tick();
        }
        assert_eq!(s.tick(), vec![Job::Fast, Job::Medium, Job::Slow]);
    }

    #[test]
    fn test_zero_period_behaves_like_one() {
        let mut s = Scheduler::new();
        s.on_tick(0, Job::Fast);
        assert_eq!(s.tick(), vec![Job::Fast]);
        assert_eq!(s.tick(), vec![Job::Fast]);
    }

    #[test]
    fn test_reset_restarts_phase() {
        let mut s = scheduler();
        for _ in 0..9 {
            s.tick();
        }
        s.reset();
        assert_eq!(s.tick(), vec![Job::Fast]);
    }
}
