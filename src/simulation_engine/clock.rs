use crate::shared_data::SimulationState;
use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta};
use rand::Rng;

/// Local wall-clock time cut to microseconds, used as the journey's start.
pub fn wall_clock_start() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Simulated wall-clock that jumps forward a random number of seconds per tick.
#[derive(Debug, Clone, Copy)]
pub struct VirtualClock {
    min_step_secs: i64,
    max_step_secs: i64,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    /// Steps of 30 to 60 simulated seconds.
    pub const fn new() -> Self {
        Self {
            min_step_secs: 30,
            max_step_secs: 60,
        }
    }

    /// Moves the state's timestamp forward and returns the new value.
    pub fn advance<R: Rng + ?Sized>(&self, state: &mut SimulationState, rng: &mut R) -> NaiveDateTime {
        let step = rng.random_range(self.min_step_secs..=self.max_step_secs);
        let next = state.timestamp() + TimeDelta::seconds(step);
        state.set_timestamp(next);
        next
    }
}
