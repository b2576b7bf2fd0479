use crate::shared_data::{Position, SimulationState};
use rand::Rng;

/// Default per-axis jitter, in degrees.
pub const DEFAULT_JITTER: f64 = 0.0005;

/// Number of steps the deterministic part of the movement takes to cover
/// the whole route.
pub const STEPS_PER_ROUTE: f64 = 100.0;

/// Moves the vehicle from `origin` toward `destination`.
///
/// Each advance adds a fixed increment (`(destination - origin) / 100` per
/// axis) and then an independent uniform jitter in `[-jitter, jitter]` on
/// each axis to emulate road travel.
#[derive(Debug, Clone, Copy)]
pub struct PositionModel {
    destination: Position,
    increment: Position,
    jitter: f64,
}

impl PositionModel {
    pub fn new(origin: Position, destination: Position) -> Self {
        let increment = Position::new(
            (destination.latitude - origin.latitude) / STEPS_PER_ROUTE,
            (destination.longitude - origin.longitude) / STEPS_PER_ROUTE,
        );
        Self {
            destination,
            increment,
            jitter: DEFAULT_JITTER,
        }
    }

    /// Replaces the jitter bound. Zero disables jitter; the sign is ignored.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.abs();
        self
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    pub fn increment(&self) -> Position {
        self.increment
    }

    /// Advances the state's position by one step and returns it.
    pub fn advance<R: Rng + ?Sized>(&self, state: &mut SimulationState, rng: &mut R) -> Position {
        let mut position = state.position();
        position.latitude += self.increment.latitude;
        position.longitude += self.increment.longitude;

        if self.jitter.is_finite() && self.jitter > 0.0 {
            position.latitude += rng.random_range(-self.jitter..=self.jitter);
            position.longitude += rng.random_range(-self.jitter..=self.jitter);
        }

        state.set_position(position);
        position
    }

    /// Arrival predicate: latitude at or past the destination and longitude
    /// at or past it westward.
    pub fn has_arrived(&self, position: Position) -> bool {
        position.latitude >= self.destination.latitude
            && position.longitude <= self.destination.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global_variables::{BIRMINGHAM, LONDON};
    use chrono::NaiveDateTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state_at(position: Position) -> SimulationState {
        SimulationState::new("v", position, NaiveDateTime::default())
    }

    #[test]
    fn hundred_steps_without_jitter_reach_destination() {
        let model = PositionModel::new(LONDON, BIRMINGHAM).with_jitter(0.0);
        let mut state = state_at(LONDON);
        let mut rng = StdRng::seed_from_u64(42);

        let mut last = state.position();
        for _ in 0..100 {
            last = model.advance(&mut state, &mut rng);
        }

        assert!((last.latitude - BIRMINGHAM.latitude).abs() < 1e-9);
        assert!((last.longitude - BIRMINGHAM.longitude).abs() < 1e-9);
    }

    #[test]
    fn jitter_stays_within_bound() {
        let model = PositionModel::new(LONDON, BIRMINGHAM);
        let increment = model.increment();
        let mut state = state_at(LONDON);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..1000 {
            let before = state.position();
            let after = model.advance(&mut state, &mut rng);
            let lat_noise = after.latitude - before.latitude - increment.latitude;
            let lon_noise = after.longitude - before.longitude - increment.longitude;
            assert!(lat_noise.abs() <= DEFAULT_JITTER + 1e-12);
            assert!(lon_noise.abs() <= DEFAULT_JITTER + 1e-12);
        }
    }

    #[test]
    fn negative_jitter_is_treated_as_its_magnitude() {
        let model = PositionModel::new(LONDON, BIRMINGHAM).with_jitter(-0.001);
        let increment = model.increment();
        let mut state = state_at(LONDON);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let before = state.position();
            let after = model.advance(&mut state, &mut rng);
            assert!((after.latitude - before.latitude - increment.latitude).abs() <= 0.001 + 1e-12);
        }
    }

    #[test]
    fn increment_points_toward_destination() {
        let model = PositionModel::new(LONDON, BIRMINGHAM);
        assert!(model.increment().latitude > 0.0);
        assert!(model.increment().longitude < 0.0);
    }

    #[test]
    fn arrival_predicate() {
        let model = PositionModel::new(LONDON, BIRMINGHAM);
        assert!(!model.has_arrived(LONDON));
        assert!(model.has_arrived(BIRMINGHAM));
        assert!(model.has_arrived(Position::new(52.5, -1.9)));
        // north enough but not yet far enough west
        assert!(!model.has_arrived(Position::new(52.5, -1.8)));
    }
}
