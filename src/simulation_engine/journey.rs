//! The tick loop that drives a single vehicle from origin to destination.
//!
//! Each tick advances the virtual clock and the position exactly once, builds
//! the five correlated events from one snapshot of the state, and either stops
//! (the vehicle arrived) or publishes them in order before pausing.

use crate::communication::publisher::{Broker, PublishOutcome, Publisher};
use crate::config::TopicNames;
use crate::error::SimulationError;
use crate::global_variables::{CAMERA_ID, GPS_VEHICLE_TYPE, MAX_TICKS, TICK_PAUSE_SECS};
use crate::shared_data::{EventKind, Position, SimulationState, TickEvents};
use crate::simulation_engine::clock::VirtualClock;
use crate::simulation_engine::events::generate_tick_events;
use crate::simulation_engine::movement::PositionModel;
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

/// Knobs for one journey run.
#[derive(Debug, Clone)]
pub struct JourneySettings {
    pub topics: TopicNames,
    pub camera_id: String,
    pub gps_vehicle_type: String,
    /// Real time to wait between ticks.
    pub tick_pause: Duration,
    /// Ticks to attempt before giving up; `None` means no ceiling.
    pub max_ticks: Option<u64>,
}

impl Default for JourneySettings {
    fn default() -> Self {
        Self {
            topics: TopicNames::default(),
            camera_id: CAMERA_ID.to_string(),
            gps_vehicle_type: GPS_VEHICLE_TYPE.to_string(),
            tick_pause: Duration::from_secs(TICK_PAUSE_SECS),
            max_ticks: Some(MAX_TICKS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// An operator interrupt was observed.
    Interrupted,
    /// The tick ceiling was reached before arrival.
    TickLimitReached,
}

/// States of the journey loop.
#[derive(Debug)]
pub enum JourneyPhase {
    Ticking,
    Publishing(Box<TickEvents>),
    Arrived,
    Aborted(AbortReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyEnd {
    Arrived,
    Aborted(AbortReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JourneySummary {
    pub end: JourneyEnd,
    /// Ticks started, including the final arrival tick.
    pub ticks: u64,
    pub delivered: usize,
    pub failed: usize,
    pub final_position: Position,
    pub final_timestamp: NaiveDateTime,
}

/// Hook called after each tick whose five events were all attempted.
pub trait TickObserver: Send {
    fn on_tick(&mut self, events: &TickEvents, outcomes: &[PublishOutcome]);
}

/// Observer that ignores every tick.
pub struct NoOpObserver;

impl TickObserver for NoOpObserver {
    fn on_tick(&mut self, _events: &TickEvents, _outcomes: &[PublishOutcome]) {}
}

pub struct JourneyController<B> {
    state: SimulationState,
    clock: VirtualClock,
    movement: PositionModel,
    rng: StdRng,
    publisher: Option<Publisher<B>>,
    settings: JourneySettings,
    shutdown: watch::Receiver<bool>,
    observer: Box<dyn TickObserver>,
    ticks: u64,
    delivered: usize,
    failed: usize,
}

impl<B> JourneyController<B>
where
    B: Broker + Send + 'static,
{
    /// `shutdown` flips to `true` when the run should stop.
    pub fn new(
        state: SimulationState,
        movement: PositionModel,
        rng: StdRng,
        publisher: Publisher<B>,
        settings: JourneySettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            state,
            clock: VirtualClock::new(),
            movement,
            rng,
            publisher: Some(publisher),
            settings,
            shutdown,
            observer: Box::new(NoOpObserver),
            ticks: 0,
            delivered: 0,
            failed: 0,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn TickObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn movement(&self) -> &PositionModel {
        &self.movement
    }

    /// Gives back the publisher once the run is over. `None` if a publishing
    /// task was lost.
    pub fn into_publisher(self) -> Option<Publisher<B>> {
        self.publisher
    }

    /// Advances clock and position once and builds the tick's events.
    pub fn tick(&mut self) -> TickEvents {
        self.ticks += 1;
        self.clock.advance(&mut self.state, &mut self.rng);
        self.movement.advance(&mut self.state, &mut self.rng);
        let snapshot = self.state.snapshot();
        generate_tick_events(
            self.ticks,
            snapshot,
            &self.settings.camera_id,
            &self.settings.gps_vehicle_type,
            &mut self.rng,
        )
    }

    /// Runs ticks until arrival, interrupt or the tick ceiling.
    pub async fn run(&mut self) -> Result<JourneySummary, SimulationError> {
        log::info!(
            "Journey of {} starting at {:?} towards {:?}",
            self.state.vehicle_id(),
            self.state.position(),
            self.movement.destination()
        );

        let mut phase = JourneyPhase::Ticking;
        loop {
            phase = match phase {
                JourneyPhase::Ticking => self.step_ticking(),
                JourneyPhase::Publishing(events) => self.step_publishing(*events).await?,
                JourneyPhase::Arrived => {
                    log::info!(
                        "Vehicle has reached its destination after {} ticks. Simulation ending...",
                        self.ticks
                    );
                    return Ok(self.summary(JourneyEnd::Arrived));
                }
                JourneyPhase::Aborted(reason) => {
                    match reason {
                        AbortReason::Interrupted => log::info!("Simulation ended by the user."),
                        AbortReason::TickLimitReached => log::warn!(
                            "Tick limit of {} reached before arrival at {:?}",
                            self.ticks,
                            self.state.position()
                        ),
                    }
                    return Ok(self.summary(JourneyEnd::Aborted(reason)));
                }
            };
        }
    }

    fn step_ticking(&mut self) -> JourneyPhase {
        if self.interrupted() {
            return JourneyPhase::Aborted(AbortReason::Interrupted);
        }
        if let Some(max) = self.settings.max_ticks {
            if self.ticks >= max {
                return JourneyPhase::Aborted(AbortReason::TickLimitReached);
            }
        }

        let events = self.tick();
        let position = self.state.position();
        log::info!(
            "Current Location: ({:.6}, {:.6}), Speed: {:.2} km/h",
            position.latitude,
            position.longitude,
            events.vehicle.speed
        );

        if self.movement.has_arrived(position) {
            JourneyPhase::Arrived
        } else {
            JourneyPhase::Publishing(Box::new(events))
        }
    }

    async fn step_publishing(&mut self, events: TickEvents) -> Result<JourneyPhase, SimulationError> {
        let outcomes = self.publish_tick(&events).await?;
        self.delivered += outcomes.iter().filter(|o| o.is_delivered()).count();
        self.failed += outcomes.iter().filter(|o| !o.is_delivered()).count();

        if outcomes.len() < EventKind::ALL.len() {
            // partial ticks are not recorded by the observer
            log::warn!(
                "Tick {} interrupted after {} of {} publishes",
                events.tick,
                outcomes.len(),
                EventKind::ALL.len()
            );
            return Ok(JourneyPhase::Aborted(AbortReason::Interrupted));
        }
        self.observer.on_tick(&events, &outcomes);

        let pause = self.settings.tick_pause;
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = sleep(pause) => Ok(JourneyPhase::Ticking),
            _ = wait_for_interrupt(&mut shutdown) => Ok(JourneyPhase::Aborted(AbortReason::Interrupted)),
        }
    }

    /// Publishes the tick's events in order on the blocking pool. State is not
    /// touched again until every publish has returned or been abandoned.
    async fn publish_tick(&mut self, events: &TickEvents) -> Result<Vec<PublishOutcome>, SimulationError> {
        let mut publisher = self
            .publisher
            .take()
            .ok_or(SimulationError::PublisherUnavailable)?;
        let topics = self.settings.topics.clone();
        let shutdown = self.shutdown.clone();
        let batch = events.to_events();

        let task = tokio::task::spawn_blocking(move || {
            let mut outcomes = Vec::with_capacity(batch.len());
            for event in &batch {
                if *shutdown.borrow() {
                    log::warn!(
                        "Interrupt received; abandoning {} unpublished events",
                        batch.len() - outcomes.len()
                    );
                    break;
                }
                match publisher.publish(topics.for_kind(event.kind()), event) {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => return (publisher, Err(e)),
                }
            }
            (publisher, Ok(outcomes))
        });

        let (publisher, outcomes) = task
            .await
            .map_err(|e| SimulationError::PublishTask(e.to_string()))?;
        self.publisher = Some(publisher);
        outcomes
    }

    fn interrupted(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn summary(&self, end: JourneyEnd) -> JourneySummary {
        JourneySummary {
            end,
            ticks: self.ticks,
            delivered: self.delivered,
            failed: self.failed,
            final_position: self.state.position(),
            final_timestamp: self.state.timestamp(),
        }
    }
}

/// Resolves once the shutdown flag is set. Never resolves if the sender is
/// gone without having set it.
async fn wait_for_interrupt(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::publisher::Acknowledgment;
    use crate::error::BrokerError;
    use crate::global_variables::{BIRMINGHAM, LONDON};
    use rand::SeedableRng;

    struct CountingBroker {
        sent: usize,
    }

    impl Broker for CountingBroker {
        fn publish(
            &mut self,
            topic: &str,
            _key: &str,
            _payload: &[u8],
        ) -> Result<Acknowledgment, BrokerError> {
            self.sent += 1;
            Ok(Acknowledgment {
                topic: topic.to_string(),
                partition: 0,
            })
        }
    }

    fn controller(
        origin: Position,
        destination: Position,
        max_ticks: Option<u64>,
    ) -> (JourneyController<CountingBroker>, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let settings = JourneySettings {
            tick_pause: Duration::ZERO,
            max_ticks,
            ..JourneySettings::default()
        };
        let controller = JourneyController::new(
            SimulationState::new("Vehicle-Project-111", origin, NaiveDateTime::default()),
            PositionModel::new(origin, destination).with_jitter(0.0),
            StdRng::seed_from_u64(42),
            Publisher::new(CountingBroker { sent: 0 }),
            settings,
            rx,
        );
        (controller, tx)
    }

    #[test]
    fn tick_advances_clock_and_position_once() {
        let (mut controller, _tx) = controller(LONDON, BIRMINGHAM, None);
        let start_time = controller.state().timestamp();
        let increment = controller.movement().increment();

        let events = controller.tick();

        let delta = (controller.state().timestamp() - start_time).num_seconds();
        assert!((30..=60).contains(&delta));
        let position = controller.state().position();
        assert!((position.latitude - (LONDON.latitude + increment.latitude)).abs() < 1e-12);
        assert_eq!(events.snapshot.location, position.as_pair());
        assert_eq!(events.snapshot.timestamp, controller.state().timestamp());
        assert_eq!(events.tick, 1);
    }

    #[tokio::test]
    async fn arrival_on_first_tick_publishes_nothing() {
        let (mut controller, _tx) = controller(BIRMINGHAM, BIRMINGHAM, None);
        let summary = controller.run().await.unwrap();

        assert_eq!(summary.end, JourneyEnd::Arrived);
        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.delivered, 0);
        let publisher = controller.into_publisher().unwrap();
        assert_eq!(publisher.broker().sent, 0);
    }

    #[tokio::test]
    async fn tick_limit_stops_the_run() {
        let (mut controller, _tx) = controller(LONDON, BIRMINGHAM, Some(3));
        let summary = controller.run().await.unwrap();

        assert_eq!(summary.end, JourneyEnd::Aborted(AbortReason::TickLimitReached));
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.delivered, 15);
    }

    #[tokio::test]
    async fn interrupt_before_start_runs_no_tick() {
        let (mut controller, tx) = controller(LONDON, BIRMINGHAM, None);
        tx.send(true).unwrap();
        let summary = controller.run().await.unwrap();

        assert_eq!(summary.end, JourneyEnd::Aborted(AbortReason::Interrupted));
        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.final_position, LONDON);
    }
}
