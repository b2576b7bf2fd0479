use journey_simulator::communication::amqp_broker::AmqpBroker;
use journey_simulator::communication::publisher::Publisher;
use journey_simulator::config::SimulatorConfig;
use journey_simulator::error::SimulationError;
use journey_simulator::global_variables::{BIRMINGHAM, LONDON};
use journey_simulator::monitoring::journey_log::CsvJourneyLog;
use journey_simulator::shared_data::SimulationState;
use journey_simulator::simulation_engine::clock::wall_clock_start;
use journey_simulator::simulation_engine::journey::{JourneyController, JourneySettings};
use journey_simulator::simulation_engine::movement::PositionModel;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match SimulatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(config).await {
        log::error!("An unexpected error occurred: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: SimulatorConfig) -> Result<(), SimulationError> {
    let broker = AmqpBroker::connect(&config.amqp_url, &config.topics.all(), config.ack_timeout)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, stopping after the current step...");
            let _ = shutdown_tx.send(true);
        }
    });

    let state = SimulationState::new(config.vehicle_id.clone(), LONDON, wall_clock_start());
    let settings = JourneySettings {
        topics: config.topics.clone(),
        tick_pause: config.tick_pause,
        max_ticks: config.max_ticks,
        ..JourneySettings::default()
    };
    let mut controller = JourneyController::new(
        state,
        PositionModel::new(LONDON, BIRMINGHAM),
        StdRng::seed_from_u64(config.seed),
        Publisher::new(broker),
        settings,
        shutdown_rx,
    );
    if let Some(path) = &config.journey_log {
        log::info!("Writing journey log to {}", path.display());
        controller = controller.with_observer(Box::new(CsvJourneyLog::new(path)));
    }

    let result = controller.run().await;

    if let Some(publisher) = controller.into_publisher() {
        if let Err(e) = publisher.into_inner().close() {
            log::warn!("Error closing broker connection: {}", e);
        }
    }

    let summary = result?;
    log::info!(
        "Journey finished ({:?}) after {} ticks: {} delivered, {} failed, final position {:?} at {}",
        summary.end,
        summary.ticks,
        summary.delivered,
        summary.failed,
        summary.final_position,
        summary.final_timestamp
    );
    Ok(())
}
