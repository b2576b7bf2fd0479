use journey_simulator::global_variables::{BIRMINGHAM, LONDON};
use journey_simulator::monitoring::journey_log::{read_journey_log, summarize};
use journey_simulator::monitoring::route_plot::render_route_plot;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let log_path = PathBuf::from(args.next().unwrap_or_else(|| "journey_log.csv".to_string()));
    let plot_path = PathBuf::from(args.next().unwrap_or_else(|| "journey_route.png".to_string()));

    let records = match read_journey_log(&log_path) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Could not read {}: {}", log_path.display(), e);
            std::process::exit(1);
        }
    };

    let report = summarize(&records);
    println!("Journey Report ({}):", log_path.display());
    println!("Ticks: {}", report.ticks);
    println!("Delivered: {} messages", report.delivered);
    println!("Failed: {} messages", report.failed);
    if let (Some(first), Some(last)) = (&report.first_timestamp, &report.last_timestamp) {
        println!("Virtual time: {} -> {}", first, last);
    }
    println!("Distance covered: {:.1} km", report.distance_km);
    println!("Average speed: {:.1} km/h", report.average_speed);

    match render_route_plot(&records, LONDON, BIRMINGHAM, &plot_path) {
        Ok(()) => println!("Route plot written to {}", plot_path.display()),
        Err(e) => {
            log::error!("Error rendering route plot: {}", e);
            std::process::exit(1);
        }
    }
}
