pub mod journey_log;
pub mod route_plot;
