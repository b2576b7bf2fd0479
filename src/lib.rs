//! Single-vehicle journey simulator.
//!
//! Moves one vehicle from London to Birmingham on a virtual clock and, every
//! tick, publishes five correlated event streams (vehicle, GPS, traffic
//! camera, weather, emergency) to RabbitMQ.

pub mod communication;
pub mod config;
pub mod error;
pub mod global_variables;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;
