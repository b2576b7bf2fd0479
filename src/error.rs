//! Error types shared by the simulator.
//!
//! [`BrokerError`] is a per-message delivery problem and never ends a run on
//! its own. [`SimulationError`] is fatal to the run that returns it.

use std::time::Duration;

/// A message could not be delivered to the broker.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The AMQP client reported an error.
    #[error("AMQP error: {0}")]
    Amqp(#[from] amiquip::Error),

    /// The broker negatively acknowledged the message.
    #[error("broker rejected message on topic '{topic}'")]
    Nacked { topic: String },

    /// No acknowledgment arrived in time.
    #[error("no acknowledgment on topic '{topic}' within {timeout:?}")]
    AckTimeout { topic: String, timeout: Duration },

    /// The topic was never declared on this broker.
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),

    /// Any other delivery failure reported by a broker implementation.
    #[error("{0}")]
    Other(String),
}

/// A configuration value could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors that end a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// An event could not be encoded. Indicates a generator/schema bug.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The broker connection could not be established or closed.
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The background publishing task panicked or was cancelled.
    #[error("publish task failed: {0}")]
    PublishTask(String),

    /// The publisher was lost by an earlier failed publishing task.
    #[error("publisher is no longer available")]
    PublisherUnavailable,

    #[error("journey log error: {0}")]
    JourneyLog(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
