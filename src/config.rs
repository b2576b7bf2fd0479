use crate::error::ConfigError;
use crate::global_variables::{
    ACK_TIMEOUT_SECS, AMQP_URL, DEFAULT_SEED, EMERGENCY_TOPIC, GPS_TOPIC, MAX_TICKS,
    TICK_PAUSE_SECS, TRAFFIC_TOPIC, VEHICLE_ID, VEHICLE_TOPIC, WEATHER_TOPIC,
};
use crate::shared_data::EventKind;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Broker topic for each of the five event streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicNames {
    pub vehicle: String,
    pub gps: String,
    pub traffic: String,
    pub weather: String,
    pub emergency: String,
}

impl Default for TopicNames {
    fn default() -> Self {
        Self {
            vehicle: VEHICLE_TOPIC.to_string(),
            gps: GPS_TOPIC.to_string(),
            traffic: TRAFFIC_TOPIC.to_string(),
            weather: WEATHER_TOPIC.to_string(),
            emergency: EMERGENCY_TOPIC.to_string(),
        }
    }
}

impl TopicNames {
    pub fn for_kind(&self, kind: EventKind) -> &str {
        match kind {
            EventKind::Vehicle => &self.vehicle,
            EventKind::Gps => &self.gps,
            EventKind::Traffic => &self.traffic,
            EventKind::Weather => &self.weather,
            EventKind::Emergency => &self.emergency,
        }
    }

    /// All topics in publish order.
    pub fn all(&self) -> [&str; 5] {
        EventKind::ALL.map(|kind| self.for_kind(kind))
    }
}

/// Runtime settings for the journey simulator binary.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub amqp_url: String,
    pub topics: TopicNames,
    pub vehicle_id: String,
    pub seed: u64,
    pub tick_pause: Duration,
    pub ack_timeout: Duration,
    /// `None` runs until arrival or interrupt.
    pub max_ticks: Option<u64>,
    pub journey_log: Option<PathBuf>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            amqp_url: AMQP_URL.to_string(),
            topics: TopicNames::default(),
            vehicle_id: VEHICLE_ID.to_string(),
            seed: DEFAULT_SEED,
            tick_pause: Duration::from_secs(TICK_PAUSE_SECS),
            ack_timeout: Duration::from_secs(ACK_TIMEOUT_SECS),
            max_ticks: Some(MAX_TICKS),
            journey_log: None,
        }
    }
}

impl SimulatorConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults plus whatever `lookup` returns for each
    /// recognised variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("AMQP_URL") {
            config.amqp_url = url;
        }
        if let Some(topic) = lookup("VEHICLE_TOPIC") {
            config.topics.vehicle = topic;
        }
        if let Some(topic) = lookup("GPS_TOPIC") {
            config.topics.gps = topic;
        }
        if let Some(topic) = lookup("TRAFFIC_TOPIC") {
            config.topics.traffic = topic;
        }
        if let Some(topic) = lookup("WEATHER_TOPIC") {
            config.topics.weather = topic;
        }
        if let Some(topic) = lookup("EMERGENCY_TOPIC") {
            config.topics.emergency = topic;
        }
        if let Some(id) = lookup("VEHICLE_ID") {
            config.vehicle_id = id;
        }
        if let Some(seed) = parse_var::<u64, _>(&lookup, "SIMULATION_SEED")? {
            config.seed = seed;
        }
        if let Some(secs) = parse_var::<f64, _>(&lookup, "TICK_PAUSE_SECS")? {
            config.tick_pause = seconds("TICK_PAUSE_SECS", secs)?;
        }
        if let Some(secs) = parse_var::<f64, _>(&lookup, "ACK_TIMEOUT_SECS")? {
            config.ack_timeout = seconds("ACK_TIMEOUT_SECS", secs)?;
        }
        if let Some(max) = parse_var::<u64, _>(&lookup, "MAX_TICKS")? {
            config.max_ticks = (max > 0).then_some(max);
        }
        if let Some(path) = lookup("JOURNEY_LOG") {
            config.journey_log = (!path.is_empty()).then(|| PathBuf::from(path));
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

fn seconds(key: &str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: secs.to_string(),
        reason: e.to_string(),
    })
}
