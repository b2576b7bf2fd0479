use crate::communication::publisher::PublishOutcome;
use crate::shared_data::{Position, TickEvents};
use crate::simulation_engine::journey::TickObserver;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// One row of the journey log, written after every published tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyLogRecord {
    pub tick: u64,
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub weather_condition: String,
    pub incident_type: String,
    pub delivered: usize,
    pub failed: usize,
}

impl JourneyLogRecord {
    pub fn from_tick(events: &TickEvents, outcomes: &[PublishOutcome]) -> Self {
        let (latitude, longitude) = events.snapshot.location;
        let delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
        Self {
            tick: events.tick,
            timestamp: events.snapshot.timestamp.to_string(),
            latitude,
            longitude,
            speed: events.vehicle.speed,
            weather_condition: format!("{:?}", events.weather.weather_condition),
            incident_type: format!("{:?}", events.emergency.incident_type),
            delivered,
            failed: outcomes.len() - delivered,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

// Appends a record, writing the header only when the file is new.
fn log_to_csv<T: Serialize>(path: &Path, record: &T) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists();
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

/// Tick observer that appends each tick to a CSV file.
#[derive(Debug, Clone)]
pub struct CsvJourneyLog {
    path: PathBuf,
}

impl CsvJourneyLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, record: &JourneyLogRecord) -> Result<(), Box<dyn Error>> {
        log_to_csv(&self.path, record)
    }
}

impl TickObserver for CsvJourneyLog {
    fn on_tick(&mut self, events: &TickEvents, outcomes: &[PublishOutcome]) {
        let record = JourneyLogRecord::from_tick(events, outcomes);
        if let Err(e) = self.append(&record) {
            log::warn!("Error logging tick {} to {}: {}", events.tick, self.path.display(), e);
        }
    }
}

pub fn read_journey_log(path: &Path) -> Result<Vec<JourneyLogRecord>, csv::Error> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    rdr.deserialize().collect()
}

/// Totals over a journey log.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyReport {
    pub ticks: usize,
    pub delivered: usize,
    pub failed: usize,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
    pub distance_km: f64,
    pub average_speed: f64,
}

pub fn summarize(records: &[JourneyLogRecord]) -> JourneyReport {
    let distance_km = records
        .windows(2)
        .map(|pair| haversine_km(pair[0].position(), pair[1].position()))
        .sum();
    let average_speed = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.speed).sum::<f64>() / records.len() as f64
    };

    JourneyReport {
        ticks: records.len(),
        delivered: records.iter().map(|r| r.delivered).sum(),
        failed: records.iter().map(|r| r.failed).sum(),
        first_timestamp: records.first().map(|r| r.timestamp.clone()),
        last_timestamp: records.last().map(|r| r.timestamp.clone()),
        distance_km,
        average_speed,
    }
}

/// Great-circle distance between two positions.
pub fn haversine_km(a: Position, b: Position) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
