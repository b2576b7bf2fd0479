use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The `(latitude, longitude)` pair carried by events as `location`.
    pub fn as_pair(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Mutable state of the single simulated vehicle.
///
/// Owned by the journey controller; the clock and the position model
/// borrow it mutably to advance it once per tick.
#[derive(Debug, Clone)]
pub struct SimulationState {
    vehicle_id: String,
    position: Position,
    timestamp: NaiveDateTime,
}

impl SimulationState {
    pub fn new(vehicle_id: impl Into<String>, start: Position, start_time: NaiveDateTime) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            position: start,
            timestamp: start_time,
        }
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: NaiveDateTime) {
        self.timestamp = timestamp;
    }

    /// Copies the values every event of the current tick must share.
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            vehicle_id: self.vehicle_id.clone(),
            timestamp: self.timestamp,
            location: self.position.as_pair(),
        }
    }
}

/// The (vehicle id, timestamp, location) triple taken once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSnapshot {
    pub vehicle_id: String,
    pub timestamp: NaiveDateTime,
    pub location: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleEvent {
    pub id: Uuid,
    pub vehicle_id: String,
    pub timestamp: NaiveDateTime,
    pub location: (f64, f64),
    pub speed: f64,
    pub direction: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    #[serde(rename = "fuelType")]
    pub fuel_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsEvent {
    pub id: Uuid,
    pub vehicle_id: String,
    pub timestamp: NaiveDateTime,
    pub speed: f64,
    pub direction: String,
    #[serde(rename = "vehicleType")]
    pub vehicle_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEvent {
    pub id: Uuid,
    pub vehicle_id: String,
    pub camera_id: String,
    pub location: (f64, f64),
    pub timestamp: NaiveDateTime,
    pub snapshot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rain,
    Snow,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Sunny,
        WeatherCondition::Cloudy,
        WeatherCondition::Rain,
        WeatherCondition::Snow,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEvent {
    pub id: Uuid,
    pub vehicle_id: String,
    pub location: (f64, f64),
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    #[serde(rename = "weatherCondition")]
    pub weather_condition: WeatherCondition,
    pub precipitation: f64,
    #[serde(rename = "windSpeed")]
    pub wind_speed: f64,
    /// Relative humidity in percent.
    pub humidity: u8,
    #[serde(rename = "airQualityIndex")]
    pub air_quality_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentType {
    Accident,
    Fire,
    Medical,
    Police,
    #[serde(rename = "None")]
    NoIncident,
}

impl IncidentType {
    pub const ALL: [IncidentType; 5] = [
        IncidentType::Accident,
        IncidentType::Fire,
        IncidentType::Medical,
        IncidentType::Police,
        IncidentType::NoIncident,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentStatus {
    Active,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyEvent {
    pub id: Uuid,
    pub vehicle_id: String,
    #[serde(rename = "incidentId")]
    pub incident_id: Uuid,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub timestamp: NaiveDateTime,
    pub location: (f64, f64),
    pub status: IncidentStatus,
    pub description: String,
}

/// The five event streams, in the order they are published each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Vehicle,
    Gps,
    Traffic,
    Weather,
    Emergency,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Vehicle,
        EventKind::Gps,
        EventKind::Traffic,
        EventKind::Weather,
        EventKind::Emergency,
    ];
}

/// Any one of the five event records. Serializes as the bare record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Event {
    Vehicle(VehicleEvent),
    Gps(GpsEvent),
    Traffic(TrafficEvent),
    Weather(WeatherEvent),
    Emergency(EmergencyEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Vehicle(_) => EventKind::Vehicle,
            Event::Gps(_) => EventKind::Gps,
            Event::Traffic(_) => EventKind::Traffic,
            Event::Weather(_) => EventKind::Weather,
            Event::Emergency(_) => EventKind::Emergency,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Event::Vehicle(e) => e.id,
            Event::Gps(e) => e.id,
            Event::Traffic(e) => e.id,
            Event::Weather(e) => e.id,
            Event::Emergency(e) => e.id,
        }
    }

    pub fn vehicle_id(&self) -> &str {
        match self {
            Event::Vehicle(e) => &e.vehicle_id,
            Event::Gps(e) => &e.vehicle_id,
            Event::Traffic(e) => &e.vehicle_id,
            Event::Weather(e) => &e.vehicle_id,
            Event::Emergency(e) => &e.vehicle_id,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Event::Vehicle(e) => e.timestamp,
            Event::Gps(e) => e.timestamp,
            Event::Traffic(e) => e.timestamp,
            Event::Weather(e) => e.timestamp,
            Event::Emergency(e) => e.timestamp,
        }
    }

    /// GPS events carry no location.
    pub fn location(&self) -> Option<(f64, f64)> {
        match self {
            Event::Vehicle(e) => Some(e.location),
            Event::Gps(_) => None,
            Event::Traffic(e) => Some(e.location),
            Event::Weather(e) => Some(e.location),
            Event::Emergency(e) => Some(e.location),
        }
    }
}

/// The five correlated events produced by one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickEvents {
    pub tick: u64,
    pub snapshot: TickSnapshot,
    pub vehicle: VehicleEvent,
    pub gps: GpsEvent,
    pub traffic: TrafficEvent,
    pub weather: WeatherEvent,
    pub emergency: EmergencyEvent,
}

impl TickEvents {
    /// Events in publish order: vehicle, gps, traffic, weather, emergency.
    pub fn to_events(&self) -> [Event; 5] {
        [
            Event::Vehicle(self.vehicle.clone()),
            Event::Gps(self.gps.clone()),
            Event::Traffic(self.traffic.clone()),
            Event::Weather(self.weather.clone()),
            Event::Emergency(self.emergency.clone()),
        ]
    }
}
