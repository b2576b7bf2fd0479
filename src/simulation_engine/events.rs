//! Generators for the five correlated event streams.
//!
//! Every generator takes the tick's [`TickSnapshot`] and never looks at the
//! simulation state itself, so all events of one tick agree on vehicle id,
//! timestamp and location.

use crate::shared_data::{
    EmergencyEvent, GpsEvent, IncidentStatus, IncidentType, TickEvents, TickSnapshot,
    TrafficEvent, VehicleEvent, WeatherCondition, WeatherEvent,
};
use rand::seq::IndexedRandom;
use rand::Rng;
use uuid::{Builder, Uuid};

const DIRECTION: &str = "North-South";
const SNAPSHOT_PAYLOAD: &str = "Base64EncodedString";
const INCIDENT_DESCRIPTION: &str = "Description of the incident";

/// A random (version 4) UUID drawn from the run's random source.
pub fn new_event_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.random::<[u8; 16]>()).into_uuid()
}

pub fn generate_vehicle_data<R: Rng + ?Sized>(snapshot: &TickSnapshot, rng: &mut R) -> VehicleEvent {
    VehicleEvent {
        id: new_event_id(rng),
        vehicle_id: snapshot.vehicle_id.clone(),
        timestamp: snapshot.timestamp,
        location: snapshot.location,
        speed: rng.random_range(10.0..40.0),
        direction: DIRECTION.to_string(),
        make: "Kia".to_string(),
        model: "Seltos".to_string(),
        year: 2024,
        fuel_type: "Petrol".to_string(),
    }
}

pub fn generate_gps_data<R: Rng + ?Sized>(
    snapshot: &TickSnapshot,
    vehicle_type: &str,
    rng: &mut R,
) -> GpsEvent {
    GpsEvent {
        id: new_event_id(rng),
        vehicle_id: snapshot.vehicle_id.clone(),
        timestamp: snapshot.timestamp,
        speed: rng.random_range(0.0..40.0),
        direction: DIRECTION.to_string(),
        vehicle_type: vehicle_type.to_string(),
    }
}

pub fn generate_traffic_camera_data<R: Rng + ?Sized>(
    snapshot: &TickSnapshot,
    camera_id: &str,
    rng: &mut R,
) -> TrafficEvent {
    TrafficEvent {
        id: new_event_id(rng),
        vehicle_id: snapshot.vehicle_id.clone(),
        camera_id: camera_id.to_string(),
        location: snapshot.location,
        timestamp: snapshot.timestamp,
        snapshot: SNAPSHOT_PAYLOAD.to_string(),
    }
}

pub fn generate_weather_data<R: Rng + ?Sized>(snapshot: &TickSnapshot, rng: &mut R) -> WeatherEvent {
    WeatherEvent {
        id: new_event_id(rng),
        vehicle_id: snapshot.vehicle_id.clone(),
        location: snapshot.location,
        timestamp: snapshot.timestamp,
        temperature: rng.random_range(-5.0..26.0),
        weather_condition: *WeatherCondition::ALL.choose(rng).unwrap_or(&WeatherCondition::Sunny),
        precipitation: rng.random_range(0.0..25.0),
        wind_speed: rng.random_range(0.0..100.0),
        humidity: rng.random_range(0..=100),
        air_quality_index: rng.random_range(0.0..500.0),
    }
}

pub fn generate_emergency_incident_data<R: Rng + ?Sized>(
    snapshot: &TickSnapshot,
    rng: &mut R,
) -> EmergencyEvent {
    let id = new_event_id(rng);
    let incident_id = new_event_id(rng);
    EmergencyEvent {
        id,
        vehicle_id: snapshot.vehicle_id.clone(),
        incident_id,
        incident_type: *IncidentType::ALL.choose(rng).unwrap_or(&IncidentType::NoIncident),
        timestamp: snapshot.timestamp,
        location: snapshot.location,
        status: if rng.random_bool(0.5) {
            IncidentStatus::Active
        } else {
            IncidentStatus::Resolved
        },
        description: INCIDENT_DESCRIPTION.to_string(),
    }
}

/// Builds all five events of one tick from a single snapshot.
pub fn generate_tick_events<R: Rng + ?Sized>(
    tick: u64,
    snapshot: TickSnapshot,
    camera_id: &str,
    gps_vehicle_type: &str,
    rng: &mut R,
) -> TickEvents {
    let vehicle = generate_vehicle_data(&snapshot, rng);
    let gps = generate_gps_data(&snapshot, gps_vehicle_type, rng);
    let traffic = generate_traffic_camera_data(&snapshot, camera_id, rng);
    let weather = generate_weather_data(&snapshot, rng);
    let emergency = generate_emergency_incident_data(&snapshot, rng);
    TickEvents {
        tick,
        snapshot,
        vehicle,
        gps,
        traffic,
        weather,
        emergency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn snapshot() -> TickSnapshot {
        TickSnapshot {
            vehicle_id: "Vehicle-Project-111".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 4)
                .unwrap()
                .and_hms_opt(10, 0, 45)
                .unwrap(),
            location: (51.6, -0.3),
        }
    }

    #[test]
    fn all_events_share_tick_context() {
        let mut rng = StdRng::seed_from_u64(42);
        let tick = generate_tick_events(3, snapshot(), "cam-1", "private", &mut rng);
        let expected = snapshot();

        for event in tick.to_events() {
            assert_eq!(event.vehicle_id(), expected.vehicle_id);
            assert_eq!(event.timestamp(), expected.timestamp);
            if let Some(location) = event.location() {
                assert_eq!(location, expected.location);
            }
        }
        assert_eq!(tick.tick, 3);
        assert_eq!(tick.traffic.camera_id, "cam-1");
        assert_eq!(tick.gps.vehicle_type, "private");
    }

    #[test]
    fn random_fields_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let snap = snapshot();
        for _ in 0..500 {
            let vehicle = generate_vehicle_data(&snap, &mut rng);
            assert!((10.0..40.0).contains(&vehicle.speed));
            assert_eq!(vehicle.year, 2024);

            let gps = generate_gps_data(&snap, "private", &mut rng);
            assert!((0.0..40.0).contains(&gps.speed));

            let weather = generate_weather_data(&snap, &mut rng);
            assert!((-5.0..26.0).contains(&weather.temperature));
            assert!((0.0..25.0).contains(&weather.precipitation));
            assert!((0.0..100.0).contains(&weather.wind_speed));
            assert!(weather.humidity <= 100);
            assert!((0.0..500.0).contains(&weather.air_quality_index));
        }
    }

    #[test]
    fn categorical_fields_cover_every_variant() {
        let mut rng = StdRng::seed_from_u64(8);
        let snap = snapshot();
        let mut conditions = Vec::new();
        let mut incidents = Vec::new();
        for _ in 0..500 {
            let weather = generate_weather_data(&snap, &mut rng).weather_condition;
            if !conditions.contains(&weather) {
                conditions.push(weather);
            }
            let incident = generate_emergency_incident_data(&snap, &mut rng).incident_type;
            if !incidents.contains(&incident) {
                incidents.push(incident);
            }
        }
        assert_eq!(conditions.len(), WeatherCondition::ALL.len());
        assert_eq!(incidents.len(), IncidentType::ALL.len());
    }

    #[test]
    fn identifiers_are_unique_and_random_version() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = HashSet::new();
        for tick in 0..200 {
            let events = generate_tick_events(tick, snapshot(), "cam", "private", &mut rng);
            assert!(seen.insert(events.emergency.incident_id));
            for event in events.to_events() {
                assert_eq!(event.id().get_version_num(), 4);
                assert!(seen.insert(event.id()), "duplicate id {}", event.id());
            }
        }
        assert_eq!(seen.len(), 200 * 6);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_tick_events(1, snapshot(), "cam", "private", &mut StdRng::seed_from_u64(3));
        let b = generate_tick_events(1, snapshot(), "cam", "private", &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
