use crate::monitoring::journey_log::JourneyLogRecord;
use crate::shared_data::Position;
use plotters::prelude::*;
use std::error::Error;
use std::ops::Range;
use std::path::Path;

const IMAGE_SIZE: (u32, u32) = (900, 700);
const MARGIN_DEGREES: f64 = 0.05;

/// Longitude and latitude ranges covering the track and both endpoints.
pub fn route_bounds(
    records: &[JourneyLogRecord],
    origin: Position,
    destination: Position,
) -> (Range<f64>, Range<f64>) {
    let points = records
        .iter()
        .map(JourneyLogRecord::position)
        .chain([origin, destination]);

    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_lon = min_lon.min(p.longitude);
        max_lon = max_lon.max(p.longitude);
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
    }

    (
        (min_lon - MARGIN_DEGREES)..(max_lon + MARGIN_DEGREES),
        (min_lat - MARGIN_DEGREES)..(max_lat + MARGIN_DEGREES),
    )
}

/// Draws the logged track from origin to destination as a PNG.
pub fn render_route_plot(
    records: &[JourneyLogRecord],
    origin: Position,
    destination: Position,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let (lon_range, lat_range) = route_bounds(records, origin, destination);

    let root = BitMapBackend::new(output, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Vehicle journey", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lon_range, lat_range)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()?;

    let track: Vec<(f64, f64)> = std::iter::once(origin)
        .chain(records.iter().map(JourneyLogRecord::position))
        .map(|p| (p.longitude, p.latitude))
        .collect();
    chart
        .draw_series(LineSeries::new(track, &BLUE))?
        .label("track")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    // Highlight ticks where at least one publish failed.
    chart.draw_series(
        records
            .iter()
            .filter(|r| r.failed > 0)
            .map(|r| Cross::new((r.longitude, r.latitude), 5, RED)),
    )?;

    chart.draw_series([
        Circle::new((origin.longitude, origin.latitude), 6, GREEN.filled()),
        Circle::new((destination.longitude, destination.latitude), 6, RED.filled()),
    ])?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
