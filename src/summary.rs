//! Whole-activity statistics derived from the assembled track.

use crate::track::Track;
use crate::types::{ActivityRecord, Sample, Trackpoint};
use crate::utils::{format_duration, format_pace};
use chrono::TimeDelta;
use std::fmt;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub elapsed: TimeDelta,
    pub distance_meters: f64,
    pub calories_kcal: i64,
    pub elevation_gain_meters: f64,
    /// Seconds per kilometer; 0 when no distance was covered.
    pub avg_pace_sec_per_km: f64,
    pub avg_heart_rate_bpm: f64,
    pub max_heart_rate_bpm: Option<i64>,
    /// Steps per minute.
    pub avg_cadence_spm: f64,
}

pub fn summarize(track: &Track, activity: &ActivityRecord) -> Summary {
    let elapsed = track.end() - track.start();
    let distance_meters = track_distance(track.points());
    let elapsed_secs = elapsed.num_milliseconds() as f64 / 1000.0;

    let avg_pace_sec_per_km = if distance_meters > 0.0 {
        elapsed_secs / (distance_meters / 1000.0)
    } else {
        0.0
    };

    Summary {
        elapsed,
        distance_meters,
        calories_kcal: activity.calories,
        elevation_gain_meters: elevation_gain(track.points()),
        avg_pace_sec_per_km,
        avg_heart_rate_bpm: mean(&activity.heart_rates),
        max_heart_rate_bpm: activity.heart_rates.iter().map(|s| s.value).max(),
        avg_cadence_spm: mean(&activity.cadences) * 2.0,
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn track_distance(points: &[Trackpoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(w[0].latitude, w[0].longitude, w[1].latitude, w[1].longitude))
        .sum()
}

/// Sum of climbs only; descents are ignored.
pub fn elevation_gain(points: &[Trackpoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].altitude - w[0].altitude).max(0.0))
        .sum()
}

fn mean(series: &[Sample<i64>]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().map(|s| s.value as f64).sum::<f64>() / series.len() as f64
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Elapsed:        {}", format_duration(self.elapsed))?;
        writeln!(f, "Distance:       {:.2} km", self.distance_meters / 1000.0)?;
        writeln!(f, "Pace:           {}", format_pace(self.avg_pace_sec_per_km))?;
        writeln!(f, "Elevation gain: {:.1} m", self.elevation_gain_meters)?;
        writeln!(f, "Calories:       {} kcal", self.calories_kcal)?;
        writeln!(f, "Avg heart rate: {:.0} bpm", self.avg_heart_rate_bpm)?;
        write!(f, "Avg cadence:    {:.0} spm", self.avg_cadence_spm)
    }
}
