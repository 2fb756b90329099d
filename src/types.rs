use crate::time::Timestamp;

/// One reading of a scalar series (heart rate, cadence, altitude).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<V> {
    pub time: Timestamp,
    pub value: V,
}

impl<V> Sample<V> {
    pub const fn new(time: Timestamp, value: V) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub time: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters; 0.0 when no altitude reading could be matched.
    pub altitude: f64,
}

/// Everything extracted for one activity, each series sorted by time.
#[derive(Debug, Clone, Default)]
pub struct ActivityRecord {
    pub locations: Vec<LocationSample>,
    pub heart_rates: Vec<Sample<i64>>,
    /// Revolutions per minute (raw steps per minute halved).
    pub cadences: Vec<Sample<i64>>,
    pub calories: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trackpoint {
    pub time: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub heart_rate_bpm: Option<i64>,
    pub cadence_rpm: Option<i64>,
}
