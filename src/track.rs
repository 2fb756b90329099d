use crate::error::{ConvertError, Result};
use crate::matcher::nearest;
use crate::time::Timestamp;
use crate::types::{ActivityRecord, Trackpoint};

/// Time-ordered trackpoints of one activity. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<Trackpoint>,
}

#[allow(clippy::len_without_is_empty)]
impl Track {
    /// One trackpoint per location sample, heart rate and cadence merged in
    /// from the nearest sample of each series.
    pub fn build(activity: &ActivityRecord, activity_id: &str) -> Result<Self> {
        if activity.locations.is_empty() {
            return Err(ConvertError::NoLocationData {
                activity_id: activity_id.to_string(),
            });
        }

        let points = activity
            .locations
            .iter()
            .map(|loc| Trackpoint {
                time: loc.time,
                latitude: loc.latitude,
                longitude: loc.longitude,
                altitude: loc.altitude,
                heart_rate_bpm: nearest(loc.time, &activity.heart_rates),
                cadence_rpm: nearest(loc.time, &activity.cadences),
            })
            .collect();

        Ok(Self { points })
    }

    /// Doubles as the TCX activity id.
    pub fn start(&self) -> Timestamp {
        self.points[0].time
    }

    pub fn end(&self) -> Timestamp {
        self.points[self.points.len() - 1].time
    }

    pub fn points(&self) -> &[Trackpoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}
