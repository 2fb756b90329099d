//! The two known layouts of the `metrics` table.
//!
//! Each layout is described by a flat [`SchemaProfile`] so the extractor runs
//! a single code path and only swaps column names and predicates.

use crate::error::{ConvertError, Result};
use std::collections::BTreeSet;
use std::fmt;

pub const LOCATION_SOURCE: &str = "com.nike.running.ios.corelocation";
pub const HEALTH_SOURCE: &str = "com.nike.running.ios.healthkit";
pub const MOTION_SOURCE: &str = "com.nike.running.ios.coremotion";
pub const CALORIE_SOURCE: &str = "com.nike.running.ios.caloriecalculation";

/// Motion readings above this are cadence; below are speed.
pub const CADENCE_FLOOR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
    Iphone,
    Watch,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iphone => f.write_str("iphone"),
            Self::Watch => f.write_str("watch"),
        }
    }
}

/// How a location row stores its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationLayout {
    /// One text column holding `"lat,lon"`.
    Packed { column: &'static str },
    /// Latitude and longitude in two numeric columns.
    Split {
        latitude: &'static str,
        longitude: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaProfile {
    pub variant: SchemaVariant,
    /// Numeric reading: altitude, cadence and calories.
    pub value_column: &'static str,
    /// Non-null on coordinate rows, null on altitude-only rows.
    pub location_marker: &'static str,
    pub location: LocationLayout,
    pub heart_rate_column: &'static str,
    /// Heart-rate rows are kept only when `heart_rate_column` is non-null.
    pub heart_rate_requires_value: bool,
    /// Must be null on cadence rows.
    pub cadence_exclusion: Option<&'static str>,
}

pub const IPHONE_PROFILE: SchemaProfile = SchemaProfile {
    variant: SchemaVariant::Iphone,
    value_column: "doubleValue",
    location_marker: "coordinateValue",
    location: LocationLayout::Packed {
        column: "coordinateValue",
    },
    heart_rate_column: "intValue",
    heart_rate_requires_value: true,
    cadence_exclusion: Some("intValue"),
};

pub const WATCH_PROFILE: SchemaProfile = SchemaProfile {
    variant: SchemaVariant::Watch,
    value_column: "value",
    location_marker: "secondaryValue",
    location: LocationLayout::Split {
        latitude: "value",
        longitude: "secondaryValue",
    },
    heart_rate_column: "value",
    heart_rate_requires_value: false,
    cadence_exclusion: None,
};

impl SchemaVariant {
    pub const fn profile(self) -> &'static SchemaProfile {
        match self {
            Self::Iphone => &IPHONE_PROFILE,
            Self::Watch => &WATCH_PROFILE,
        }
    }
}

/// Classify a `metrics` column set.
pub fn detect(columns: &BTreeSet<String>) -> Result<SchemaVariant> {
    let has = |name: &str| columns.contains(name);

    let variant = if has("value") && has("secondaryValue") {
        SchemaVariant::Watch
    } else if has("doubleValue") && has("intValue") {
        SchemaVariant::Iphone
    } else {
        let listed: Vec<&str> = columns.iter().map(String::as_str).collect();
        return Err(ConvertError::UnknownSchema {
            columns: listed.join(", "),
        });
    };

    tracing::info!(schema = %variant, "detected metrics schema");
    Ok(variant)
}
