use crate::dlog;
use crate::error::{ConvertError, Result};
use crate::matcher::nearest;
use crate::schema::{
    CADENCE_FLOOR, CALORIE_SOURCE, HEALTH_SOURCE, LOCATION_SOURCE, LocationLayout, MOTION_SOURCE,
    SchemaProfile, SchemaVariant,
};
use crate::time::Timestamp;
use crate::types::{ActivityRecord, LocationSample, Sample};
use rusqlite::{Connection, OpenFlags, params};
use std::collections::BTreeSet;
use std::path::Path;

const METRICS_TABLE: &str = "metrics";

/// Open the activity database without ever creating or writing to it.
pub fn open_readonly(path: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)?;
    dlog!("opened sqlite db path={}", path.display());
    Ok(conn)
}

/// Column names of the `metrics` table; empty when the table is missing.
pub fn metrics_columns(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let mut rows = stmt.query([METRICS_TABLE])?;

    let mut out = BTreeSet::new();
    while let Some(row) = rows.next()? {
        out.insert(row.get::<_, String>(0)?);
    }
    Ok(out)
}

/// Pull every series for one activity using the variant's column layout.
pub fn extract(
    conn: &Connection,
    variant: SchemaVariant,
    activity_id: &str,
) -> Result<ActivityRecord> {
    let profile = variant.profile();

    let altitudes = read_altitudes(conn, profile, activity_id)?;
    let locations = read_locations(conn, profile, activity_id, &altitudes)?;
    let heart_rates = read_heart_rates(conn, profile, activity_id)?;
    let cadences = read_cadences(conn, profile, activity_id)?;
    let calories = read_calories(conn, profile, activity_id)?;

    tracing::info!(
        schema = %variant,
        activity = activity_id,
        locations = locations.len(),
        altitudes = altitudes.len(),
        heart_rates = heart_rates.len(),
        cadences = cadences.len(),
        calories,
        "extracted activity metrics"
    );

    Ok(ActivityRecord {
        locations,
        heart_rates,
        cadences,
        calories,
    })
}

fn read_altitudes(
    conn: &Connection,
    profile: &SchemaProfile,
    activity_id: &str,
) -> Result<Vec<Sample<f64>>> {
    let value = profile.value_column;
    let marker = profile.location_marker;
    let sql = format!(
        "SELECT startDate, {value} FROM metrics
         WHERE activityID = ?1 AND source = ?2
           AND {marker} IS NULL AND {value} IS NOT NULL
         ORDER BY startDate"
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![activity_id, LOCATION_SOURCE])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let time = parse_time_column(row)?;
        let altitude: f64 = row.get(1)?;
        out.push(Sample::new(time, altitude));
    }

    sort_by_time(&mut out);
    Ok(out)
}

fn read_locations(
    conn: &Connection,
    profile: &SchemaProfile,
    activity_id: &str,
    altitudes: &[Sample<f64>],
) -> Result<Vec<LocationSample>> {
    let marker = profile.location_marker;
    let columns = match profile.location {
        LocationLayout::Packed { column } => column.to_string(),
        LocationLayout::Split {
            latitude,
            longitude,
        } => format!("{latitude}, {longitude}"),
    };
    let sql = format!(
        "SELECT startDate, {columns} FROM metrics
         WHERE activityID = ?1 AND source = ?2 AND {marker} IS NOT NULL
         ORDER BY startDate"
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![activity_id, LOCATION_SOURCE])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let time = parse_time_column(row)?;

        let coords = match profile.location {
            LocationLayout::Packed { .. } => {
                let text: String = row.get(1)?;
                match parse_coordinate(&text) {
                    Ok(pair) => Some(pair),
                    Err(e) => {
                        tracing::warn!(time = %time, err = %e, "skipping location row");
                        None
                    }
                }
            }
            LocationLayout::Split { .. } => {
                let lat: Option<f64> = row.get(1)?;
                let lon: Option<f64> = row.get(2)?;
                lat.zip(lon)
            }
        };

        let Some((latitude, longitude)) = coords else {
            dlog!("location_row_without_coordinates time={time}");
            continue;
        };

        out.push(LocationSample {
            time,
            latitude,
            longitude,
            altitude: nearest(time, altitudes).unwrap_or(0.0),
        });
    }

    out.sort_by_key(|l| l.time);
    Ok(out)
}

fn read_heart_rates(
    conn: &Connection,
    profile: &SchemaProfile,
    activity_id: &str,
) -> Result<Vec<Sample<i64>>> {
    let column = profile.heart_rate_column;
    let filter = if profile.heart_rate_requires_value {
        format!("AND {column} IS NOT NULL")
    } else {
        String::new()
    };
    let sql = format!(
        "SELECT startDate, {column} FROM metrics
         WHERE activityID = ?1 AND source = ?2 {filter}
         ORDER BY startDate"
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![activity_id, HEALTH_SOURCE])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let time = parse_time_column(row)?;
        let Some(bpm) = row.get::<_, Option<f64>>(1)? else {
            dlog!("heart_rate_row_without_value time={time}");
            continue;
        };
        out.push(Sample::new(time, bpm.trunc() as i64));
    }

    sort_by_time(&mut out);
    Ok(out)
}

fn read_cadences(
    conn: &Connection,
    profile: &SchemaProfile,
    activity_id: &str,
) -> Result<Vec<Sample<i64>>> {
    let value = profile.value_column;
    let exclusion = profile
        .cadence_exclusion
        .map_or_else(String::new, |c| format!("AND {c} IS NULL"));
    let sql = format!(
        "SELECT startDate, {value} FROM metrics
         WHERE activityID = ?1 AND source = ?2 AND {value} > ?3 {exclusion}
         ORDER BY startDate"
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![activity_id, MOTION_SOURCE, CADENCE_FLOOR])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let time = parse_time_column(row)?;
        let spm: f64 = row.get(1)?;
        out.push(Sample::new(time, spm_to_rpm(spm)));
    }

    sort_by_time(&mut out);
    Ok(out)
}

fn read_calories(conn: &Connection, profile: &SchemaProfile, activity_id: &str) -> Result<i64> {
    let value = profile.value_column;
    let sql = format!(
        "SELECT MAX({value}) FROM metrics
         WHERE activityID = ?1 AND source = ?2"
    );

    let max: Option<f64> =
        conn.query_row(&sql, params![activity_id, CALORIE_SOURCE], |row| row.get(0))?;
    Ok(max.map_or(0, millikcal_to_kcal))
}

fn parse_time_column(row: &rusqlite::Row<'_>) -> Result<Timestamp> {
    let text: String = row.get(0)?;
    Timestamp::parse(&text)
}

fn sort_by_time<V>(series: &mut [Sample<V>]) {
    series.sort_by_key(|s| s.time);
}

/// `"lat,lon"` as stored by the phone.
pub fn parse_coordinate(text: &str) -> Result<(f64, f64)> {
    let malformed = || ConvertError::MalformedCoordinate {
        text: text.to_string(),
    };

    let (lat, lon) = text.split_once(',').ok_or_else(malformed)?;
    let lat = lat.trim().parse::<f64>().map_err(|_| malformed())?;
    let lon = lon.trim().parse::<f64>().map_err(|_| malformed())?;
    Ok((lat, lon))
}

/// Running cadence: TCX wants one count per stride pair.
pub fn spm_to_rpm(spm: f64) -> i64 {
    (spm / 2.0).trunc() as i64
}

/// Calories are stored in thousandths of a kcal.
pub fn millikcal_to_kcal(raw: f64) -> i64 {
    (raw / 1000.0).trunc() as i64
}
