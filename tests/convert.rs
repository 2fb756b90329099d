use nrc_tcx::convert::load_activity;
use nrc_tcx::schema::SchemaVariant;
use nrc_tcx::{ConvertError, convert};
use quick_xml::Reader;
use quick_xml::events::Event;
use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LOC: &str = "com.nike.running.ios.corelocation";
const HK: &str = "com.nike.running.ios.healthkit";
const MOTION: &str = "com.nike.running.ios.coremotion";
const CAL: &str = "com.nike.running.ios.caloriecalculation";

/// Three fixes one second apart, climbing then dipping.
const FIXES: [(&str, f64, f64, f64); 3] = [
    ("2024-06-02 07:30:00", 45.5000, -122.6000, 10.0),
    ("2024-06-02 07:30:01", 45.5001, -122.5999, 12.0),
    ("2024-06-02 07:30:02", 45.5002, -122.5998, 11.0),
];

fn iphone_db(dir: &TempDir, with_locations: bool) -> PathBuf {
    let path = dir.path().join("iphone.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE metrics (
            activityID INTEGER, source TEXT, startDate TEXT,
            doubleValue REAL, intValue INTEGER, coordinateValue TEXT
        );",
    )
    .unwrap();

    let mut insert = conn
        .prepare("INSERT INTO metrics VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
        .unwrap();
    let none_f: Option<f64> = None;
    let none_i: Option<i64> = None;
    let none_s: Option<String> = None;

    for (time, lat, lon, alt) in FIXES {
        if with_locations {
            let coords = format!("{lat},{lon}");
            insert
                .execute(params![7, LOC, time, none_f, none_i, coords])
                .unwrap();
        }
        insert
            .execute(params![7, LOC, time, alt, none_i, none_s])
            .unwrap();
    }
    insert
        .execute(params![7, HK, "2024-06-02 07:30:00.500000", none_f, 140, none_s])
        .unwrap();
    insert
        .execute(params![7, HK, "2024-06-02 07:30:01.500000", none_f, 150, none_s])
        .unwrap();
    insert
        .execute(params![7, MOTION, "2024-06-02 07:30:00", 170.0, none_i, none_s])
        .unwrap();
    insert
        .execute(params![7, MOTION, "2024-06-02 07:30:01", 2.9, none_i, none_s])
        .unwrap();
    // Exactly on the floor: not cadence.
    insert
        .execute(params![7, MOTION, "2024-06-02 07:30:01.500000", 100.0, none_i, none_s])
        .unwrap();
    insert
        .execute(params![7, MOTION, "2024-06-02 07:30:02", 180.0, none_i, none_s])
        .unwrap();
    insert
        .execute(params![7, CAL, "2024-06-02 07:30:02", 250_000.0, none_i, none_s])
        .unwrap();
    // Another activity that must not leak in.
    insert
        .execute(params![8, HK, "2024-06-02 07:30:01", none_f, 199, none_s])
        .unwrap();

    path
}

fn watch_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("watch.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE metrics (
            activityID TEXT, source TEXT, startDate TEXT,
            value REAL, secondaryValue REAL
        );",
    )
    .unwrap();

    let mut insert = conn
        .prepare("INSERT INTO metrics VALUES ('w1', ?1, ?2, ?3, ?4)")
        .unwrap();
    let none: Option<f64> = None;

    for (time, lat, lon, _) in FIXES {
        insert.execute(params![LOC, time, lat, lon]).unwrap();
    }
    // Altitude clock drifts a little from the GPS clock.
    insert
        .execute(params![LOC, "2024-06-02T07:30:00.200Z", 10.0, none])
        .unwrap();
    insert
        .execute(params![LOC, "2024-06-02T07:30:01.200Z", 12.0, none])
        .unwrap();
    insert
        .execute(params![LOC, "2024-06-02T07:30:02.200Z", 11.0, none])
        .unwrap();
    insert
        .execute(params![HK, "2024-06-02 07:30:00.500000", 140.0, none])
        .unwrap();
    insert
        .execute(params![HK, "2024-06-02 07:30:01.500000", 150.0, none])
        .unwrap();
    // Heart-rate row the sensor left empty.
    insert
        .execute(params![HK, "2024-06-02 07:30:01", none, none])
        .unwrap();
    insert
        .execute(params![MOTION, "2024-06-02 07:30:00", 170.0, none])
        .unwrap();
    // Speed reading and a reading exactly on the cadence floor.
    insert
        .execute(params![MOTION, "2024-06-02 07:30:01", 3.1, none])
        .unwrap();
    insert
        .execute(params![MOTION, "2024-06-02 07:30:01.500000", 100.0, none])
        .unwrap();
    insert
        .execute(params![MOTION, "2024-06-02 07:30:02", 180.0, none])
        .unwrap();
    insert
        .execute(params![CAL, "2024-06-02 07:30:02", 250_000.0, none])
        .unwrap();

    path
}

/// `(parent, element, text)` for every text node in the document.
fn leaf_texts(xml: &str) -> Vec<(String, String, String)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut out = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Eof => break,
            Event::Start(e) => {
                stack.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap());
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(e) => {
                let text = e.decode().unwrap().into_owned();
                let name = stack.last().cloned().unwrap_or_default();
                let parent = stack
                    .len()
                    .checked_sub(2)
                    .map(|i| stack[i].clone())
                    .unwrap_or_default();
                out.push((parent, name, text));
            }
            _ => {}
        }
    }
    out
}

fn values_of(texts: &[(String, String, String)], parent: &str, name: &str) -> Vec<String> {
    texts
        .iter()
        .filter(|(p, n, _)| p == parent && n == name)
        .map(|(_, _, t)| t.clone())
        .collect()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn iphone_activity_end_to_end() {
    let dir = TempDir::new().unwrap();
    let db = iphone_db(&dir, true);
    let out = dir.path().join("run.tcx");

    let done = convert(&db, "7", &out).unwrap();
    assert_eq!(done.variant, SchemaVariant::Iphone);
    assert_eq!(done.trackpoints, 3);

    let s = &done.summary;
    assert_eq!(s.elapsed.num_seconds(), 2);
    assert!((s.elevation_gain_meters - 2.0).abs() < 1e-9);
    assert_eq!(s.calories_kcal, 250);
    assert!((s.avg_heart_rate_bpm - 145.0).abs() < 1e-9);
    // 85 and 90 RPM stored, doubled back to steps per minute.
    assert!((s.avg_cadence_spm - 175.0).abs() < 1e-9);
    assert!(s.distance_meters > 20.0 && s.distance_meters < 40.0);
    assert!(s.avg_pace_sec_per_km > 0.0);

    let texts = leaf_texts(&read(&out));
    assert_eq!(
        values_of(&texts, "Trackpoint", "Time"),
        vec![
            "2024-06-02T07:30:00Z",
            "2024-06-02T07:30:01Z",
            "2024-06-02T07:30:02Z"
        ]
    );
    assert_eq!(
        values_of(&texts, "Activity", "Id"),
        vec!["2024-06-02T07:30:00Z"]
    );
    // t=1 sits exactly between both readings; the earlier one wins.
    assert_eq!(
        values_of(&texts, "HeartRateBpm", "Value"),
        vec!["140", "140", "150"]
    );
    assert_eq!(
        values_of(&texts, "Trackpoint", "Cadence"),
        vec!["85", "85", "90"]
    );
    assert_eq!(
        values_of(&texts, "Trackpoint", "AltitudeMeters"),
        vec!["10", "12", "11"]
    );
    assert_eq!(values_of(&texts, "Position", "LatitudeDegrees")[1], "45.5001");
    assert_eq!(values_of(&texts, "Lap", "Calories"), vec!["250"]);
}

fn series_values(series: &[nrc_tcx::types::Sample<i64>]) -> Vec<i64> {
    series.iter().map(|s| s.value).collect()
}

#[test]
fn iphone_cadence_floor_is_exclusive() {
    let dir = TempDir::new().unwrap();
    let db = iphone_db(&dir, true);

    let (variant, activity) = load_activity(&db, "7").unwrap();
    assert_eq!(variant, SchemaVariant::Iphone);
    assert_eq!(series_values(&activity.cadences), vec![85, 90]);
    assert_eq!(series_values(&activity.heart_rates), vec![140, 150]);
}

#[test]
fn watch_cadence_floor_and_empty_heart_rate_rows() {
    let dir = TempDir::new().unwrap();
    let db = watch_db(&dir);

    let (variant, activity) = load_activity(&db, "w1").unwrap();
    assert_eq!(variant, SchemaVariant::Watch);
    assert_eq!(series_values(&activity.cadences), vec![85, 90]);
    assert_eq!(series_values(&activity.heart_rates), vec![140, 150]);
    assert_eq!(activity.calories, 250);
}

#[test]
fn watch_activity_matches_altitude_by_nearest_time() {
    let dir = TempDir::new().unwrap();
    let db = watch_db(&dir);
    let out = dir.path().join("watch.tcx");

    let done = convert(&db, "w1", &out).unwrap();
    assert_eq!(done.variant, SchemaVariant::Watch);
    assert_eq!(done.trackpoints, 3);
    assert!((done.summary.elevation_gain_meters - 2.0).abs() < 1e-9);
    assert_eq!(done.summary.calories_kcal, 250);

    let texts = leaf_texts(&read(&out));
    assert_eq!(
        values_of(&texts, "Trackpoint", "AltitudeMeters"),
        vec!["10", "12", "11"]
    );
    assert_eq!(
        values_of(&texts, "Position", "LongitudeDegrees"),
        vec!["-122.6", "-122.5999", "-122.5998"]
    );
    assert_eq!(
        values_of(&texts, "HeartRateBpm", "Value"),
        vec!["140", "140", "150"]
    );
}

#[test]
fn missing_altitude_defaults_to_zero() {
    let dir = TempDir::new().unwrap();
    let db = iphone_db(&dir, true);
    Connection::open(&db)
        .unwrap()
        .execute("DELETE FROM metrics WHERE coordinateValue IS NULL AND source = ?1", [LOC])
        .unwrap();
    let out = dir.path().join("flat.tcx");

    let done = convert(&db, "7", &out).unwrap();
    assert!(done.summary.elevation_gain_meters.abs() < f64::EPSILON);

    let texts = leaf_texts(&read(&out));
    assert_eq!(
        values_of(&texts, "Trackpoint", "AltitudeMeters"),
        vec!["0", "0", "0"]
    );
}

#[test]
fn no_locations_leaves_existing_output_untouched() {
    let dir = TempDir::new().unwrap();
    let db = iphone_db(&dir, false);
    let out = dir.path().join("keep.tcx");
    fs::write(&out, "previous run").unwrap();

    let err = convert(&db, "7", &out).unwrap_err();
    assert!(matches!(err, ConvertError::NoLocationData { .. }));
    assert_eq!(read(&out), "previous run");
}

#[test]
fn no_locations_creates_no_file() {
    let dir = TempDir::new().unwrap();
    let db = iphone_db(&dir, false);
    let out = dir.path().join("never.tcx");

    assert!(convert(&db, "7", &out).is_err());
    assert!(!out.exists());
}

#[test]
fn unknown_schema_is_rejected_before_querying() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("other.db");
    Connection::open(&db)
        .unwrap()
        .execute_batch("CREATE TABLE metrics (activityID TEXT, reading REAL);")
        .unwrap();
    let out = dir.path().join("x.tcx");

    let err = convert(&db, "1", &out).unwrap_err();
    assert!(matches!(err, ConvertError::UnknownSchema { .. }));
    assert!(!out.exists());
}

#[test]
fn missing_database_is_a_database_error() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("absent.db");
    let out = dir.path().join("x.tcx");

    let err = convert(&db, "1", &out).unwrap_err();
    assert!(matches!(err, ConvertError::Database(_)));
    assert!(!db.exists());
}
