//! Garmin Training Center XML (v2) output.

use crate::error::Result;
use crate::summary::Summary;
use crate::track::Track;
use crate::types::Trackpoint;
use crate::utils::write_atomically;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;
use std::path::Path;

pub const TCX_NAMESPACE: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const TCX_SCHEMA_LOCATION: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2 http://www.garmin.com/xmlschemas/TrainingCenterDatabasev2.xsd";

/// Render and write the document; the destination is only touched once the
/// whole document exists in memory.
pub fn write_tcx(path: &Path, track: &Track, summary: &Summary) -> Result<()> {
    let xml = render_tcx(track, summary)?;
    write_atomically(path, &xml)?;
    tracing::info!(path = %path.display(), trackpoints = track.len(), "wrote tcx file");
    Ok(())
}

pub fn render_tcx(track: &Track, summary: &Summary) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::new("\n")))?;

    let mut root = BytesStart::new("TrainingCenterDatabase");
    root.push_attribute(("xmlns", TCX_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", TCX_SCHEMA_LOCATION));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("Activities")))?;
    write_activity(&mut writer, track, summary)?;
    writer.write_event(Event::End(BytesEnd::new("Activities")))?;

    writer.write_event(Event::End(BytesEnd::new("TrainingCenterDatabase")))?;
    writer.write_event(Event::Text(BytesText::new("\n")))?;

    Ok(writer.into_inner())
}

fn write_activity<W: Write>(writer: &mut Writer<W>, track: &Track, summary: &Summary) -> Result<()> {
    let start = track.start().to_string();

    let mut activity = BytesStart::new("Activity");
    activity.push_attribute(("Sport", "Running"));
    writer.write_event(Event::Start(activity))?;

    write_text_element(writer, "Id", &start)?;

    let mut lap = BytesStart::new("Lap");
    lap.push_attribute(("StartTime", start.as_str()));
    writer.write_event(Event::Start(lap))?;

    write_lap_totals(writer, summary)?;

    writer.write_event(Event::Start(BytesStart::new("Track")))?;
    for point in track.points() {
        write_trackpoint(writer, point)?;
    }
    writer.write_event(Event::End(BytesEnd::new("Track")))?;

    writer.write_event(Event::End(BytesEnd::new("Lap")))?;
    writer.write_event(Event::End(BytesEnd::new("Activity")))?;
    Ok(())
}

/// Lap children in the order the v2 schema requires ahead of `Track`.
fn write_lap_totals<W: Write>(writer: &mut Writer<W>, summary: &Summary) -> Result<()> {
    let total_secs = summary.elapsed.num_milliseconds() as f64 / 1000.0;
    write_text_element(writer, "TotalTimeSeconds", &total_secs.to_string())?;
    write_text_element(
        writer,
        "DistanceMeters",
        &format!("{:.1}", summary.distance_meters),
    )?;

    let calories = u16::try_from(summary.calories_kcal.max(0)).unwrap_or(u16::MAX);
    write_text_element(writer, "Calories", &calories.to_string())?;

    if let Some(max_bpm) = summary.max_heart_rate_bpm {
        let avg = summary.avg_heart_rate_bpm.round() as i64;
        write_value_element(writer, "AverageHeartRateBpm", &avg.to_string())?;
        write_value_element(writer, "MaximumHeartRateBpm", &max_bpm.to_string())?;
    }

    write_text_element(writer, "Intensity", "Active")?;
    write_text_element(writer, "TriggerMethod", "Manual")?;
    Ok(())
}

fn write_trackpoint<W: Write>(writer: &mut Writer<W>, point: &Trackpoint) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("Trackpoint")))?;

    write_text_element(writer, "Time", &point.time.to_string())?;

    writer.write_event(Event::Start(BytesStart::new("Position")))?;
    write_text_element(writer, "LatitudeDegrees", &point.latitude.to_string())?;
    write_text_element(writer, "LongitudeDegrees", &point.longitude.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("Position")))?;

    write_text_element(writer, "AltitudeMeters", &point.altitude.to_string())?;

    if let Some(bpm) = point.heart_rate_bpm {
        write_value_element(writer, "HeartRateBpm", &bpm.to_string())?;
    }
    if let Some(rpm) = point.cadence_rpm {
        write_text_element(writer, "Cadence", &rpm.to_string())?;
    }

    writer.write_event(Event::End(BytesEnd::new("Trackpoint")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `<name><Value>text</Value></name>`, the TCX heart-rate shape.
fn write_value_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    write_text_element(writer, "Value", text)?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
