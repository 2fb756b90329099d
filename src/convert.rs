use crate::database::{extract, metrics_columns, open_readonly};
use crate::error::Result;
use crate::schema::{SchemaVariant, detect};
use crate::summary::{Summary, summarize};
use crate::tcx::write_tcx;
use crate::track::Track;
use crate::types::ActivityRecord;
use std::path::Path;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub variant: SchemaVariant,
    pub trackpoints: usize,
    pub summary: Summary,
}

/// Read one activity from `database` and write it to `output` as TCX.
///
/// The database is closed before anything is written. On any error the
/// output path is left as it was.
pub fn convert(database: &Path, activity_id: &str, output: &Path) -> Result<Conversion> {
    let (variant, activity) = load_activity(database, activity_id)?;

    let track = Track::build(&activity, activity_id)?;
    let summary = summarize(&track, &activity);

    write_tcx(output, &track, &summary)?;

    Ok(Conversion {
        variant,
        trackpoints: track.len(),
        summary,
    })
}

/// Detect the schema and pull every series, holding the connection only
/// for the duration of the queries.
pub fn load_activity(database: &Path, activity_id: &str) -> Result<(SchemaVariant, ActivityRecord)> {
    let conn = open_readonly(database)?;

    let variant = detect(&metrics_columns(&conn)?)?;
    let activity = extract(&conn, variant, activity_id)?;

    conn.close().map_err(|(_, e)| e)?;
    Ok((variant, activity))
}
