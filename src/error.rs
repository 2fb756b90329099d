use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Everything that can stop a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// None of the known timestamp layouts matched.
    #[error("no valid date format found for {text:?}")]
    MalformedTimestamp { text: String },

    /// The `metrics` table has neither the iPhone nor the Watch column set.
    #[error("unknown metrics schema (columns: {columns})")]
    UnknownSchema { columns: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A packed coordinate that is not `lat,lon`.
    #[error("malformed coordinate {text:?}")]
    MalformedCoordinate { text: String },

    #[error("no location data found for activity {activity_id}")]
    NoLocationData { activity_id: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("xml error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for ConvertError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}
