use thiserror::Error;

/// Placeholder id used when a record is so malformed its id is unreadable.
pub const UNKNOWN_ID: &str = "<unknown>";

/// A remote or local record failed schema validation.
///
/// Parse errors identify the offending record and field so callers can skip
/// and count the record rather than aborting the batch. They are never fatal
/// to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("track {track_id}: missing required field `{field}`")]
    MissingField {
        track_id: String,
        field: &'static str,
    },

    #[error("track {track_id}: invalid `{field}`: {message}")]
    InvalidField {
        track_id: String,
        field: &'static str,
        message: String,
    },

    #[error("track {track_id}: `{field}` value {value:?} contains the delimiter `{delimiter}`")]
    DelimiterInValue {
        track_id: String,
        field: &'static str,
        value: String,
        delimiter: char,
    },
}

impl ParseError {
    /// The id of the record that failed to parse, if it had one.
    pub fn track_id(&self) -> &str {
        match self {
            Self::MissingField { track_id, .. }
            | Self::InvalidField { track_id, .. }
            | Self::DelimiterInValue { track_id, .. } => track_id,
        }
    }

    /// The field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field, .. }
            | Self::InvalidField { field, .. }
            | Self::DelimiterInValue { field, .. } => field,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
