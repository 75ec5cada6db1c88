use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid day '{0}', expected one of: Mo, Tu, We, Th, Fr")]
    InvalidDay(String),

    #[error("invalid slot {0}, expected a number between 1 and 8")]
    InvalidSlot(u8),

    #[error("invalid slot '{0}', expected a number between 1 and 8")]
    InvalidSlotLabel(String),

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("cannot open timetable source {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("timetable source {} is not a page dump: {source}", path.display())]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write export to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Argument errors come from a bad query, everything else from the source.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidDay(_)
                | Error::InvalidSlot(_)
                | Error::InvalidSlotLabel(_)
                | Error::InvalidTime(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
