//! Domain error types.

use chrono::NaiveDate;

/// Structural errors raised while building a panel.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PanelError {
    #[error("empty asset universe")]
    EmptyUniverse,

    #[error("row {row} has {got} cells, expected {expected}")]
    RowShape {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("row count {rows} does not match date count {dates}")]
    RowCount { rows: usize, dates: usize },

    #[error("dates not strictly ascending at row {row}")]
    UnsortedDates { row: usize },
}

/// Top-level error type for crossmom.
#[derive(Debug, thiserror::Error)]
pub enum CrossmomError {
    #[error("insufficient data: have {rows} rows, need at least {minimum}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error("non-positive price for {asset} on {date}")]
    NonPositivePrice { asset: String, date: NaiveDate },

    #[error("panel alignment mismatch: {reason}")]
    AlignmentMismatch { reason: String },

    #[error("undefined signal on {date}: {reason}")]
    UndefinedSignal { date: NaiveDate, reason: String },

    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CrossmomError> for std::process::ExitCode {
    fn from(err: &CrossmomError) -> Self {
        let code: u8 = match err {
            CrossmomError::Io(_) => 1,
            CrossmomError::ConfigParse { .. }
            | CrossmomError::ConfigMissing { .. }
            | CrossmomError::ConfigInvalid { .. } => 2,
            CrossmomError::Data { .. } | CrossmomError::Panel(_) => 3,
            CrossmomError::AlignmentMismatch { .. } | CrossmomError::UndefinedSignal { .. } => 4,
            CrossmomError::InsufficientData { .. } | CrossmomError::NonPositivePrice { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
