use thiserror::Error;

/// Error types for an invalid [`EstimatorConfig`](crate::config::EstimatorConfig).
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero or negative.
    #[error("{name} must be positive, got {value}")]
    NotPositive {
        /// Name of the offending field
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// The settle threshold does not fit in the measurement window.
    #[error("settle threshold ({settle_threshold}) must be between 1 and max samples ({max_samples})")]
    SettleThresholdOutOfRange {
        /// Configured settle threshold
        settle_threshold: usize,
        /// Configured window capacity
        max_samples: usize,
    },

    /// The gaze limit is outside the normalized blend shape range.
    #[error("gaze limit must be in (0, 1], got {0}")]
    GazeLimitOutOfRange(f32),

    /// A value is NaN or infinite.
    #[error("{0} must be finite")]
    NotFinite(&'static str),
}

/// Error types for building and parsing measurement reports.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    /// A required contact field was left empty.
    #[error("{0} must not be empty")]
    EmptyContactField(&'static str),

    /// A contact field spans more than one line.
    #[error("{0} must be a single line")]
    MultilineContactField(&'static str),

    /// A contact field equals the placeholder used for missing values.
    #[error("{0} must not be `{1}`")]
    ReservedContactValue(&'static str, &'static str),

    /// A report body line is missing or out of order.
    #[error("expected line starting with `{expected}`, got `{found}`")]
    UnexpectedLine {
        /// Label the parser expected
        expected: &'static str,
        /// The line that was found instead
        found: String,
    },

    /// A numeric report field could not be parsed.
    #[error("invalid number for {field}: `{value}`")]
    InvalidNumber {
        /// Label of the field
        field: &'static str,
        /// Raw text of the field
        value: String,
    },
}

/// Error types for actions delivered to a measurement session.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// The session has been torn down and accepts no more events.
    #[error("session has been torn down")]
    TornDown,

    /// The action requires a settled measurement window.
    #[error("measurement has not settled yet")]
    NotSettled,

    /// No pupil observation has been accepted yet.
    #[error("no pupil observation available")]
    NoObservation,

    /// No valid calibration ratio has been computed yet.
    #[error("calibration unavailable")]
    CalibrationUnavailable,

    /// The action is only valid while measuring segment height.
    #[error("segment height adjustment requires segment height mode")]
    NotInSegmentHeightMode,

    /// Segment height mode was requested twice.
    #[error("already measuring segment height")]
    AlreadyInSegmentHeightMode,
}
