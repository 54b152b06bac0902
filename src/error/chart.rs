// Chart pipeline error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Chart error code constants
///
/// Error code range: 2001-2007
pub struct ChartErrorCodes {}

impl ChartErrorCodes {
    /// Sample rate is zero
    pub const INVALID_SAMPLE_RATE: i32 = 2001;

    /// Sample buffer contains NaN or infinite values
    pub const NON_FINITE_SAMPLES: i32 = 2002;

    /// Difficulty profile fails validation
    pub const INVALID_PROFILE: i32 = 2003;

    /// Lane count is zero
    pub const INVALID_LANE_COUNT: i32 = 2004;

    /// Chart document is malformed or violates chart ordering
    pub const MALFORMED_CHART: i32 = 2005;

    /// WAV file could not be decoded
    pub const WAV_DECODE_FAILED: i32 = 2006;

    /// Filesystem access failed
    pub const IO_FAILED: i32 = 2007;
}

/// Log a chart error with structured context
///
/// Logs the numeric code, the component and the message so failures in
/// batch generation can be grepped out of CLI output.
pub fn log_chart_error(err: &ChartError, context: &str) {
    error!(
        "Chart error in {}: code={}, component=ChartPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised at the chart pipeline boundary
///
/// Generation itself never fails once its inputs are valid; these errors
/// cover validation of those inputs and the (de)serialization surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// Sample rate must be greater than zero
    InvalidSampleRate { sample_rate: u32 },

    /// Sample buffer contains a non-finite value
    NonFiniteSamples { index: usize },

    /// Difficulty profile violates its schema
    InvalidProfile { reason: String },

    /// Lane count must be greater than zero
    InvalidLaneCount { lane_count: usize },

    /// Chart document could not be parsed or is inconsistent
    MalformedChart { reason: String },

    /// WAV decoding failed
    WavDecode { reason: String },

    /// Filesystem error
    Io { details: String },
}

impl ErrorCode for ChartError {
    fn code(&self) -> i32 {
        match self {
            ChartError::InvalidSampleRate { .. } => ChartErrorCodes::INVALID_SAMPLE_RATE,
            ChartError::NonFiniteSamples { .. } => ChartErrorCodes::NON_FINITE_SAMPLES,
            ChartError::InvalidProfile { .. } => ChartErrorCodes::INVALID_PROFILE,
            ChartError::InvalidLaneCount { .. } => ChartErrorCodes::INVALID_LANE_COUNT,
            ChartError::MalformedChart { .. } => ChartErrorCodes::MALFORMED_CHART,
            ChartError::WavDecode { .. } => ChartErrorCodes::WAV_DECODE_FAILED,
            ChartError::Io { .. } => ChartErrorCodes::IO_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            ChartError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            ChartError::NonFiniteSamples { index } => {
                format!(
                    "Sample buffer contains a non-finite value at index {}",
                    index
                )
            }
            ChartError::InvalidProfile { reason } => {
                format!("Invalid difficulty profile: {}", reason)
            }
            ChartError::InvalidLaneCount { lane_count } => {
                format!("Lane count must be greater than 0 (got {})", lane_count)
            }
            ChartError::MalformedChart { reason } => {
                format!("Malformed chart: {}", reason)
            }
            ChartError::WavDecode { reason } => {
                format!("Failed to decode WAV input: {}", reason)
            }
            ChartError::Io { details } => {
                format!("I/O error: {}", details)
            }
        }
    }
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChartError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ChartError {}

impl From<std::io::Error> for ChartError {
    fn from(err: std::io::Error) -> Self {
        ChartError::Io {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        ChartError::MalformedChart {
            reason: err.to_string(),
        }
    }
}

impl From<hound::Error> for ChartError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => io.into(),
            other => ChartError::WavDecode {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_error_codes() {
        assert_eq!(
            ChartError::InvalidSampleRate { sample_rate: 0 }.code(),
            ChartErrorCodes::INVALID_SAMPLE_RATE
        );
        assert_eq!(
            ChartError::NonFiniteSamples { index: 3 }.code(),
            ChartErrorCodes::NON_FINITE_SAMPLES
        );
        assert_eq!(
            ChartError::InvalidProfile {
                reason: "test".to_string()
            }
            .code(),
            ChartErrorCodes::INVALID_PROFILE
        );
        assert_eq!(
            ChartError::InvalidLaneCount { lane_count: 0 }.code(),
            ChartErrorCodes::INVALID_LANE_COUNT
        );
        assert_eq!(
            ChartError::MalformedChart {
                reason: "test".to_string()
            }
            .code(),
            ChartErrorCodes::MALFORMED_CHART
        );
        assert_eq!(
            ChartError::WavDecode {
                reason: "test".to_string()
            }
            .code(),
            ChartErrorCodes::WAV_DECODE_FAILED
        );
        assert_eq!(
            ChartError::Io {
                details: "test".to_string()
            }
            .code(),
            ChartErrorCodes::IO_FAILED
        );
    }

    #[test]
    fn test_chart_error_messages() {
        let err = ChartError::InvalidSampleRate { sample_rate: 0 };
        assert_eq!(err.message(), "Sample rate must be greater than 0 (got 0)");

        let err = ChartError::InvalidLaneCount { lane_count: 0 };
        assert!(err.message().contains("Lane count"));

        let err = ChartError::NonFiniteSamples { index: 12 };
        assert!(err.message().contains("index 12"));
    }

    #[test]
    fn test_chart_error_display() {
        let err = ChartError::InvalidSampleRate { sample_rate: 0 };
        let display = format!("{}", err);
        assert!(display.contains("ChartError"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("test io error");
        let chart_err: ChartError = io_err.into();
        match chart_err {
            ChartError::Io { details } => {
                assert!(details.contains("test io error"));
            }
            _ => panic!("Expected Io"),
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let chart_err: ChartError = json_err.into();
        assert_eq!(chart_err.code(), ChartErrorCodes::MALFORMED_CHART);
    }
}
