// Error types for the rhythm chart crate
//
// This module defines the error types surfaced at the crate boundary: audio
// input validation, chart documents, configuration and WAV decoding. The
// judgement engine has no error type; malformed input there is a no-op.

mod chart;

pub use chart::{log_chart_error, ChartError, ChartErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so binaries can map failures to exit codes
/// and log lines consistently.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
