//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
/// A failed batch already carries its own report, which is printed as is.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::OperationFailed(report) => report.clone(),
        other => other.to_string(),
    }
}
