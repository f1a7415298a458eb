//! The driver file that includes every persisted output in order.

use pgdcp_core::naming::DRIVER_BASENAME;

use crate::report::PersistedFileResult;

/// Returns the driver basename.
pub fn driver_basename() -> &'static str {
    DRIVER_BASENAME
}

/// One `\ir` line per successful result, in emission order, joined by
/// newlines. Failed results are skipped.
pub fn driver_body(results: &[PersistedFileResult]) -> String {
    results
        .iter()
        .filter(|r| r.is_success())
        .map(|r| format!("\\ir {}", r.basename()))
        .collect::<Vec<_>>()
        .join("\n")
}
