use std::time::Duration;

use blobvault_backend::BackendError;

/// Classify a rendered AWS SDK error into a [`BackendError`].
///
/// The SDK surfaces dispatch failures (timeouts, DNS, refused connections)
/// only through their message, so this inspects the text for known patterns.
/// `timeout` is the operation timeout reported for timed-out calls.
pub fn classify_sdk_error(error_str: &str, timeout: Duration) -> BackendError {
    let lower = error_str.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        BackendError::Timeout(timeout)
    } else {
        BackendError::Unavailable(error_str.to_owned())
    }
}
