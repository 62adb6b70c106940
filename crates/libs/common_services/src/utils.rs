use std::time::Duration;

/// Logs a warning message with an 'ALERT:' prefix.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        tracing::warn!("ALERT: {}", format_args!($($arg)*));
    };
}

/// Shared http client for downloads and geocoding, every request bounded by `timeout`.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}
