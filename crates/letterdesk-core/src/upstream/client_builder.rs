use std::time::Duration;

/// Build the shared HTTP client. The request timeout is a backstop; the
/// service applies its own bound around each call.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(timeout_secs.max(5)))
        .tcp_nodelay(true)
        .build()
}
