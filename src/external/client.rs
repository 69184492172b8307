use std::sync::LazyLock;
use std::time::Duration;

/// User-Agent sent with every destination request
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Global blocking HTTP client shared by all destination adapters
///
/// This client is initialized lazily on first access and reused across the
/// process, so consecutive notifications reuse pooled connections.
///
/// # Features
/// - **Timeouts**: 30s request timeout, 10s connect timeout
/// - **Connection pooling**: idle connections kept for 90s
/// - **Security**: Uses Rustls for TLS (no OpenSSL dependency)
///
/// # Example
/// ```ignore
/// use crate::external::client::HTTP_CLIENT;
///
/// fn post(body: &serde_json::Value) -> Result<(), reqwest::Error> {
///     HTTP_CLIENT
///         .post("https://discord.com/api/v10/channels/123/messages")
///         .json(body)
///         .send()?
///         .error_for_status()?;
///     Ok(())
/// }
/// ```
pub static HTTP_CLIENT: LazyLock<reqwest::blocking::Client> = LazyLock::new(|| {
    reqwest::blocking::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to build HTTP client")
});
