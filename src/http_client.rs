use anyhow::{Context, Result, ensure};
use reqwest::Client;
use std::time::Duration;

/// Create an HTTP client for talking to the peer device
///
/// The timeout applies to every request issued by the client, covering
/// connect, sending and reading the response body. The peer sits on the local
/// network, so system proxy settings are ignored.
///
/// # Arguments
/// * `timeout` - Per-request timeout, must not be zero
///
/// # Examples
/// ```no_run
/// use hydro_relay::http_client::peer_http_client;
/// use std::time::Duration;
///
/// let client = peer_http_client(Duration::from_secs(5))
///     .expect("failed to create client");
/// ```
pub fn peer_http_client(timeout: Duration) -> Result<Client> {
    ensure!(!timeout.is_zero(), "failed since request timeout is zero");

    Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .context("failed to create peer HTTP client")
}
