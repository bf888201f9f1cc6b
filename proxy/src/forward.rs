//! Outbound round trip to the forwarding target.
//!
//! One fresh connection per request: pooling is disabled on the client, so
//! the upstream socket is closed as soon as the exchange finishes.

use std::time::Duration;

use msghop_shared::protocol::Envelope;
use msghop_shared::{Error, Result};
use tracing::debug;

/// Build the outbound HTTP client.
///
/// Pooling is off (every request opens and drops its own connection),
/// redirects are off (the proxy relays exactly one hop), and both the
/// connect phase and the whole exchange are bounded by `timeout`.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
}

/// POST `{"message": ...}` to the target and return its raw reply body.
///
/// The upstream status is returned for logging only; the caller answers
/// the original request with 200 regardless.
pub async fn forward(
    client: &reqwest::Client,
    host: &str,
    port: u16,
    message: String,
) -> Result<(u16, Vec<u8>)> {
    let url = format!("http://{}:{}/", host, port);
    let envelope = Envelope { message };

    let response = client
        .post(&url)
        .json(&envelope)
        .send()
        .await
        .map_err(classify)?;

    let status = response.status().as_u16();
    debug!("Upstream {} answered {}", url, status);

    let body = response.bytes().await.map_err(classify)?;
    Ok((status, body.to_vec()))
}

/// Map a reqwest failure onto the shared error taxonomy.
fn classify(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else if err.is_connect() {
        Error::Connect(err.to_string())
    } else {
        Error::Upstream(err.to_string())
    }
}
