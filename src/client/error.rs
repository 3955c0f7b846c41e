//! Response classification.

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Read the body of `response`, turning a non-2xx status into
/// [`Error::Remote`] carrying the status and the body text verbatim.
///
/// A non-2xx body that cannot be read becomes an empty body; the status
/// is kept.
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|e| {
            tracing::debug!(status = status.as_u16(), error = %e, "Error body unreadable");
            String::new()
        });
        return Err(Error::remote(status.as_u16(), body));
    }
    response.text().await.map_err(Error::Transport)
}

/// Decode a 2xx body into the endpoint's typed shape.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::decode(endpoint, e))
}
