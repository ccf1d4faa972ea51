// Daemon HTTP client
//
// Wraps two `reqwest::Client`s (bounded one-shot requests and unbounded
// event channels) with URL construction and error-body decoding. Endpoint
// groups (status, logs, devices, settings, clips) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Error body shape the daemon uses for 4xx/5xx replies.
#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

/// Raw HTTP client for the capture daemon's local API.
///
/// Cheap to clone: both inner `reqwest::Client`s are reference-counted.
#[derive(Clone)]
pub struct DaemonClient {
    http: reqwest::Client,
    stream_http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl DaemonClient {
    /// Create a client for the daemon listening at `base_url`
    /// (e.g. `http://127.0.0.1:43123`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            stream_http: transport.build_stream_client()?,
            base_url,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Parse `base_url` and create a client with default transport settings.
    pub fn from_url(base_url: &str) -> Result<Self, Error> {
        Self::new(Url::parse(base_url)?, &TransportConfig::default())
    }

    /// The daemon base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an absolute API path (`/status`, `/devices/video`) onto the base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.parse_json(resp).await
    }

    /// Send a POST request with a JSON body and decode the JSON reply.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.parse_json(resp).await
    }

    /// Send a bodiless POST request and decode the JSON reply.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.parse_json(resp).await
    }

    /// Send a POST request with a JSON body, expecting an empty success reply.
    pub(crate) async fn post_no_content(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<(), Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;
        if status.is_success() {
            Ok(())
        } else {
            Err(http_error(status, &body))
        }
    }

    /// Open a streaming GET on the long-lived client.
    pub(crate) async fn open_stream(&self, path: &str) -> Result<reqwest::Response, Error> {
        let url = self.api_url(path)?;
        debug!("GET {} (event stream)", url);

        let resp = self
            .stream_http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(http_error(status, &body));
        }
        Ok(resp)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn parse_json<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(http_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Build an `Error::Http`, preferring the daemon's `{"message"}` body.
fn http_error(status: reqwest::StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_owned()
            } else {
                trimmed.to_owned()
            }
        });
    Error::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_onto_base() {
        let client = DaemonClient::from_url("http://127.0.0.1:43123").unwrap();
        assert_eq!(
            client.api_url("/devices/video").unwrap().as_str(),
            "http://127.0.0.1:43123/devices/video"
        );
    }

    #[test]
    fn http_error_prefers_message_body() {
        let err = http_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"message":"unknown encoder"}"#,
        );
        assert!(matches!(
            err,
            Error::Http { status: 400, ref message } if message == "unknown encoder"
        ));
    }

    #[test]
    fn http_error_falls_back_to_reason() {
        let err = http_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(
            err,
            Error::Http { status: 503, ref message } if message == "Service Unavailable"
        ));
    }
}
