// Async HTTP client for the telemetry bridge's REST API.
//
// Base path: /api/
// Auth: none (the bridge only listens on the local machine)
//
// Endpoint methods live in `documents.rs` and `services.rs` as inherent
// impls, keeping this module focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;

/// Async client for the bridge REST API.
///
/// Every configuration document is addressed by a logical resource name
/// (`"config"`, `"osc-addresses"`, ...) that maps onto `/api/{name}`.
/// Documents are always fetched and saved whole.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BridgeClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the bridge at `base_url` (e.g. `http://localhost:1337`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Normalize so the base URL always ends with `/api/`.
    ///
    /// Accepts `http://host:1337`, `http://host:1337/` and
    /// `http://host:1337/api` alike.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    /// The normalized `/api/` base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Derive the WebSocket URL for the live stream from the API base.
    ///
    /// `ws_path` is resolved against the bridge root, the base without its
    /// `/api/` suffix, so a reverse-proxy prefix is kept:
    /// `http://rig.local/bridge/api/` + `/ws` → `ws://rig.local/bridge/ws`.
    pub fn ws_url(&self, ws_path: &str) -> Result<Url, Error> {
        let mut root = self.base_url.clone();
        let prefix = root
            .path()
            .strip_suffix("api/")
            .unwrap_or("/")
            .to_owned();
        root.set_path(&prefix);

        let mut url = root.join(ws_path.trim_start_matches('/'))?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| Error::WebSocketConnect(format!("cannot derive {scheme} URL")))?;
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative resource path (e.g. `"osc-addresses"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    /// POST a JSON body, ignoring whatever the bridge answers with.
    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_empty(resp).await
    }

    /// POST without a body (command endpoints).
    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        Error::Http {
            status: status.as_u16(),
            body: if raw.is_empty() {
                status.to_string()
            } else {
                raw.trim_end().to_owned()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BridgeClient {
        BridgeClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn base_url_gains_api_suffix() {
        assert_eq!(
            client("http://localhost:1337").base_url().as_str(),
            "http://localhost:1337/api/"
        );
        assert_eq!(
            client("http://localhost:1337/").base_url().as_str(),
            "http://localhost:1337/api/"
        );
        assert_eq!(
            client("http://localhost:1337/api").base_url().as_str(),
            "http://localhost:1337/api/"
        );
    }

    #[test]
    fn base_url_keeps_reverse_proxy_prefix() {
        assert_eq!(
            client("http://rig.local/bridge").base_url().as_str(),
            "http://rig.local/bridge/api/"
        );
    }

    #[test]
    fn resource_urls_join_under_api() {
        let c = client("http://localhost:1337");
        assert_eq!(
            c.url("osc-addresses").unwrap().as_str(),
            "http://localhost:1337/api/osc-addresses"
        );
        assert_eq!(
            c.url("/restart/udp").unwrap().as_str(),
            "http://localhost:1337/api/restart/udp"
        );
    }

    #[test]
    fn ws_url_swaps_scheme() {
        let c = client("http://localhost:1337");
        assert_eq!(c.ws_url("/ws").unwrap().as_str(), "ws://localhost:1337/ws");

        let secure = client("https://rig.example");
        assert_eq!(
            secure.ws_url("/ws").unwrap().as_str(),
            "wss://rig.example/ws"
        );
    }

    #[test]
    fn ws_url_keeps_reverse_proxy_prefix() {
        let c = client("http://rig.local/bridge");
        assert_eq!(
            c.ws_url("/ws").unwrap().as_str(),
            "ws://rig.local/bridge/ws"
        );
        assert_eq!(
            c.ws_url("live/stream").unwrap().as_str(),
            "ws://rig.local/bridge/live/stream"
        );

        let api = client("https://rig.local/bridge/api");
        assert_eq!(
            api.ws_url("/ws").unwrap().as_str(),
            "wss://rig.local/bridge/ws"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = BridgeClient::from_reqwest("not a url", reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
