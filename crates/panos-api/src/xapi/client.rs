// XML API HTTP client
//
// Wraps `reqwest::Client` with PAN-OS request encoding (`/api/` form
// posts), key header injection and `<response status=...>` envelope
// unwrapping. Endpoint groups (op, config, commit) are implemented as
// inherent methods in sibling files to keep this module focused on
// transport mechanics.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::xml::Element;

/// PAN-OS response code for a rejected or expired key.
const CODE_UNAUTHORIZED: u16 = 403;

/// A successfully unwrapped `<response status="success">` document.
#[derive(Debug, Clone)]
pub struct XapiResponse {
    root: Element,
    body: String,
}

impl XapiResponse {
    /// The `<response>` element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The `<result>` element, if the response carried one.
    pub fn result(&self) -> Option<&Element> {
        self.root.child("result")
    }

    /// The raw XML body as returned by the device.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The `code` attribute of the envelope.
    pub fn code(&self) -> Option<u16> {
        self.root.attr("code").and_then(|c| c.parse().ok())
    }

    /// Human-readable message lines (`<msg>` / `<line>`), if any.
    pub fn messages(&self) -> Vec<String> {
        self.root
            .descendant("msg")
            .map(Element::collect_text)
            .unwrap_or_default()
    }
}

/// Raw HTTP client for the PAN-OS / Panorama XML API.
///
/// Every call is a form-encoded `POST {base}/api/` carrying a `type`
/// parameter; the API key travels in the `X-PAN-KEY` header once it has
/// been generated or supplied.
pub struct XapiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: RwLock<Option<SecretString>>,
}

impl XapiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the management interface root, e.g. `https://10.0.0.1`
    /// or `https://panorama.example.com:8443`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            api_key: RwLock::new(None),
        }
    }

    /// The management interface base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Key management ───────────────────────────────────────────────

    /// Use an existing API key for subsequent requests.
    pub fn set_api_key(&self, key: SecretString) {
        debug!("storing API key");
        if let Ok(mut guard) = self.api_key.write() {
            *guard = Some(key);
        }
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.read().map(|g| g.is_some()).unwrap_or(false)
    }

    fn key_header(&self) -> Result<String, Error> {
        let guard = self.api_key.read().map_err(|_| Error::MissingApiKey)?;
        guard
            .as_ref()
            .map(|k| k.expose_secret().to_owned())
            .ok_or(Error::MissingApiKey)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// `{base}/api/`
    pub(crate) fn api_url(&self) -> Result<Url, Error> {
        self.base_url.join("/api/").map_err(Error::InvalidUrl)
    }

    /// Send an authenticated request and unwrap the envelope.
    pub(crate) async fn request(&self, params: &[(&str, &str)]) -> Result<XapiResponse, Error> {
        let key = self.key_header()?;
        let url = self.api_url()?;
        let kind = params
            .iter()
            .find(|(k, _)| *k == "type")
            .map_or("?", |(_, v)| *v);
        debug!(%url, kind, "xml api request");

        let resp = self
            .http
            .post(url)
            .header("X-PAN-KEY", key)
            .form(params)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Send a request without the key header (key generation only).
    pub(crate) async fn request_unauthenticated(
        &self,
        params: &[(&str, &str)],
    ) -> Result<XapiResponse, Error> {
        let url = self.api_url()?;
        let resp = self
            .http
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Parse the `<response>` envelope, returning it on `status="success"`
    /// or mapping `status="error"` into `Error::Api` / `Error::Authentication`.
    async fn parse_envelope(resp: reqwest::Response) -> Result<XapiResponse, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(%status, bytes = body.len(), "xml api response");

        let root = match Element::parse(&body) {
            Ok(root) if root.name() == "response" => root,
            Ok(_) | Err(_) if !status.is_success() => {
                return Err(unparsed_status_error(status, &body));
            }
            Ok(other) => {
                return Err(Error::Deserialization {
                    message: format!("expected <response>, got <{}>", other.name()),
                    body,
                });
            }
            Err(e) => return Err(e),
        };

        let response = XapiResponse { root, body };
        if response.root.attr("status") == Some("success") {
            return Ok(response);
        }

        let code = response.code();
        let message = {
            let lines = response.messages();
            if lines.is_empty() {
                format!("request failed (HTTP {status})")
            } else {
                lines.join("; ")
            }
        };

        if code == Some(CODE_UNAUTHORIZED)
            || status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication { message });
        }

        Err(Error::Api { message, code })
    }
}

fn unparsed_status_error(status: reqwest::StatusCode, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        Error::Authentication {
            message: format!("HTTP {status}: {preview}"),
        }
    } else {
        Error::Http {
            status: status.as_u16(),
            message: preview,
        }
    }
}
