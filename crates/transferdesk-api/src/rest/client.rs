// Supabase REST HTTP client
//
// Wraps `reqwest::Client` with project URL normalisation, PostgREST error
// decoding, and the `Prefer` header handling inserts and updates need.
// Endpoint methods live in sibling modules as inherent impls so this
// file stays focused on transport mechanics.

use std::time::Duration;

use reqwest::header::HeaderName;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::models::ErrorResponse;
use super::query::Query;
use crate::auth::ApiKeys;
use crate::error::Error;
use crate::transport::TransportConfig;

const PREFER: HeaderName = HeaderName::from_static("prefer");

/// Characters of an undecodable body quoted in the error message.
const PREVIEW_CHARS: usize = 200;

/// Ask PostgREST to echo the affected rows back.
pub(crate) const RETURN_REPRESENTATION: &str = "return=representation";

/// Async client for a Supabase project's REST API.
///
/// Every request carries the project's anon key and, when present, the
/// signed-in user's access token. All paths are relative to
/// `{project}/rest/v1/`.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl RestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from the project URL, key material, and transport config.
    ///
    /// `project_url` is the bare project root (`https://xyz.supabase.co`);
    /// a URL that already ends in `/rest/v1` is accepted as-is.
    pub fn new(
        project_url: &str,
        keys: &ApiKeys,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(keys.to_headers()?)?;
        let base_url = Self::normalize_base_url(project_url)?;
        debug!(
            %base_url,
            authenticated = keys.is_authenticated(),
            "rest client configured"
        );
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Build the base URL: `https://host/rest/v1/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/rest/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/rest/v1/"));
        }

        Ok(url)
    }

    /// The normalised `/rest/v1/` base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"packages"` or `"rpc/fn"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={:?}", query.params());

        let resp = self
            .http
            .get(url)
            .query(query.params())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        query: &Query,
        body: &B,
        prefer: Option<&str>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} params={:?}", query.params());

        let mut builder = self.http.post(url).query(query.params()).json(body);
        if let Some(prefer) = prefer {
            builder = builder.header(PREFER, prefer);
        }
        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        query: &Query,
        body: &B,
        prefer: Option<&str>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url} params={:?}", query.params());

        let mut builder = self.http.patch(url).query(query.params()).json(body);
        if let Some(prefer) = prefer {
            builder = builder.header(PREFER, prefer);
        }
        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    /// Call a Postgres function exposed through PostgREST.
    ///
    /// `POST /rest/v1/rpc/{function}` with the named arguments as a JSON object.
    pub async fn rpc<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        function: &str,
        args: &B,
    ) -> Result<T, Error> {
        self.post(&format!("rpc/{function}"), &Query::new(), args, None)
            .await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(bytes = body.len(), "response body received");

        // 204 and functions returning void send no body; decode as JSON null.
        let text = if body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };
        serde_json::from_str(text).map_err(|e| {
            let preview = body
                .char_indices()
                .nth(PREVIEW_CHARS)
                .map_or(body.as_str(), |(end, _)| &body[..end]);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    /// Timeouts carry the configured limit; everything else stays a
    /// transport error.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Rest {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
                details: err.details.and_then(value_to_text),
                hint: err.hint.and_then(value_to_text),
            }
        } else {
            Error::Rest {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
                details: None,
                hint: None,
            }
        }
    }
}

/// PostgREST sends `details`/`hint` as a string, `null`, or occasionally
/// a nested object.
fn value_to_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
