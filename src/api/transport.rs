//! Transport contract between the dispatcher and the network.
//!
//! The dispatcher hands a fully formed [`HttpRequest`] to a [`Transport`] and
//! gets back the raw [`HttpResponse`]. Status handling, JSON decoding and
//! record mapping all happen above this layer, so a test double only needs to
//! return canned responses.

use crate::error::BoxError;
use async_trait::async_trait;
use reqwest::Method;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Per-request timeout used unless the caller configures another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A request as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Host including any collection segment, e.g. `dev.azure.com/org`.
    pub host: String,
    /// Absolute path starting with `/`.
    pub path: String,
    /// Pre-joined `key=value&key=value` pairs, without the leading `?`.
    pub query: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            host: String::new(),
            path: path.into(),
            query: String::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the absolute URL for the given protocol.
    ///
    /// Each `/`-separated piece of `path` is percent-encoded as one segment,
    /// so a `?` or `#` inside a node or field name stays part of the path.
    pub fn url(&self, protocol: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}://{}", protocol.to_lowercase(), self.host))?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(self.path.split('/').filter(|segment| !segment.is_empty()));
        if !self.query.is_empty() {
            url.set_query(Some(&self.query));
        }
        Ok(url)
    }
}

/// A response as returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    /// Header names are lower-cased.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Proxy used for HTTP CONNECT tunnelling.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ProxySettings {
    /// Proxy URL without credentials; they are attached separately.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// User and password when both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Sends one request and returns the raw response.
///
/// Errors returned here are connection level failures. A response with an
/// error status is still a successful exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError>;

    /// Routes subsequent requests through a proxy.
    fn set_proxy(&mut self, proxy: ProxySettings) -> Result<(), BoxError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    protocol: String,
    timeout: Duration,
    proxy: Option<ProxySettings>,
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport for `protocol` (`https` or `http`).
    pub fn new(protocol: impl Into<String>, timeout: Duration) -> Result<Self, BoxError> {
        let protocol = protocol.into().to_lowercase();
        let http = Self::build_client(timeout, None)?;
        Ok(Self {
            protocol,
            timeout,
            proxy: None,
            http,
        })
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn proxy(&self) -> Option<&ProxySettings> {
        self.proxy.as_ref()
    }

    fn build_client(
        timeout: Duration,
        proxy: Option<&ProxySettings>,
    ) -> Result<reqwest::Client, BoxError> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(settings) = proxy {
            let mut proxy = reqwest::Proxy::all(settings.url())?;
            if let Some((user, password)) = settings.credentials() {
                proxy = proxy.basic_auth(user, password);
            }
            builder = builder.proxy(proxy);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError> {
        let url = request.url(&self.protocol)?;

        let mut builder = self.http.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }

    fn set_proxy(&mut self, proxy: ProxySettings) -> Result<(), BoxError> {
        self.http = Self::build_client(self.timeout, Some(&proxy))?;
        self.proxy = Some(proxy);
        Ok(())
    }
}
