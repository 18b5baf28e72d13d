use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use crate::CourierResult;
use crate::cookies::CookieJar;
use crate::error::Error;
use crate::sink::SinkTarget;

/// TLS peer-verification policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verify {
    /// Disable peer and host verification.
    Off,
    /// Full verification against the engine's default trust store.
    On,
    /// Full verification against a CA bundle file or CA directory.
    CaBundle(PathBuf),
}

/// Engine DNS-resolution hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IpResolve {
    V4,
    V6,
}

/// Outbound proxy; the host is mandatory, credentials are set as a pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyOptions {
    host: String,
    port: Option<u16>,
    credentials: Option<(String, String)>,
}

impl ProxyOptions {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            credentials: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn credentials(&self) -> Option<&(String, String)> {
        self.credentials.as_ref()
    }
}

/// Client certificate file with an optional password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertFile {
    path: PathBuf,
    password: Option<String>,
}

impl CertFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// Private key file with an optional password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyFile {
    path: PathBuf,
    password: Option<String>,
}

impl KeyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Digest,
    Ntlm,
}

/// Request credentials; the scheme defaults to Basic.
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    username: String,
    password: String,
    scheme: AuthScheme,
}

impl Auth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            scheme: AuthScheme::Basic,
        }
    }

    pub fn digest(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Digest,
            ..Self::basic(username, password)
        }
    }

    pub fn ntlm(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Ntlm,
            ..Self::basic(username, password)
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Auth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Query override: either a verbatim string or ordered name/value pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    Raw(String),
    Pairs(Vec<(String, String)>),
}

/// Accept-Encoding override.
///
/// `Auto` requests every engine-supported coding without injecting a header;
/// `Value` pins the header to the given codings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcceptEncoding {
    Auto,
    Value(String),
}

/// Transfer-progress callback: `(download_total, downloaded, upload_total,
/// uploaded)`.
pub type Progress = Arc<dyn Fn(u64, u64, u64, u64) + Send + Sync>;

/// Declarative per-request overrides.
///
/// A value object: every setter consumes and returns the options, so a
/// stored copy is never mutated behind a caller's back.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    headers: HeaderMap,
    body: Option<Value>,
    auth: Option<Auth>,
    query: Option<Query>,
    encoding: Option<AcceptEncoding>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validating header upsert; header names are matched case-insensitively.
    pub fn with_header(mut self, name: &str, value: &str) -> CourierResult<Self> {
        let parsed_name: HeaderName =
            name.parse().map_err(|source| Error::InvalidHeaderName {
                name: name.to_owned(),
                source,
            })?;
        let parsed_value: HeaderValue =
            value.parse().map_err(|source| Error::InvalidHeaderValue {
                name: name.to_owned(),
                source,
            })?;
        self.headers.insert(parsed_name, parsed_value);
        Ok(self)
    }

    pub fn with_headers<I, K, V>(mut self, pairs: I) -> CourierResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in pairs {
            self = self.with_header(name.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    pub fn with_typed_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Structured body, consumed only when the resolved content type selects
    /// a body encoder.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_json<T>(self, payload: &T) -> CourierResult<Self>
    where
        T: Serialize + ?Sized,
    {
        let body =
            serde_json::to_value(payload).map_err(|source| Error::SerializeBody { source })?;
        Ok(self.with_body(body))
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_query_string(mut self, raw: impl Into<String>) -> Self {
        self.query = Some(Query::Raw(raw.into()));
        self
    }

    pub fn with_query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query = Some(Query::Pairs(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        ));
        self
    }

    pub fn with_query<T>(mut self, params: &T) -> CourierResult<Self>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_urlencoded::to_string(params)
            .map_err(|source| Error::SerializeQuery { source })?;
        let pairs = url::form_urlencoded::parse(encoded.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        self.query = Some(Query::Pairs(pairs));
        Ok(self)
    }

    pub fn with_encoding(mut self, value: impl Into<String>) -> Self {
        self.encoding = Some(AcceptEncoding::Value(value.into()));
        self
    }

    pub fn with_negotiated_encoding(mut self) -> Self {
        self.encoding = Some(AcceptEncoding::Auto);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn encoding(&self) -> Option<&AcceptEncoding> {
        self.encoding.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Declarative per-client configuration.
///
/// Like [`RequestOptions`], a value object with move-based setters; cloning
/// before a send is cheap and keeps in-flight transfers isolated.
#[derive(Clone, Default)]
pub struct ClientOptions {
    verify: Option<Verify>,
    sink: Option<SinkTarget>,
    force_resolve_ip: Option<IpResolve>,
    proxy: Option<ProxyOptions>,
    cert: Option<CertFile>,
    ssl_key: Option<KeyFile>,
    progress: Option<Progress>,
    base_url: Option<String>,
    connect_timeout: Option<Duration>,
    request: Option<RequestOptions>,
    cookies: CookieJar,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = Some(if verify { Verify::On } else { Verify::Off });
        self
    }

    pub fn with_ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.verify = Some(Verify::CaBundle(path.into()));
        self
    }

    pub fn with_sink(mut self, sink: SinkTarget) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_force_resolve_ip(mut self, resolve: IpResolve) -> Self {
        self.force_resolve_ip = Some(resolve);
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyOptions) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_cert(mut self, cert: CertFile) -> Self {
        self.cert = Some(cert);
        self
    }

    pub fn with_ssl_key(mut self, key: KeyFile) -> Self {
        self.ssl_key = Some(key);
        self
    }

    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(u64, u64, u64, u64) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn with_request(mut self, request: RequestOptions) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_cookies(mut self, cookies: CookieJar) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.set(name, value);
        self
    }

    pub fn verify(&self) -> Option<&Verify> {
        self.verify.as_ref()
    }

    pub fn sink(&self) -> Option<&SinkTarget> {
        self.sink.as_ref()
    }

    pub fn force_resolve_ip(&self) -> Option<IpResolve> {
        self.force_resolve_ip
    }

    pub fn proxy(&self) -> Option<&ProxyOptions> {
        self.proxy.as_ref()
    }

    pub fn cert(&self) -> Option<&CertFile> {
        self.cert.as_ref()
    }

    pub fn ssl_key(&self) -> Option<&KeyFile> {
        self.ssl_key.as_ref()
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn request(&self) -> Option<&RequestOptions> {
        self.request.as_ref()
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClientOptions")
            .field("verify", &self.verify)
            .field("sink", &self.sink)
            .field("force_resolve_ip", &self.force_resolve_ip)
            .field("proxy", &self.proxy)
            .field("cert", &self.cert)
            .field("ssl_key", &self.ssl_key)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .field("base_url", &self.base_url)
            .field("connect_timeout", &self.connect_timeout)
            .field("request", &self.request)
            .field("cookies", &self.cookies)
            .finish()
    }
}
