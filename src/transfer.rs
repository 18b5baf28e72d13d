use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use bytes::Bytes;
use http::header::{
    ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, EXPECT, HeaderValue,
    TRANSFER_ENCODING,
};
use http::{HeaderMap, Method, Request, Version};
use tracing::debug;

use crate::CourierResult;
use crate::body::{BodyReader, RequestBody};
use crate::error::Error;
use crate::options::{AuthScheme, ClientOptions, IpResolve, Verify};
use crate::sink::{ResponseSink, SinkTarget};
use crate::util::redact_uri_for_logs;

/// Bodies whose declared `Content-Length` is below this are buffered into
/// the configuration; everything else streams.
pub(crate) const MAX_BUFFERED_BODY_BYTES: u64 = 1_000_000;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 150_000;

/// Timeouts below one second force signal-free timeout handling, which is
/// the only safe mode in multi-threaded processes.
const NO_SIGNAL_THRESHOLD: Duration = Duration::from_secs(1);

/// Engine callback receiving response-body chunks; returns bytes consumed.
pub type WriteFunction = Box<dyn FnMut(&[u8]) -> usize + Send>;

/// Engine callback receiving raw progress counters:
/// `(download_total, downloaded, upload_total, uploaded)`.
pub type ProgressFunction = Box<dyn FnMut(u64, u64, u64, u64) + Send>;

/// HTTP version hint passed to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpVersion {
    Http10,
    Http11,
    Http2,
}

/// How the request body reaches the engine.
pub enum BodyTransfer {
    /// No body; `no_body` marks transfers that expect none in the response
    /// either (HEAD).
    None { no_body: bool },
    /// Body handed over whole; the engine derives length headers itself.
    Buffered(Bytes),
    /// Body pulled through the reader; `len` is forwarded when declared.
    Streaming {
        len: Option<u64>,
        reader: Box<dyn BodyReader>,
    },
}

impl fmt::Debug for BodyTransfer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None { no_body } => formatter
                .debug_struct("None")
                .field("no_body", no_body)
                .finish(),
            Self::Buffered(bytes) => formatter
                .debug_tuple("Buffered")
                .field(&bytes.len())
                .finish(),
            Self::Streaming { len, .. } => {
                formatter.debug_struct("Streaming").field("len", len).finish()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyTransfer {
    pub host: String,
    pub port: Option<u16>,
    pub credentials: Option<(String, String)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineAuthScheme {
    Digest,
    Ntlm,
}

/// Credentials negotiated by the engine itself (non-Basic schemes).
#[derive(Clone, PartialEq, Eq)]
pub struct EngineAuth {
    pub scheme: EngineAuthScheme,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for EngineAuth {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EngineAuth")
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Flat per-transfer configuration consumed by a [`TransferEngine`].
///
/// Named fields throughout; adapters translate them to engine-specific
/// option constants at the boundary. Rebuilt for every transfer, never
/// persisted.
///
/// [`TransferEngine`]: crate::engine::TransferEngine
pub struct TransferConfig {
    pub method: Method,
    /// Target URL, fragment-free.
    pub url: String,
    /// `false`: the body is delivered through [`write_function`](Self::write_function).
    pub return_transfer: bool,
    /// `false`: response headers stay out of the body stream.
    pub capture_headers: bool,
    pub connect_timeout_ms: u64,
    pub http_version: HttpVersion,
    /// Restrict the transfer to HTTP/HTTPS where the engine supports an
    /// allow-list.
    pub restrict_protocols: bool,
    pub body: BodyTransfer,
    /// Fully materialized header lines: `Name: Value`, or `Name;` for an
    /// intentionally empty value.
    pub header_lines: Vec<String>,
    pub verify_peer: Option<bool>,
    pub verify_host: Option<bool>,
    pub ca_info: Option<PathBuf>,
    pub ca_path: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub no_signal: bool,
    /// `Some("")` asks for every engine-supported coding.
    pub accept_encoding: Option<String>,
    pub cookie_header: Option<String>,
    pub write_function: Option<WriteFunction>,
    pub ip_resolve: Option<IpResolve>,
    pub proxy: Option<ProxyTransfer>,
    pub ssl_cert: Option<PathBuf>,
    pub ssl_cert_type: Option<String>,
    pub ssl_cert_password: Option<String>,
    pub ssl_key: Option<PathBuf>,
    pub ssl_key_password: Option<String>,
    pub progress: Option<ProgressFunction>,
    pub auth: Option<EngineAuth>,
}

impl fmt::Debug for TransferConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TransferConfig")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("return_transfer", &self.return_transfer)
            .field("capture_headers", &self.capture_headers)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("http_version", &self.http_version)
            .field("restrict_protocols", &self.restrict_protocols)
            .field("body", &self.body)
            .field("header_lines", &self.header_lines)
            .field("verify_peer", &self.verify_peer)
            .field("verify_host", &self.verify_host)
            .field("ca_info", &self.ca_info)
            .field("ca_path", &self.ca_path)
            .field("timeout_ms", &self.timeout_ms)
            .field("no_signal", &self.no_signal)
            .field("accept_encoding", &self.accept_encoding)
            .field("cookie_header", &self.cookie_header)
            .field(
                "write_function",
                &self.write_function.as_ref().map(|_| "<fn>"),
            )
            .field("ip_resolve", &self.ip_resolve)
            .field("proxy", &self.proxy)
            .field("ssl_cert", &self.ssl_cert)
            .field("ssl_cert_type", &self.ssl_cert_type)
            .field(
                "ssl_cert_password",
                &self.ssl_cert_password.as_ref().map(|_| "<redacted>"),
            )
            .field("ssl_key", &self.ssl_key)
            .field(
                "ssl_key_password",
                &self.ssl_key_password.as_ref().map(|_| "<redacted>"),
            )
            .field("progress", &self.progress.as_ref().map(|_| "<fn>"))
            .field("auth", &self.auth)
            .finish()
    }
}

/// A built transfer: the engine configuration plus the resolved response
/// sink, which the eventual `Response` shares.
#[derive(Debug)]
pub struct BuiltTransfer {
    pub config: TransferConfig,
    pub sink: ResponseSink,
}

/// Header state travels here while the configuration is assembled; earlier
/// steps may still remove entries that later steps would otherwise emit.
struct BuildState {
    config: TransferConfig,
    headers: HeaderMap,
    body_attached: bool,
    extra_header_lines: Vec<String>,
}

/// Flattens a materialized request plus client options into the engine
/// configuration. Filesystem checks (CA bundle, certificate, key, sink
/// directory) happen here, synchronously, before any network I/O.
pub fn build_transfer(
    request: Request<RequestBody>,
    options: &ClientOptions,
) -> CourierResult<BuiltTransfer> {
    let (parts, body) = request.into_parts();
    let mut state = BuildState {
        config: seed_defaults(&parts),
        headers: parts.headers,
        body_attached: false,
        extra_header_lines: Vec::new(),
    };

    attach_body(&mut state, body)?;
    apply_verify(&mut state, options)?;
    apply_timeouts(&mut state, options);
    apply_encoding(&mut state, options);
    apply_cookies(&mut state, options);
    let sink = resolve_sink(&mut state, options)?;
    apply_ip_resolve(&mut state, options);
    apply_proxy(&mut state, options);
    apply_cert(&mut state, options)?;
    apply_ssl_key(&mut state, options)?;
    apply_progress(&mut state, options);
    apply_auth(&mut state, options)?;
    finish_headers(&mut state);

    debug!(
        method = %state.config.method,
        url = %redact_uri_for_logs(&state.config.url),
        body = ?state.config.body,
        "built transfer configuration"
    );

    Ok(BuiltTransfer {
        config: state.config,
        sink,
    })
}

fn seed_defaults(parts: &http::request::Parts) -> TransferConfig {
    // http::Uri cannot carry a fragment, so the URL is fragment-free as-is.
    let http_version = if parts.version == Version::HTTP_11 {
        HttpVersion::Http11
    } else if parts.version == Version::HTTP_2 {
        HttpVersion::Http2
    } else {
        HttpVersion::Http10
    };

    TransferConfig {
        method: parts.method.clone(),
        url: parts.uri.to_string(),
        return_transfer: false,
        capture_headers: false,
        connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        http_version,
        restrict_protocols: true,
        body: BodyTransfer::None { no_body: false },
        header_lines: Vec::new(),
        verify_peer: None,
        verify_host: None,
        ca_info: None,
        ca_path: None,
        timeout_ms: None,
        no_signal: false,
        accept_encoding: None,
        cookie_header: None,
        write_function: None,
        ip_resolve: None,
        proxy: None,
        ssl_cert: None,
        ssl_cert_type: None,
        ssl_cert_password: None,
        ssl_key: None,
        ssl_key_password: None,
        progress: None,
        auth: None,
    }
}

fn attach_body(state: &mut BuildState, body: RequestBody) -> CourierResult<()> {
    match body.len() {
        None => return attach_nonempty_body(state, body),
        Some(size) if size > 0 => return attach_nonempty_body(state, body),
        Some(_) => {}
    }

    let method = &state.config.method;
    if method == Method::PUT || method == Method::POST {
        // RFC 7230 §3.3.2: a zero-length PUT/POST still declares its length.
        if !state.headers.contains_key(CONTENT_LENGTH) {
            state
                .headers
                .insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        }
    } else if method == Method::HEAD {
        state.config.body = BodyTransfer::None { no_body: true };
        state.config.write_function = None;
    }
    Ok(())
}

fn attach_nonempty_body(state: &mut BuildState, body: RequestBody) -> CourierResult<()> {
    let declared = declared_content_length(&state.headers);

    match declared {
        Some(length) if length < MAX_BUFFERED_BODY_BYTES => {
            state.config.body = BodyTransfer::Buffered(body.into_bytes()?);
            // The engine derives these itself for a buffered body.
            state.headers.remove(CONTENT_LENGTH);
            state.headers.remove(TRANSFER_ENCODING);
        }
        _ => {
            if declared.is_some() {
                state.headers.remove(CONTENT_LENGTH);
            }
            state.config.body = BodyTransfer::Streaming {
                len: declared,
                reader: body.into_transfer_reader()?,
            };
        }
    }

    state.body_attached = true;
    Ok(())
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn apply_verify(state: &mut BuildState, options: &ClientOptions) -> CourierResult<()> {
    let Some(verify) = options.verify() else {
        return Ok(());
    };

    match verify {
        Verify::Off => {
            state.config.ca_info = None;
            state.config.verify_peer = Some(false);
            state.config.verify_host = Some(false);
        }
        Verify::On => {
            state.config.verify_peer = Some(true);
            state.config.verify_host = Some(true);
        }
        Verify::CaBundle(path) => {
            state.config.verify_peer = Some(true);
            state.config.verify_host = Some(true);
            // fs::metadata follows symlinks, so a link to a directory counts
            // as a directory here.
            let metadata = fs::metadata(path).map_err(|_| Error::CaBundleNotFound {
                path: path.clone(),
            })?;
            if metadata.is_dir() {
                state.config.ca_path = Some(path.clone());
            } else {
                state.config.ca_info = Some(path.clone());
            }
        }
    }
    Ok(())
}

fn apply_timeouts(state: &mut BuildState, options: &ClientOptions) {
    let mut needs_no_signal = false;

    if let Some(timeout) = options.request().and_then(|request| request.timeout()) {
        needs_no_signal |= timeout < NO_SIGNAL_THRESHOLD;
        state.config.timeout_ms = Some(timeout.as_millis() as u64);
    }

    if let Some(connect_timeout) = options.connect_timeout() {
        needs_no_signal |= connect_timeout < NO_SIGNAL_THRESHOLD;
        state.config.connect_timeout_ms = connect_timeout.as_millis() as u64;
    }

    if needs_no_signal && !cfg!(windows) {
        state.config.no_signal = true;
    }
}

fn apply_encoding(state: &mut BuildState, options: &ClientOptions) {
    if options
        .request()
        .and_then(|request| request.encoding())
        .is_none()
    {
        return;
    }

    match state.headers.get(ACCEPT_ENCODING) {
        Some(accept) => {
            state.config.accept_encoding =
                Some(String::from_utf8_lossy(accept.as_bytes()).into_owned());
        }
        None => {
            // Empty value: take every coding the engine supports, and blank
            // the header so the engine does not inject its own.
            state.config.accept_encoding = Some(String::new());
            state
                .extra_header_lines
                .push("Accept-Encoding:".to_owned());
        }
    }
}

fn apply_cookies(state: &mut BuildState, options: &ClientOptions) {
    if !options.cookies().is_empty() {
        state.config.cookie_header = Some(options.cookies().to_header_value());
    }
}

fn resolve_sink(state: &mut BuildState, options: &ClientOptions) -> CourierResult<ResponseSink> {
    let sink = match options.sink() {
        None => ResponseSink::memory(),
        Some(SinkTarget::Path(path)) => {
            // Fail on a missing directory here rather than mid-transfer.
            let directory = parent_directory(path);
            if !fs::metadata(&directory)
                .map(|metadata| metadata.is_dir())
                .unwrap_or(false)
            {
                return Err(Error::SinkDirectoryMissing { path: directory });
            }
            ResponseSink::file(path.clone())
        }
        Some(SinkTarget::Writer(writer)) => ResponseSink::writer(Arc::clone(writer)),
    };

    let target = sink.clone();
    state.config.write_function = Some(Box::new(move |chunk| target.write_chunk(chunk)));
    Ok(sink)
}

fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn apply_ip_resolve(state: &mut BuildState, options: &ClientOptions) {
    if let Some(resolve) = options.force_resolve_ip() {
        state.config.ip_resolve = Some(resolve);
    }
}

fn apply_proxy(state: &mut BuildState, options: &ClientOptions) {
    if let Some(proxy) = options.proxy() {
        state.config.proxy = Some(ProxyTransfer {
            host: proxy.host().to_owned(),
            port: proxy.port(),
            credentials: proxy.credentials().cloned(),
        });
    }
}

fn apply_cert(state: &mut BuildState, options: &ClientOptions) -> CourierResult<()> {
    let Some(cert) = options.cert() else {
        return Ok(());
    };

    if fs::metadata(cert.path()).is_err() {
        return Err(Error::CertificateNotFound {
            path: cert.path().to_owned(),
        });
    }

    // OpenSSL also accepts PKCS#12 bundles; the engine needs an explicit
    // type hint for non-PEM files.
    if let Some(extension) = cert.path().extension().and_then(|ext| ext.to_str()) {
        if extension.eq_ignore_ascii_case("der") || extension.eq_ignore_ascii_case("p12") {
            state.config.ssl_cert_type = Some(extension.to_ascii_uppercase());
        }
    }

    state.config.ssl_cert = Some(cert.path().to_owned());
    state.config.ssl_cert_password = cert.password().map(str::to_owned);
    Ok(())
}

fn apply_ssl_key(state: &mut BuildState, options: &ClientOptions) -> CourierResult<()> {
    let Some(key) = options.ssl_key() else {
        return Ok(());
    };

    if fs::metadata(key.path()).is_err() {
        return Err(Error::PrivateKeyNotFound {
            path: key.path().to_owned(),
        });
    }

    state.config.ssl_key = Some(key.path().to_owned());
    state.config.ssl_key_password = key.password().map(str::to_owned);
    Ok(())
}

fn apply_progress(state: &mut BuildState, options: &ClientOptions) {
    if let Some(progress) = options.progress() {
        let callback = Arc::clone(progress);
        state.config.progress = Some(Box::new(
            move |download_total, downloaded, upload_total, uploaded| {
                callback(download_total, downloaded, upload_total, uploaded);
            },
        ));
    }
}

fn apply_auth(state: &mut BuildState, options: &ClientOptions) -> CourierResult<()> {
    let Some(auth) = options.request().and_then(|request| request.auth()) else {
        return Ok(());
    };

    match auth.scheme() {
        AuthScheme::Basic => {
            let token =
                BASE64_STANDARD.encode(format!("{}:{}", auth.username(), auth.password()));
            let value = HeaderValue::from_str(&format!("Basic {token}")).map_err(|source| {
                Error::InvalidHeaderValue {
                    name: AUTHORIZATION.to_string(),
                    source,
                }
            })?;
            state.headers.insert(AUTHORIZATION, value);
        }
        AuthScheme::Digest => {
            state.config.auth = Some(EngineAuth {
                scheme: EngineAuthScheme::Digest,
                username: auth.username().to_owned(),
                password: auth.password().to_owned(),
            });
        }
        AuthScheme::Ntlm => {
            state.config.auth = Some(EngineAuth {
                scheme: EngineAuthScheme::Ntlm,
                username: auth.username().to_owned(),
                password: auth.password().to_owned(),
            });
        }
    }
    Ok(())
}

/// Final pass: materialize the surviving header set into wire lines, plus
/// the blank overrides that keep the engine from injecting defaults.
fn finish_headers(state: &mut BuildState) {
    let mut lines =
        Vec::with_capacity(state.headers.len() + state.extra_header_lines.len() + 3);

    for (name, value) in &state.headers {
        let text = String::from_utf8_lossy(value.as_bytes());
        if text.is_empty() {
            // Engines take `Name;` as "send this header with no value".
            lines.push(format!("{name};"));
        } else {
            lines.push(format!("{name}: {text}"));
        }
    }

    lines.append(&mut state.extra_header_lines);

    if !state.headers.contains_key(ACCEPT) {
        lines.push("Accept:".to_owned());
    }

    if state.body_attached {
        if !state.headers.contains_key(EXPECT) {
            lines.push("Expect:".to_owned());
        }
        if !state.headers.contains_key(CONTENT_TYPE) {
            lines.push("Content-Type:".to_owned());
        }
    }

    state.config.header_lines = lines;
}
