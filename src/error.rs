use std::path::PathBuf;

use http::Method;
use thiserror::Error;

/// Coarse failure taxonomy.
///
/// `InvalidConfiguration` errors surface synchronously while the transfer
/// configuration is assembled, before any network I/O. `Network` covers
/// connection-establishment failures reported by the engine (DNS, connect,
/// proxy resolution); `Request` covers every other nonzero engine code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidConfiguration,
    Network,
    Request,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::InvalidConfiguration => "invalid_configuration",
            Self::Network => "network",
            Self::Request => "request",
        };
        formatter.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    InvalidUri,
    InvalidHeaderName,
    InvalidHeaderValue,
    SerializeQuery,
    SerializeBody,
    CaBundleNotFound,
    CertificateNotFound,
    PrivateKeyNotFound,
    SinkDirectoryMissing,
    ReadBody,
    Deserialize,
    Network,
    Request,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUri => "invalid_uri",
            Self::InvalidHeaderName => "invalid_header_name",
            Self::InvalidHeaderValue => "invalid_header_value",
            Self::SerializeQuery => "serialize_query",
            Self::SerializeBody => "serialize_body",
            Self::CaBundleNotFound => "ca_bundle_not_found",
            Self::CertificateNotFound => "certificate_not_found",
            Self::PrivateKeyNotFound => "private_key_not_found",
            Self::SinkDirectoryMissing => "sink_directory_missing",
            Self::ReadBody => "read_body",
            Self::Deserialize => "deserialize",
            Self::Network => "network",
            Self::Request => "request",
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid request uri: {uri}")]
    InvalidUri { uri: String },
    #[error("invalid header name {name}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
    #[error("invalid header value for {name}: {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[error("failed to serialize request query: {source}")]
    SerializeQuery {
        #[source]
        source: serde_urlencoded::ser::Error,
    },
    #[error("failed to serialize request body: {source}")]
    SerializeBody {
        #[source]
        source: serde_json::Error,
    },
    #[error("ssl ca bundle not found: {}", path.display())]
    CaBundleNotFound { path: PathBuf },
    #[error("ssl certificate not found: {}", path.display())]
    CertificateNotFound { path: PathBuf },
    #[error("ssl private key not found: {}", path.display())]
    PrivateKeyNotFound { path: PathBuf },
    #[error("sink directory does not exist: {}", path.display())]
    SinkDirectoryMissing { path: PathBuf },
    #[error("failed to read request body: {source}")]
    ReadBody {
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode response json: {source}; body={body}")]
    Deserialize {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("connection failed ({code}) for {method} {uri}: {message}")]
    Network {
        code: i32,
        status: u16,
        message: String,
        method: Method,
        uri: String,
    },
    #[error("transfer failed ({code}) for {method} {uri}: {message}")]
    Request {
        code: i32,
        status: u16,
        message: String,
        method: Method,
        uri: String,
    },
}

impl Error {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidUri { .. } => ErrorCode::InvalidUri,
            Self::InvalidHeaderName { .. } => ErrorCode::InvalidHeaderName,
            Self::InvalidHeaderValue { .. } => ErrorCode::InvalidHeaderValue,
            Self::SerializeQuery { .. } => ErrorCode::SerializeQuery,
            Self::SerializeBody { .. } => ErrorCode::SerializeBody,
            Self::CaBundleNotFound { .. } => ErrorCode::CaBundleNotFound,
            Self::CertificateNotFound { .. } => ErrorCode::CertificateNotFound,
            Self::PrivateKeyNotFound { .. } => ErrorCode::PrivateKeyNotFound,
            Self::SinkDirectoryMissing { .. } => ErrorCode::SinkDirectoryMissing,
            Self::ReadBody { .. } => ErrorCode::ReadBody,
            Self::Deserialize { .. } => ErrorCode::Deserialize,
            Self::Network { .. } => ErrorCode::Network,
            Self::Request { .. } => ErrorCode::Request,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Request { .. } | Self::Deserialize { .. } => ErrorKind::Request,
            _ => ErrorKind::InvalidConfiguration,
        }
    }

    /// HTTP-status approximation carried by transfer-layer failures.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } | Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
