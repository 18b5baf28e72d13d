use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;

use crate::CourierResult;
use crate::error::Error;
use crate::sink::ResponseSink;
use crate::util::truncate_body;

/// Normalized transfer outcome.
///
/// The body is the sink resolved while the transfer was configured; its
/// lifetime is tied to this value, and callers drop it to release the
/// underlying file or buffer.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseSink,
    version: Version,
    error_message: Option<String>,
}

impl Response {
    pub(crate) fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: ResponseSink,
        version: Version,
        error_message: Option<String>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            version,
            error_message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Soft error recorded by the engine despite a successful transfer.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn body(&self) -> &ResponseSink {
        &self.body
    }

    /// Captured body bytes; empty for caller-supplied writer sinks.
    pub fn bytes(&self) -> Bytes {
        self.body.captured().unwrap_or_default()
    }

    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    pub fn json<T>(&self) -> CourierResult<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.bytes();
        serde_json::from_slice(&bytes).map_err(|source| Error::Deserialize {
            source,
            body: truncate_body(&bytes),
        })
    }
}
