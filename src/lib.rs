//! `courier` is an internal HTTP client adapter: it materializes an abstract
//! `http::Request` plus declarative client/request options into a concrete
//! outbound transfer, drives a pluggable curl-style [`TransferEngine`], and
//! returns a normalized [`Response`] or a classified error.
//!
//! # Quick Start
//!
//! ```no_run
//! use courier::{
//!     Client, ClientOptions, RequestBody, RequestOptions, TransferConfig, TransferEngine,
//! };
//! use http::{HeaderMap, Request, Version};
//!
//! // Adapter over the real executor (libcurl easy handle, test double, ...).
//! #[derive(Clone, Default)]
//! struct CurlEngine;
//!
//! impl TransferEngine for CurlEngine {
//!     fn set_options(&mut self, _config: TransferConfig) {}
//!     fn execute(&mut self) {}
//!     fn error_code(&self) -> i32 { 0 }
//!     fn error_message(&self) -> String { String::new() }
//!     fn status_code(&self) -> u16 { 200 }
//!     fn response_headers(&self) -> HeaderMap { HeaderMap::new() }
//!     fn protocol_version(&self) -> Version { Version::HTTP_11 }
//!     fn has_error(&self) -> bool { false }
//! }
//!
//! fn main() -> Result<(), courier::Error> {
//!     let options = ClientOptions::new()
//!         .with_base_url("https://api.example.com")
//!         .with_request(
//!             RequestOptions::new()
//!                 .with_header("Accept", "application/json")?
//!                 .with_query_pairs([("page", "1")]),
//!         );
//!
//!     let mut client = Client::with_options(CurlEngine, options);
//!     let request = Request::get("/v1/items")
//!         .body(RequestBody::Empty)
//!         .expect("request");
//!     let response = client.send_request(request)?;
//!     println!("status={}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! # Design
//!
//! - Options are value objects: setters consume and return them, and every
//!   send works on a snapshot, so clients can be cloned and specialized
//!   (`client.json()`, `client.basic_auth(...)`) without aliasing.
//! - The engine seam is flat: one [`TransferConfig`] of named fields per
//!   transfer; adapters translate fields to engine constants at the
//!   boundary.
//! - Failures split into invalid configuration (before any I/O), network
//!   (connection establishment) and request (everything else) — see
//!   [`ErrorKind`].

mod body;
mod client;
mod cookies;
pub mod engine;
mod error;
mod materialize;
mod options;
mod response;
mod sink;
mod transfer;
mod util;

pub use crate::body::{BodyReader, RequestBody, StreamingBody};
pub use crate::client::Client;
pub use crate::cookies::CookieJar;
pub use crate::engine::{TransferEngine, error_code, http_status_for, is_network_failure};
pub use crate::error::{Error, ErrorCode, ErrorKind};
pub use crate::materialize::materialize_request;
pub use crate::options::{
    AcceptEncoding, Auth, AuthScheme, CertFile, ClientOptions, IpResolve, KeyFile, Progress,
    ProxyOptions, Query, RequestOptions, Verify,
};
pub use crate::response::Response;
pub use crate::sink::{ResponseSink, SharedWriter, SinkTarget};
pub use crate::transfer::{
    BodyTransfer, BuiltTransfer, EngineAuth, EngineAuthScheme, HttpVersion, ProgressFunction,
    ProxyTransfer, TransferConfig, WriteFunction, build_transfer,
};

pub type CourierResult<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        AcceptEncoding, Auth, BodyTransfer, Client, ClientOptions, CookieJar, CourierResult,
        Error, ErrorCode, ErrorKind, HttpVersion, IpResolve, ProxyOptions, Query, RequestBody,
        RequestOptions, Response, ResponseSink, SinkTarget, TransferConfig, TransferEngine,
        Verify,
    };
}

#[cfg(test)]
mod tests;
