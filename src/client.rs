use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Request, StatusCode};
use tracing::{debug, warn};

use crate::CourierResult;
use crate::body::RequestBody;
use crate::engine::{self, TransferEngine, error_code};
use crate::error::Error;
use crate::materialize::materialize_request;
use crate::options::{Auth, ClientOptions, RequestOptions};
use crate::response::Response;
use crate::transfer::build_transfer;
use crate::util::redact_uri_for_logs;

/// Blocking HTTP client over a pluggable transfer engine.
///
/// One transfer fully completes (or fails) before [`send_request`] returns.
/// Every send works on a snapshot of the options, and the builder methods
/// return new clients, so a handle shared across call sites never observes
/// another call's partially applied state.
///
/// [`send_request`]: Self::send_request
#[derive(Clone, Debug)]
pub struct Client<E> {
    engine: E,
    options: ClientOptions,
}

impl<E: TransferEngine> Client<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            options: ClientOptions::new(),
        }
    }

    pub fn with_options(engine: E, options: ClientOptions) -> Self {
        Self { engine, options }
    }

    pub fn with_base_url(engine: E, base_url: impl Into<String>) -> Self {
        Self {
            engine,
            options: ClientOptions::new().with_base_url(base_url),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Materializes and dispatches one request, classifying transfer
    /// failures into [`Error::Network`] and [`Error::Request`].
    pub fn send_request(&mut self, request: Request<RequestBody>) -> CourierResult<Response> {
        let options = self.options.clone();
        let request = materialize_request(request, &options)?;
        let method = request.method().clone();
        let uri_text = request.uri().to_string();

        let built = build_transfer(request, &options)?;
        debug!(
            method = %method,
            uri = %redact_uri_for_logs(&uri_text),
            "dispatching transfer"
        );
        self.engine.set_options(built.config);
        self.engine.execute();

        let code = self.engine.error_code();
        if code != error_code::OK {
            let message = self.engine.error_message();
            let status = engine::http_status_for(code);
            if engine::is_network_failure(code) {
                warn!(code, method = %method, "connection-level failure");
                return Err(Error::Network {
                    code,
                    status,
                    message,
                    method,
                    uri: uri_text,
                });
            }
            return Err(Error::Request {
                code,
                status,
                message,
                method,
                uri: uri_text,
            });
        }

        let raw_status = self.engine.status_code();
        let status = if (100..=511).contains(&raw_status) {
            raw_status
        } else {
            engine::http_status_for(code)
        };
        let status =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_message = self
            .engine
            .has_error()
            .then(|| self.engine.error_message());

        Ok(Response::new(
            status,
            self.engine.response_headers(),
            built.sink,
            self.engine.protocol_version(),
            error_message,
        ))
    }
}

impl<E: TransferEngine + Clone> Client<E> {
    /// New client that sends `Content-Type: application/json`.
    pub fn json(&self) -> Self {
        self.request_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
    }

    /// New client that sends `Content-Type: multipart/form-data`; the
    /// boundary parameter is generated when the request materializes.
    pub fn multipart(&self) -> Self {
        self.request_header(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data"),
        )
    }

    pub fn basic_auth(&self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.map_request_options(|request| request.with_auth(Auth::basic(username, password)))
    }

    pub fn digest_auth(&self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.map_request_options(|request| request.with_auth(Auth::digest(username, password)))
    }

    /// New client with one request header set; the receiver is untouched.
    pub fn request_header(&self, name: HeaderName, value: HeaderValue) -> Self {
        self.map_request_options(|request| request.with_typed_header(name, value))
    }

    fn map_request_options(
        &self,
        apply: impl FnOnce(RequestOptions) -> RequestOptions,
    ) -> Self {
        let request = self.options.request().cloned().unwrap_or_default();
        Self {
            engine: self.engine.clone(),
            options: self.options.clone().with_request(apply(request)),
        }
    }
}
