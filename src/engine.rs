use http::{HeaderMap, Version};

use crate::transfer::TransferConfig;

/// Contract of the external executor that performs the network I/O.
///
/// The flow is curl-shaped: hand over a [`TransferConfig`], run the
/// transfer, then read the outcome from the accessors. A nonzero
/// [`error_code`](Self::error_code) marks a failed transfer;
/// [`has_error`](Self::has_error) may flag a soft error even when the code
/// is zero, which callers surface as response metadata.
pub trait TransferEngine {
    fn set_options(&mut self, config: TransferConfig);

    fn execute(&mut self);

    /// Engine error code for the last transfer; `0` means success.
    fn error_code(&self) -> i32;

    fn error_message(&self) -> String;

    fn status_code(&self) -> u16;

    fn response_headers(&self) -> HeaderMap;

    fn protocol_version(&self) -> Version;

    /// Soft-error flag: set when the engine recorded an error message even
    /// though the transfer completed with a zero code.
    fn has_error(&self) -> bool;
}

/// Engine error codes, numbered as libcurl numbers them.
pub mod error_code {
    pub const OK: i32 = 0;
    pub const UNSUPPORTED_PROTOCOL: i32 = 1;
    pub const URL_MALFORMAT: i32 = 3;
    pub const COULDNT_RESOLVE_PROXY: i32 = 5;
    pub const COULDNT_RESOLVE_HOST: i32 = 6;
    pub const COULDNT_CONNECT: i32 = 7;
    pub const OPERATION_TIMEDOUT: i32 = 28;
    pub const SSL_CONNECT_ERROR: i32 = 35;
    pub const TOO_MANY_REDIRECTS: i32 = 47;
    pub const GOT_NOTHING: i32 = 52;
    pub const SEND_ERROR: i32 = 55;
    pub const RECV_ERROR: i32 = 56;
    pub const SSL_CERTPROBLEM: i32 = 58;
    pub const SSL_CIPHER: i32 = 59;
    pub const PEER_FAILED_VERIFICATION: i32 = 60;
    pub const SSL_CACERT_BADFILE: i32 = 77;
    pub const SSL_ISSUER_ERROR: i32 = 83;
}

/// Connection-establishment failures, distinguished from every other
/// transfer error.
pub fn is_network_failure(code: i32) -> bool {
    matches!(
        code,
        error_code::COULDNT_RESOLVE_PROXY
            | error_code::COULDNT_RESOLVE_HOST
            | error_code::COULDNT_CONNECT
    )
}

/// Fixed approximation of engine error codes as HTTP statuses, used when a
/// transfer fails before the server produced a status of its own.
pub fn http_status_for(code: i32) -> u16 {
    match code {
        error_code::OK => 200,
        error_code::UNSUPPORTED_PROTOCOL | error_code::URL_MALFORMAT => 400,
        error_code::COULDNT_RESOLVE_PROXY
        | error_code::COULDNT_RESOLVE_HOST
        | error_code::COULDNT_CONNECT
        | error_code::GOT_NOTHING
        | error_code::SEND_ERROR
        | error_code::RECV_ERROR => 502,
        error_code::OPERATION_TIMEDOUT => 408,
        error_code::SSL_CONNECT_ERROR
        | error_code::SSL_CERTPROBLEM
        | error_code::SSL_CIPHER
        | error_code::SSL_CACERT_BADFILE
        | error_code::SSL_ISSUER_ERROR => 525,
        error_code::PEER_FAILED_VERIFICATION => 526,
        error_code::TOO_MANY_REDIRECTS => 508,
        _ => 500,
    }
}
