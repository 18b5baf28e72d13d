use std::fmt::Write as _;

use http::header::{ACCEPT_ENCODING, CONTENT_TYPE, HeaderValue};
use http::{Request, Uri};
use url::Url;

use crate::CourierResult;
use crate::body::{self, RequestBody};
use crate::error::Error;
use crate::options::{AcceptEncoding, ClientOptions, Query};
use crate::util::serialize_query_pairs;

/// Resolves a base request plus the client's declarative overrides into the
/// concrete outbound request.
///
/// With no request options configured this is the identity function; with a
/// no-op configuration the request comes back component-for-component
/// unchanged.
pub fn materialize_request(
    request: Request<RequestBody>,
    options: &ClientOptions,
) -> CourierResult<Request<RequestBody>> {
    let Some(request_options) = options.request() else {
        return Ok(request);
    };

    let (mut parts, body) = request.into_parts();

    let mut uri = match options.base_url() {
        Some(base_url) => rebase_uri(&parts.uri, base_url)?,
        None => parts.uri.clone(),
    };

    // Override headers win over the request's own content type.
    let mut content_type = joined_header_values(&parts.headers, CONTENT_TYPE.as_str());
    let mut headers_to_apply = request_options.headers().clone();
    if let Some(overridden) = headers_to_apply
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    {
        content_type = overridden.to_owned();
    }

    // Encoder selection follows the literal precedence order: multipart
    // (case-sensitive prefix), then JSON, then url-encoded, both matched as
    // case-insensitive prefixes so trailing parameters still count.
    let mut encoded_body = None;
    if let Some(payload) = request_options.body() {
        if !is_empty_body_value(payload) {
            if content_type.starts_with("multipart/form-data") {
                let (new_body, boundary) = body::multipart_body(payload.clone());
                encoded_body = Some(new_body);
                let value = format!("multipart/form-data; boundary={boundary}");
                headers_to_apply.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_str(&value).map_err(|source| {
                        Error::InvalidHeaderValue {
                            name: CONTENT_TYPE.to_string(),
                            source,
                        }
                    })?,
                );
            } else if has_ci_prefix(&content_type, "application/json")
                || has_ci_prefix(&content_type, "text/json")
            {
                encoded_body = Some(body::json_body(payload.clone()));
                headers_to_apply
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            } else if has_ci_prefix(&content_type, "application/x-www-form-urlencoded") {
                encoded_body = Some(body::url_encoded_body(payload.clone()));
                headers_to_apply.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
            }
            // Anything else passes the original body and content type through.
        }
    }

    if let Some(query) = request_options.query() {
        let text = match query {
            Query::Raw(raw) => raw.clone(),
            Query::Pairs(pairs) => serialize_query_pairs(pairs),
        };
        if !text.is_empty() {
            uri = replace_query(&uri, &text)?;
        }
    }

    if let Some(AcceptEncoding::Value(encoding)) = request_options.encoding() {
        let value =
            HeaderValue::from_str(encoding).map_err(|source| Error::InvalidHeaderValue {
                name: ACCEPT_ENCODING.to_string(),
                source,
            })?;
        headers_to_apply.insert(ACCEPT_ENCODING, value);
    }

    // Apply only what actually changed.
    if uri != parts.uri {
        parts.uri = uri;
    }
    for (name, value) in headers_to_apply.iter() {
        if parts.headers.get(name) != Some(value) {
            parts.headers.insert(name.clone(), value.clone());
        }
    }
    let body = encoded_body.unwrap_or(body);

    Ok(Request::from_parts(parts, body))
}

/// Rebuilds the request URI on top of the base URL.
///
/// Host is always the base's; path, port, query, scheme and userinfo come
/// from the base only where it supplies a non-empty value (a bare `/` path
/// and a scheme-default port count as absent).
fn rebase_uri(uri: &Uri, base_url: &str) -> CourierResult<Uri> {
    let base = Url::parse(base_url).map_err(|_| Error::InvalidUri {
        uri: base_url.to_owned(),
    })?;

    let scheme = base.scheme();
    let host = base.host_str().unwrap_or_default();
    let port = base.port().or_else(|| uri.port_u16());
    let path = match base.path() {
        "" | "/" => uri.path(),
        base_path => base_path,
    };
    let query = match base.query() {
        Some(query) if !query.is_empty() => Some(query),
        _ => uri.query(),
    };
    let userinfo = if base.username().is_empty() && base.password().is_none() {
        request_userinfo(uri).map(str::to_owned)
    } else {
        let mut info = base.username().to_owned();
        if let Some(password) = base.password() {
            let _ = write!(info, ":{password}");
        }
        Some(info)
    };

    let mut rebased = format!("{scheme}://");
    if let Some(userinfo) = userinfo.filter(|info| !info.is_empty()) {
        rebased.push_str(&userinfo);
        rebased.push('@');
    }
    rebased.push_str(host);
    if let Some(port) = port {
        let _ = write!(rebased, ":{port}");
    }
    if !path.is_empty() {
        if !path.starts_with('/') {
            rebased.push('/');
        }
        rebased.push_str(path);
    }
    if let Some(query) = query.filter(|query| !query.is_empty()) {
        rebased.push('?');
        rebased.push_str(query);
    }

    rebased
        .parse()
        .map_err(|_| Error::InvalidUri { uri: rebased })
}

fn request_userinfo(uri: &Uri) -> Option<&str> {
    uri.authority()?
        .as_str()
        .rsplit_once('@')
        .map(|(userinfo, _)| userinfo)
}

fn replace_query(uri: &Uri, query: &str) -> CourierResult<Uri> {
    let path = uri.path();
    let path_and_query: http::uri::PathAndQuery = format!("{path}?{query}")
        .parse()
        .map_err(|_| Error::InvalidUri {
            uri: format!("{path}?{query}"),
        })?;

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).map_err(|_| Error::InvalidUri {
        uri: uri.to_string(),
    })
}

fn joined_header_values(headers: &http::HeaderMap, name: &str) -> String {
    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    values.join(",")
}

fn has_ci_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn is_empty_body_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(text) => text.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
