use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use bytes::Bytes;
use rand::Rng;
use serde_json::Value;

use crate::CourierResult;
use crate::error::Error;
use crate::util::serialize_query_pairs;

/// Byte source for an outbound body.
///
/// `rewind` is consulted before a streaming upload starts; sources that
/// cannot seek keep the no-op default.
pub trait BodyReader: Read + Send {
    fn rewind(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn is_seekable(&self) -> bool {
        false
    }
}

/// Outbound request body.
///
/// `Streaming` bodies carry an optional declared length; encoder-produced
/// bodies are streaming with an unknown length and encode on first read.
#[derive(Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Buffered(Bytes),
    Streaming(StreamingBody),
}

impl RequestBody {
    /// Declared body size; `None` when the source length is unknown.
    pub fn len(&self) -> Option<u64> {
        match self {
            Self::Empty => Some(0),
            Self::Buffered(bytes) => Some(bytes.len() as u64),
            Self::Streaming(streaming) => streaming.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub(crate) fn into_bytes(self) -> CourierResult<Bytes> {
        match self {
            Self::Empty => Ok(Bytes::new()),
            Self::Buffered(bytes) => Ok(bytes),
            Self::Streaming(mut streaming) => {
                let mut buffer = Vec::new();
                streaming
                    .reader
                    .read_to_end(&mut buffer)
                    .map_err(|source| Error::ReadBody { source })?;
                Ok(Bytes::from(buffer))
            }
        }
    }

    /// Turns the body into the reader handed to the engine for a streaming
    /// upload, rewinding seekable sources first.
    pub(crate) fn into_transfer_reader(self) -> CourierResult<Box<dyn BodyReader>> {
        match self {
            Self::Empty => Ok(Box::new(SeekableReader(Cursor::new(Bytes::new())))),
            Self::Buffered(bytes) => Ok(Box::new(SeekableReader(Cursor::new(bytes)))),
            Self::Streaming(mut streaming) => {
                if streaming.reader.is_seekable() {
                    streaming
                        .reader
                        .rewind()
                        .map_err(|source| Error::ReadBody { source })?;
                }
                Ok(streaming.reader)
            }
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("Empty"),
            Self::Buffered(bytes) => formatter
                .debug_tuple("Buffered")
                .field(&bytes.len())
                .finish(),
            Self::Streaming(streaming) => streaming.fmt(formatter),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Buffered(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffered(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Buffered(Bytes::from(text))
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        Self::Buffered(Bytes::from_static(text.as_bytes()))
    }
}

/// Read-based body with an optional declared length.
pub struct StreamingBody {
    reader: Box<dyn BodyReader>,
    len: Option<u64>,
}

impl StreamingBody {
    pub fn new<R>(reader: R, len: Option<u64>) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            reader: Box::new(PlainReader(reader)),
            len,
        }
    }

    pub fn seekable<R>(reader: R, len: Option<u64>) -> Self
    where
        R: Read + Seek + Send + 'static,
    {
        Self {
            reader: Box::new(SeekableReader(reader)),
            len,
        }
    }

    fn lazy<F>(encode: F) -> Self
    where
        F: FnOnce() -> Vec<u8> + Send + 'static,
    {
        Self {
            reader: Box::new(LazyEncoded {
                encode: Some(encode),
                cursor: Cursor::new(Vec::new()),
            }),
            len: None,
        }
    }

    pub fn len(&self) -> Option<u64> {
        self.len
    }
}

impl fmt::Debug for StreamingBody {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Streaming")
            .field("len", &self.len)
            .finish()
    }
}

struct PlainReader<R>(R);

impl<R: Read + Send> Read for PlainReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read + Send> BodyReader for PlainReader<R> {}

struct SeekableReader<R>(R);

impl<R: Read + Seek + Send> Read for SeekableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read + Seek + Send> BodyReader for SeekableReader<R> {
    fn rewind(&mut self) -> io::Result<()> {
        self.0.seek(SeekFrom::Start(0)).map(|_| ())
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// Defers encoding until the engine pulls the first chunk.
struct LazyEncoded<F> {
    encode: Option<F>,
    cursor: Cursor<Vec<u8>>,
}

impl<F> Read for LazyEncoded<F>
where
    F: FnOnce() -> Vec<u8> + Send,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(encode) = self.encode.take() {
            self.cursor = Cursor::new(encode());
        }
        self.cursor.read(buf)
    }
}

impl<F> BodyReader for LazyEncoded<F> where F: FnOnce() -> Vec<u8> + Send {}

pub(crate) fn json_body(payload: Value) -> RequestBody {
    RequestBody::Streaming(StreamingBody::lazy(move || {
        serde_json::to_vec(&payload).unwrap_or_default()
    }))
}

pub(crate) fn url_encoded_body(payload: Value) -> RequestBody {
    RequestBody::Streaming(StreamingBody::lazy(move || {
        serialize_query_pairs(&flatten_pairs(&payload)).into_bytes()
    }))
}

pub(crate) fn multipart_body(payload: Value) -> (RequestBody, String) {
    let boundary = generate_boundary();
    let body_boundary = boundary.clone();
    let body = RequestBody::Streaming(StreamingBody::lazy(move || {
        encode_multipart(&payload, &body_boundary)
    }));
    (body, boundary)
}

pub(crate) fn generate_boundary() -> String {
    let mut rng = rand::rng();
    format!("{:016x}{:016x}", rng.random::<u64>(), rng.random::<u64>())
}

/// Flattens a structured value into bracketed name/value pairs
/// (`services[web][image]=nginx`), the shape form encoders expect.
fn flatten_pairs(value: &Value) -> Vec<(String, String)> {
    fn walk(prefix: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
        match value {
            Value::Object(map) => {
                for (key, nested) in map {
                    let name = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}[{key}]")
                    };
                    walk(&name, nested, pairs);
                }
            }
            Value::Array(items) => {
                for (index, nested) in items.iter().enumerate() {
                    walk(&format!("{prefix}[{index}]"), nested, pairs);
                }
            }
            scalar => {
                if !prefix.is_empty() {
                    pairs.push((prefix.to_owned(), scalar_text(scalar)));
                }
            }
        }
    }

    let mut pairs = Vec::new();
    walk("", value, &mut pairs);
    pairs
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn encode_multipart(payload: &Value, boundary: &str) -> Vec<u8> {
    let mut encoded = Vec::new();
    match payload {
        // Part list: [{ "name": ..., "contents": ..., "filename"?, "content_type"? }]
        Value::Array(parts) => {
            for part in parts {
                let Some(name) = part.get("name").and_then(Value::as_str) else {
                    continue;
                };
                let contents = part.get("contents").unwrap_or(&Value::Null);
                let filename = part.get("filename").and_then(Value::as_str);
                let content_type = part.get("content_type").and_then(Value::as_str);
                push_part(&mut encoded, boundary, name, contents, filename, content_type);
            }
        }
        // Plain object: every entry becomes a text part.
        Value::Object(map) => {
            for (name, contents) in map {
                push_part(&mut encoded, boundary, name, contents, None, None);
            }
        }
        _ => {}
    }
    encoded.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    encoded
}

fn push_part(
    encoded: &mut Vec<u8>,
    boundary: &str,
    name: &str,
    contents: &Value,
    filename: Option<&str>,
    content_type: Option<&str>,
) {
    encoded.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    let mut disposition = format!("Content-Disposition: form-data; name=\"{name}\"");
    if let Some(filename) = filename {
        disposition.push_str(&format!("; filename=\"{filename}\""));
    }
    encoded.extend_from_slice(disposition.as_bytes());
    encoded.extend_from_slice(b"\r\n");
    if let Some(content_type) = content_type {
        encoded.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    }
    encoded.extend_from_slice(b"\r\n");
    encoded.extend_from_slice(scalar_text(contents).as_bytes());
    encoded.extend_from_slice(b"\r\n");
}
