//! Cookie storage for outbound requests.
//!
//! The jar is a plain name/value store serialized into a single `Cookie`
//! header; it does not track domains, paths or expiry.

use std::fmt::Write as _;

/// Insertion-ordered cookie store.
///
/// Names are percent-encoded against the RFC 2616 token character set and
/// values against the RFC 6265 cookie-octet set when inserted. Replacing an
/// existing cookie keeps its position; new cookies append.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut jar = Self::new();
        for (name, value) in pairs {
            jar.set(name.as_ref(), value.as_ref());
        }
        jar
    }

    pub fn set(&mut self, name: &str, value: &str) {
        let name = escape(name, is_rfc2616_token_byte);
        let value = escape(value, is_rfc6265_cookie_octet);
        match self.cookies.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = escape(name, is_rfc2616_token_byte);
        self.cookies
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = escape(name, is_rfc2616_token_byte);
        let position = self.cookies.iter().position(|(existing, _)| *existing == name)?;
        Some(self.cookies.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Serializes the jar as a single `Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut header = String::new();
        for (name, value) in &self.cookies {
            if !header.is_empty() {
                header.push_str("; ");
            }
            let _ = write!(header, "{name}={value}");
        }
        header
    }
}

fn escape(input: &str, allowed: fn(u8) -> bool) -> String {
    let mut escaped = String::with_capacity(input.len());
    for &byte in input.as_bytes() {
        if allowed(byte) {
            escaped.push(byte as char);
        } else {
            let _ = write!(escaped, "%{byte:02X}");
        }
    }
    escaped
}

// RFC 2616 token: any CHAR except CTLs or separators.
fn is_rfc2616_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

// RFC 6265 cookie-octet: %x21 / %x23-2B / %x2D-3A / %x3C-5B / %x5D-7E.
fn is_rfc6265_cookie_octet(byte: u8) -> bool {
    matches!(byte, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}
