//! Minimal bencode decoder
//!
//! Only decoding is needed: torrent files are read, never written. Dictionary
//! entries keep their source order and the byte span of each value so callers
//! can hash the exact encoded form of a sub-value (the `info` dictionary).

use crate::error::TorrentError;
use std::ops::Range;

/// Nesting limit for lists and dictionaries
pub const MAX_DEPTH: usize = 64;

/// A decoded bencode value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `i<n>e`
    Int(i64),
    /// `<len>:<bytes>`
    Bytes(Vec<u8>),
    /// `l...e`
    List(Vec<Value>),
    /// `d...e`, entries in source order
    Dict(Vec<(Vec<u8>, Value)>),
}

impl Value {
    /// Look up a key when this is a dictionary
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        match self {
            Value::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Byte string contents, if this is a byte string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Byte string contents as UTF-8 (lossy), if this is a byte string
    pub fn as_str_lossy(&self) -> Option<String> {
        self.as_bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// List items, if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A top-level dictionary entry together with the span of its encoded value
#[derive(Debug, Clone)]
pub struct SpannedEntry {
    /// Dictionary key
    pub key: Vec<u8>,
    /// Decoded value
    pub value: Value,
    /// Byte range of the encoded value in the input
    pub span: Range<usize>,
}

fn err(offset: usize, reason: &'static str) -> TorrentError {
    TorrentError::Bencode { offset, reason }
}

/// Decode a complete bencoded document
pub fn parse(data: &[u8]) -> Result<Value, TorrentError> {
    let (value, end) = parse_value(data, 0, 0)?;
    if end != data.len() {
        return Err(err(end, "trailing data"));
    }
    Ok(value)
}

/// Decode a document that must be a dictionary, keeping each value's span
pub fn parse_dict_spanned(data: &[u8]) -> Result<Vec<SpannedEntry>, TorrentError> {
    if data.first() != Some(&b'd') {
        return Err(err(0, "expected dictionary"));
    }
    let mut entries = Vec::new();
    let mut pos = 1;
    while pos < data.len() && data[pos] != b'e' {
        let (key, next) = parse_bytes(data, pos)?;
        let (value, end) = parse_value(data, next, 1)?;
        entries.push(SpannedEntry {
            key,
            value,
            span: next..end,
        });
        pos = end;
    }
    if pos >= data.len() {
        return Err(err(pos, "unterminated dictionary"));
    }
    if pos + 1 != data.len() {
        return Err(err(pos + 1, "trailing data"));
    }
    Ok(entries)
}

fn parse_value(data: &[u8], pos: usize, depth: usize) -> Result<(Value, usize), TorrentError> {
    if depth > MAX_DEPTH {
        return Err(err(pos, "nesting too deep"));
    }
    match data.get(pos) {
        None => Err(err(pos, "unexpected end of input")),
        Some(b'i') => {
            let (n, next) = parse_int(data, pos)?;
            Ok((Value::Int(n), next))
        }
        Some(b'l') => {
            let mut items = Vec::new();
            let mut i = pos + 1;
            while i < data.len() && data[i] != b'e' {
                let (value, next) = parse_value(data, i, depth + 1)?;
                items.push(value);
                i = next;
            }
            if i >= data.len() {
                return Err(err(i, "unterminated list"));
            }
            Ok((Value::List(items), i + 1))
        }
        Some(b'd') => {
            let mut entries = Vec::new();
            let mut i = pos + 1;
            while i < data.len() && data[i] != b'e' {
                if !data[i].is_ascii_digit() {
                    return Err(err(i, "dictionary key must be a byte string"));
                }
                let (key, next) = parse_bytes(data, i)?;
                let (value, next) = parse_value(data, next, depth + 1)?;
                entries.push((key, value));
                i = next;
            }
            if i >= data.len() {
                return Err(err(i, "unterminated dictionary"));
            }
            Ok((Value::Dict(entries), i + 1))
        }
        Some(b'0'..=b'9') => {
            let (bytes, next) = parse_bytes(data, pos)?;
            Ok((Value::Bytes(bytes), next))
        }
        Some(_) => Err(err(pos, "invalid prefix byte")),
    }
}

fn parse_int(data: &[u8], pos: usize) -> Result<(i64, usize), TorrentError> {
    let start = pos + 1;
    let end = data[start..]
        .iter()
        .position(|&b| b == b'e')
        .map(|p| start + p)
        .ok_or_else(|| err(pos, "unterminated integer"))?;
    let digits = &data[start..end];
    let malformed = digits.is_empty()
        || digits == b"-"
        || (digits.len() > 1 && digits[0] == b'0')
        || digits.starts_with(b"-0");
    if malformed {
        return Err(err(start, "invalid integer"));
    }
    let n = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| err(start, "invalid integer"))?;
    Ok((n, end + 1))
}

fn parse_bytes(data: &[u8], pos: usize) -> Result<(Vec<u8>, usize), TorrentError> {
    let colon = data[pos..]
        .iter()
        .position(|&b| !b.is_ascii_digit())
        .map(|p| pos + p)
        .ok_or_else(|| err(pos, "unexpected end of input"))?;
    if colon == pos || data[colon] != b':' {
        return Err(err(pos, "invalid byte string length"));
    }
    let digits = &data[pos..colon];
    if digits.len() > 1 && digits[0] == b'0' {
        return Err(err(pos, "invalid byte string length"));
    }
    let len: usize = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| err(pos, "invalid byte string length"))?;
    let start = colon + 1;
    let end = start
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| err(start, "byte string exceeds input"))?;
    Ok((data[start..end].to_vec(), end))
}
