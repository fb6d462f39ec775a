//! JSON-Pointer-like navigation of a parsed schema tree.
//!
//! A path such as `#/definitions/a%20b/items/0` is split on every `#`, `/` and
//! `.` character (empty pieces are dropped), each piece is percent-decoded and
//! then used as an object key or an array index, left to right.
use std::borrow::Cow;

use serde_json::Value;
use tracing::warn;

use crate::config::{DecodePolicy, SegmentEncoding};
use crate::error::ResolutionError;

const SEPARATORS: [char; 3] = ['#', '/', '.'];

#[derive(Debug, Clone)]
pub struct FragmentResolver {
    encoding: SegmentEncoding,
    policy: DecodePolicy,
}

impl Default for FragmentResolver {
    fn default() -> Self {
        Self::new(SegmentEncoding::Utf8, DecodePolicy::Lenient)
    }
}

impl FragmentResolver {
    pub fn new(encoding: SegmentEncoding, policy: DecodePolicy) -> Self {
        Self { encoding, policy }
    }

    /// Resolve `path` against `tree`. The empty path (or a bare `#`) yields `tree`.
    pub fn resolve<'a>(&self, tree: &'a Value, path: &str) -> Result<&'a Value, ResolutionError> {
        let segments = self.segments(path)?;
        resolve_segments(tree, &segments)
    }

    /// Split and decode `path` into the segments a `SchemaReference` stores.
    pub fn segments(&self, path: &str) -> Result<Vec<String>, ResolutionError> {
        path.split(SEPARATORS)
            .filter(|raw| !raw.is_empty())
            .map(|raw| self.decode(raw))
            .collect()
    }

    fn decode(&self, raw: &str) -> Result<String, ResolutionError> {
        match percent_decode(raw, self.encoding) {
            Some(decoded) => Ok(decoded),
            None => match self.policy {
                DecodePolicy::Lenient => {
                    warn!(
                        segment = raw,
                        encoding = self.encoding.name(),
                        "could not decode path segment, using it undecoded"
                    );
                    Ok(raw.to_string())
                }
                DecodePolicy::Strict => Err(ResolutionError::UndecodableSegment {
                    segment: raw.to_string(),
                    encoding: self.encoding.name().to_string(),
                }),
            },
        }
    }
}

/// Walk already-decoded segments.
pub fn resolve_segments<'a, S: AsRef<str>>(
    tree: &'a Value,
    segments: &[S],
) -> Result<&'a Value, ResolutionError> {
    let mut node = tree;
    for segment in segments {
        let segment = segment.as_ref();
        node = match node {
            Value::Array(items) => {
                let index = segment.parse::<usize>().map_err(|_| {
                    ResolutionError::InvalidIndex { segment: segment.to_string() }
                })?;
                items.get(index).ok_or_else(|| ResolutionError::InvalidIndex {
                    segment: segment.to_string(),
                })?
            }
            Value::Object(map) => map.get(segment).ok_or_else(|| {
                ResolutionError::PathNotPresent { segment: segment.to_string() }
            })?,
            _ => {
                return Err(ResolutionError::PathNotPresent { segment: segment.to_string() });
            }
        };
    }
    Ok(node)
}

/// Form-style percent decoding (`+` is a space). Only the bytes of `%XX`
/// escapes are read in `encoding`; other characters are kept as written.
/// `None` for a malformed escape or escaped bytes not valid in `encoding`.
fn percent_decode(raw: &str, encoding: SegmentEncoding) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while !rest.is_empty() {
        let escaped = escaped_run_len(rest)?;
        if escaped > 0 {
            let bytes: Cow<[u8]> = urlencoding::decode_binary(rest[..escaped].as_bytes());
            match encoding {
                SegmentEncoding::Utf8 => out.push_str(std::str::from_utf8(&bytes).ok()?),
                SegmentEncoding::Latin1 => out.extend(bytes.iter().map(|&b| char::from(b))),
            }
            rest = &rest[escaped..];
        } else {
            let literal = rest.find('%').unwrap_or(rest.len());
            out.extend(rest[..literal].chars().map(|c| if c == '+' { ' ' } else { c }));
            rest = &rest[literal..];
        }
    }
    Some(out)
}

/// Length of the run of `%XX` escapes `s` starts with.
fn escaped_run_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut at = 0;
    while bytes.get(at) == Some(&b'%') {
        let hex = bytes.get(at + 1..at + 3)?;
        if !hex.iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
        at += 3;
    }
    Some(at)
}
