//! Stem codec: reference URL → filename stem
//!
//! The stem is the last path segment of the URL with its final extension
//! removed: `https://cdn.example/abc/hls/dn3.m3u8` → `dn3`. Query strings and
//! fragments never reach the stem.

use std::path::Path;
use url::Url;

use crate::{Error, Result};

/// Extract the filename stem of a reference URL
pub fn extract_stem(reference: &str) -> Result<String> {
    let url = Url::parse(reference)
        .map_err(|e| Error::MalformedUrl(format!("{:?}: {}", reference, e)))?;

    let file_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| Error::MalformedUrl(format!("{:?}: no file name in path", reference)))?;

    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::MalformedUrl(format!("{:?}: empty file stem", reference)))
}

/// Drop the marker character at the front of a stem
///
/// Returns the empty string for a one-character stem.
pub fn drop_leading_marker(stem: &str) -> &str {
    let mut chars = stem.chars();
    chars.next();
    chars.as_str()
}
