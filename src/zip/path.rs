//! Entry path validation.
//!
//! Entry names are `/`-separated, relative, and free of empty, `.` and `..`
//! segments. Directory names always carry a single trailing `/`.

use crate::error::{Error, Result};

/// Longest name the 16-bit length field can describe.
const MAX_NAME_LENGTH: usize = u16::MAX as usize;

fn invalid(path: &str, reason: &'static str) -> Error {
    Error::InvalidPath {
        path: path.to_string(),
        reason,
    }
}

fn check_segments(original: &str, body: &str) -> Result<()> {
    if body.contains('\0') {
        return Err(invalid(original, "contains NUL byte"));
    }
    if body.starts_with('/') {
        return Err(invalid(original, "absolute path not allowed"));
    }
    for segment in body.split('/') {
        match segment {
            "" => return Err(invalid(original, "empty path segment")),
            "." | ".." => return Err(invalid(original, "relative segment not allowed")),
            _ => {}
        }
    }
    Ok(())
}

fn check_length(path: &str) -> Result<()> {
    if path.len() > MAX_NAME_LENGTH {
        return Err(Error::NameTooLong {
            path: path.to_string(),
            len: path.len(),
        });
    }
    Ok(())
}

/// Validate a directory path and return it with exactly one trailing `/`.
///
/// `"a/b"` and `"a/b/"` both normalize to `"a/b/"`.
pub fn directory_name(path: &str) -> Result<String> {
    let body = path.strip_suffix('/').unwrap_or(path);
    if body.is_empty() {
        return Err(invalid(path, "empty path"));
    }
    check_segments(path, body)?;

    let name = format!("{body}/");
    check_length(&name)?;
    Ok(name)
}

/// Validate a file path. Files may not end in `/`.
pub fn file_name(path: &str) -> Result<&str> {
    if path.is_empty() {
        return Err(invalid(path, "empty path"));
    }
    check_segments(path, path)?;
    check_length(path)?;
    Ok(path)
}

/// Every proper ancestor of `path`, shortest first, without trailing `/`.
///
/// `"a/b/c.txt"` yields `"a"` then `"a/b"`. The last segment is never
/// included.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(idx, _)| &path[..idx])
}
