//! The [`StoragePath`] type.
//!
//! Valid paths:
//! - Must start with `/`
//! - Must not contain empty segments (`//`), `.` or `..`
//! - Must not contain NUL or `\`
//! - Folders need at least a user segment (`/alice/`)
//! - User names must not start with `.`; those are reserved for the store
//! - Documents need a user, a module and a name (`/alice/notes/todo.txt`),
//!   or a user, `public`, a module and a name for public documents

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PathError, Result};

/// Segment that marks the publicly readable area of a user's storage.
pub const PUBLIC_SEGMENT: &str = "public";

/// Characters that are forbidden anywhere in a path.
const FORBIDDEN_CHARS: &[char] = &['\0', '\\'];

/// A validated, normalized storage path.
///
/// The textual form is the normalized key used by both the blob tree and
/// the version table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoragePath {
    raw: String,
}

impl StoragePath {
    /// Parse and validate a raw path string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rstore_path::StoragePath;
    ///
    /// let p = StoragePath::parse("/admin/messages/foo/hello.txt").unwrap();
    /// assert!(!p.is_folder());
    /// assert_eq!(p.parent().unwrap().as_str(), "/admin/messages/foo/");
    /// assert!(StoragePath::parse("/admin/../etc/passwd").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(PathError::invalid(raw, "path must not be empty"));
        }
        if !raw.starts_with('/') {
            return Err(PathError::invalid(raw, "path must start with '/'"));
        }
        for ch in FORBIDDEN_CHARS {
            if raw.contains(*ch) {
                return Err(PathError::invalid(
                    raw,
                    format!("contains forbidden character: {ch:?}"),
                ));
            }
        }

        let is_folder = raw.ends_with('/');
        let body = &raw[1..];
        let body = body.strip_suffix('/').unwrap_or(body);
        if body.is_empty() {
            return Err(PathError::invalid(raw, "path must name a user"));
        }

        let segments: Vec<&str> = body.split('/').collect();
        for segment in &segments {
            if segment.is_empty() {
                return Err(PathError::invalid(raw, "path segments must not be empty"));
            }
            if *segment == "." || *segment == ".." {
                return Err(PathError::invalid(
                    raw,
                    format!("relative segment {segment:?} is not allowed"),
                ));
            }
        }

        if segments[0].starts_with('.') {
            return Err(PathError::invalid(raw, "user name must not start with '.'"));
        }

        if !is_folder {
            let min = if segments.get(1) == Some(&PUBLIC_SEGMENT) { 4 } else { 3 };
            if segments.len() < min {
                return Err(PathError::invalid(
                    raw,
                    "document must be inside a module folder",
                ));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// The normalized textual form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this path names a folder (ends with `/`).
    pub fn is_folder(&self) -> bool {
        self.raw.ends_with('/')
    }

    /// Whether this path names a document.
    pub fn is_document(&self) -> bool {
        !self.is_folder()
    }

    /// Whether this is the user folder, the boundary where cascades stop.
    pub fn is_module_root(&self) -> bool {
        self.is_folder() && self.segments().count() == 1
    }

    /// The owning user (first segment).
    pub fn user(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }

    /// Whether the path lies in the user's public area.
    pub fn is_public(&self) -> bool {
        self.segments().nth(1) == Some(PUBLIC_SEGMENT)
    }

    /// The module this path belongs to, if it is deep enough to name one.
    pub fn module(&self) -> Option<&str> {
        let idx = if self.is_public() { 2 } else { 1 };
        self.segments().nth(idx)
    }

    /// Last segment; folder names keep their trailing `/`.
    pub fn name(&self) -> &str {
        let trimmed = self.raw.strip_suffix('/').unwrap_or(&self.raw);
        let start = trimmed.rfind('/').map_or(0, |i| i + 1);
        &self.raw[start..]
    }

    /// The containing folder, or `None` for the module root.
    pub fn parent(&self) -> Option<StoragePath> {
        if self.is_module_root() {
            return None;
        }
        let trimmed = self.raw.strip_suffix('/').unwrap_or(&self.raw);
        let end = trimmed.rfind('/')? + 1;
        Some(Self {
            raw: self.raw[..end].to_string(),
        })
    }

    /// Folders from the parent upward, excluding the module root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Build the path of an entry inside this folder.
    ///
    /// `name` is a listing name: a plain segment for documents, or a
    /// segment followed by `/` for folders.
    pub fn child(&self, name: &str) -> Result<StoragePath> {
        if !self.is_folder() {
            return Err(PathError::invalid(&self.raw, "only folders have children"));
        }
        let segment = name.strip_suffix('/').unwrap_or(name);
        if segment.is_empty() || segment.contains('/') {
            return Err(PathError::invalid(
                name,
                "child name must be a single segment",
            ));
        }
        Self::parse(&format!("{}{name}", self.raw))
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('/').filter(|s| !s.is_empty())
    }
}

/// Iterator over a path's versioned ancestors, closest first.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<StoragePath>,
}

impl Iterator for Ancestors {
    type Item = StoragePath;

    fn next(&mut self) -> Option<StoragePath> {
        let current = self.next.take()?;
        if current.is_module_root() {
            return None;
        }
        self.next = current.parent();
        Some(current)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for StoragePath {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl FromStr for StoragePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StoragePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<StoragePath> for String {
    fn from(path: StoragePath) -> Self {
        path.raw
    }
}
