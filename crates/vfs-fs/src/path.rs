//! Logical paths inside the virtual filesystem
//!
//! Both stores name nodes with absolute, slash-separated paths rooted at `/`.
//! Conversion to a platform-native path only happens at the I/O boundary of
//! [`crate::LocalStore`].

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// An absolute path inside the virtual filesystem.
///
/// Always starts with `/`, never ends with one (except the root itself),
/// and never contains empty, `.` or `..` components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LogicalPath {
    inner: String,
}

impl LogicalPath {
    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
        }
    }

    /// Normalize any slash- or backslash-separated input.
    ///
    /// `..` components pop the previous one and are clamped at the root.
    pub fn new(path: impl AsRef<str>) -> Self {
        let raw = path.as_ref().replace('\\', "/");
        let mut parts: Vec<&str> = Vec::new();
        for part in raw.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
        Self {
            inner: format!("/{}", parts.join("/")),
        }
    }

    /// Get the internal string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Whether this is `/`.
    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Append a single name (or a relative sub-path) to this path.
    pub fn join(&self, name: &str) -> Self {
        if self.is_root() {
            Self::new(format!("/{name}"))
        } else {
            Self::new(format!("{}/{}", self.inner, name))
        }
    }

    /// Parent directory, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Last component, empty for the root.
    pub fn name(&self) -> &str {
        self.inner.rsplit('/').next().unwrap_or_default()
    }

    /// Resolve this logical path below a native base directory.
    pub fn to_native_under(&self, base: &Path) -> PathBuf {
        let mut native = base.to_path_buf();
        for part in self.inner.split('/').filter(|p| !p.is_empty()) {
            native.push(part);
        }
        native
    }

    /// Build the logical path of `native` relative to `base`.
    ///
    /// Returns `None` when `native` is not below `base` or contains a
    /// component that cannot be represented (e.g. `..`).
    pub fn from_native(base: &Path, native: &Path) -> Option<Self> {
        let relative = native.strip_prefix(base).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(Self::new(format!("/{}", parts.join("/"))))
    }
}

impl Default for LogicalPath {
    fn default() -> Self {
        Self::root()
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl std::fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for LogicalPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LogicalPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<LogicalPath> for String {
    fn from(p: LogicalPath) -> Self {
        p.inner
    }
}
