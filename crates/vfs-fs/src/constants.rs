//! Well-known identifiers and paths shared by the store and the index.

/// Identifier of the root directory, identical on both sides.
pub const ROOT_DIR_ID: &str = "io.vfs.root-dir";

/// Directories with a reserved meaning in the virtual filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownDir {
    /// The root of the tree (`/`)
    Root,
    /// Index-only directory that receives entries whose parent is unknown
    Orphans,
}

impl WellKnownDir {
    /// Logical path of the directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Orphans => "/Orphans",
        }
    }

    /// Last path component, empty for the root.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Root => "",
            Self::Orphans => "Orphans",
        }
    }

    /// Whether the given logical path designates this directory.
    pub fn matches(&self, path: &str) -> bool {
        path == self.as_str()
    }
}

impl AsRef<str> for WellKnownDir {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for WellKnownDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
