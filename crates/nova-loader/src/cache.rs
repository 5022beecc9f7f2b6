//! Cache key derivation from snapshot file names.

use std::path::{Path, PathBuf};

/// Which kind of file a snapshot path names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Conserved run state; converting it is expensive.
    Checkpoint,
    /// Primitive products; read directly.
    Products,
}

/// File-name markers distinguishing checkpoints from products.
///
/// The products cache for `run/chkpt.0004.nova` is `run/prods.0004.nova`:
/// every occurrence of the checkpoint marker in the file name is replaced
/// by the products marker. The directory and extension never change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    /// Marker naming checkpoint files.
    pub checkpoint: String,
    /// Marker naming products files.
    pub products: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            checkpoint: "chkpt".to_string(),
            products: "prods".to_string(),
        }
    }
}

impl Markers {
    /// Products if the file name contains the products marker, otherwise
    /// checkpoint.
    pub fn classify(&self, path: &Path) -> SourceKind {
        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if name.contains(self.products.as_str()) => SourceKind::Products,
            _ => SourceKind::Checkpoint,
        }
    }

    /// The products cache path for a checkpoint path.
    ///
    /// Returns `None` if the file name is missing, not UTF-8, or lacks the
    /// checkpoint marker, since the cache would then collide with the
    /// checkpoint itself.
    pub fn cache_path(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        if self.checkpoint.is_empty() || !name.contains(self.checkpoint.as_str()) {
            return None;
        }
        Some(path.with_file_name(name.replace(self.checkpoint.as_str(), &self.products)))
    }
}
