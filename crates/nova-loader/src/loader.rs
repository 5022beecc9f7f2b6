//! The loader seam and the products cache policy.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

use nova_products::{fingerprint_reader, Products, ProductsReader, ProductsWriter};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::cache::{Markers, SourceKind};
use crate::checkpoint::Checkpoint;
use crate::error::{CacheWriteError, LoadError};

/// Run state that can be converted to products.
pub trait Run {
    /// Build the products for this state. May take seconds.
    fn make_products(&self) -> Result<Products, LoadError>;
}

/// Reads and writes snapshot files.
///
/// [`SnapshotCache`] drives the cache policy through this trait, so a
/// test double can count or fail individual operations.
pub trait SnapshotLoader {
    /// The run state a checkpoint deserializes into.
    type Run: Run;

    /// Read a checkpoint.
    fn deserialize_checkpoint(&self, path: &Path) -> Result<Self::Run, LoadError>;

    /// Read a products file.
    fn deserialize_products(&self, path: &Path) -> Result<Products, LoadError>;

    /// Write a products file. A reader must never observe a partial file.
    fn serialize_products(&self, products: &Products, path: &Path) -> Result<(), LoadError>;

    /// Content fingerprint of a checkpoint file.
    fn source_fingerprint(&self, path: &Path) -> Result<u64, LoadError>;

    /// The source fingerprint recorded in a products file, `Ok(None)` if
    /// the file does not exist or records none.
    fn cached_fingerprint(&self, path: &Path) -> Result<Option<u64>, LoadError>;
}

/// [`SnapshotLoader`] for the nova binary file formats.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeLoader;

impl SnapshotLoader for NativeLoader {
    type Run = Checkpoint;

    fn deserialize_checkpoint(&self, path: &Path) -> Result<Checkpoint, LoadError> {
        Ok(Checkpoint::open(path)?)
    }

    fn deserialize_products(&self, path: &Path) -> Result<Products, LoadError> {
        Ok(Products::open(path)?)
    }

    fn serialize_products(&self, products: &Products, path: &Path) -> Result<(), LoadError> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        {
            let mut writer = ProductsWriter::new(BufWriter::new(&mut file));
            writer.write(products)?;
            writer.flush()?;
        }
        file.as_file().sync_all()?;
        file.persist(path).map_err(|err| err.error)?;
        debug!(path = %path.display(), "persisted products");
        Ok(())
    }

    fn source_fingerprint(&self, path: &Path) -> Result<u64, LoadError> {
        Ok(fingerprint_reader(BufReader::new(File::open(path)?))?)
    }

    fn cached_fingerprint(&self, path: &Path) -> Result<Option<u64>, LoadError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let reader = ProductsReader::open(BufReader::new(file))?;
        Ok(reader.header().source_fingerprint)
    }
}

/// Loads snapshots, memoizing checkpoint conversion in products files.
///
/// A checkpoint at `run/chkpt.0004.nova` is cached at
/// `run/prods.0004.nova` (see [`Markers`]). The cache records the
/// checkpoint's content fingerprint and is only reused while that
/// fingerprint matches, so caching never changes what `load` returns.
#[derive(Clone, Debug, Default)]
pub struct SnapshotCache<L = NativeLoader> {
    loader: L,
    markers: Markers,
}

impl<L: SnapshotLoader> SnapshotCache<L> {
    /// A cache over `loader` with the default markers.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            markers: Markers::default(),
        }
    }

    /// Replace the file-name markers.
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// The underlying loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// The file-name markers in use.
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Load the snapshot at `path`, a checkpoint or a products file.
    ///
    /// # Errors
    ///
    /// Any failure reading the source or converting a checkpoint. A
    /// failure writing the cache is logged and does not fail the load.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Products, LoadError> {
        let path = path.as_ref();
        match self.markers.classify(path) {
            SourceKind::Products => {
                timed("load products", path, || self.loader.deserialize_products(path))
            }
            SourceKind::Checkpoint => self.load_checkpoint(path),
        }
    }

    fn load_checkpoint(&self, path: &Path) -> Result<Products, LoadError> {
        let fingerprint = self.loader.source_fingerprint(path)?;
        let cache = self.markers.cache_path(path);

        if let Some(cache) = &cache {
            if let Some(products) = self.cached_products(cache, fingerprint) {
                return Ok(products);
            }
        } else {
            debug!(path = %path.display(), "no cache path for checkpoint name");
        }

        let run = timed("load checkpoint", path, || {
            self.loader.deserialize_checkpoint(path)
        })?;
        let products = timed("make products", path, || run.make_products())?
            .with_source_fingerprint(fingerprint);

        if let Some(cache) = cache {
            if let Err(err) = timed("cache products", &cache, || self.store(&products, &cache)) {
                warn!(error = %err, "continuing without products cache");
            }
        }
        Ok(products)
    }

    /// The cached products, if present and built from this fingerprint.
    fn cached_products(&self, cache: &Path, fingerprint: u64) -> Option<Products> {
        match self.loader.cached_fingerprint(cache) {
            Ok(Some(found)) if found == fingerprint => {
                match timed("load products", cache, || self.loader.deserialize_products(cache)) {
                    Ok(products) => Some(products),
                    Err(err) => {
                        warn!(path = %cache.display(), error = %err, "unreadable products cache, rebuilding");
                        None
                    }
                }
            }
            Ok(Some(found)) => {
                debug!(path = %cache.display(), found, expected = fingerprint, "stale products cache");
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(path = %cache.display(), error = %err, "unreadable products cache, rebuilding");
                None
            }
        }
    }

    fn store(&self, products: &Products, cache: &Path) -> Result<(), CacheWriteError> {
        self.loader
            .serialize_products(products, cache)
            .map_err(|source| CacheWriteError {
                path: cache.to_path_buf(),
                source,
            })
    }
}

fn timed<T>(phase: &'static str, path: &Path, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    info!(
        phase,
        path = %path.display(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
        "{phase}"
    );
    out
}

/// Load the snapshot at `path` with the native loader and default markers.
pub fn load(path: impl AsRef<Path>) -> Result<Products, LoadError> {
    SnapshotCache::new(NativeLoader).load(path)
}
