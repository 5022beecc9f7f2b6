//! Integration tests for checkpoint loading and the products cache.

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;

use nova_core::BlockIndex;
use nova_loader::{
    load, Checkpoint, LoadError, NativeLoader, Run, SnapshotCache, SnapshotLoader,
};
use nova_products::{compare_products, Products};
use nova_test_utils::{block_grid, random_block, sample_configuration, GridSpec};

fn grid_products() -> Products {
    let spec = GridSpec::default();
    Products::new(
        2.5,
        sample_configuration(spec.num_polar_zones()),
        block_grid(&spec),
    )
    .unwrap()
}

fn write_checkpoint(dir: &Path, name: &str, products: &Products) -> std::path::PathBuf {
    let path = dir.join(name);
    Checkpoint::from_products(products, 40).save(&path).unwrap();
    path
}

/// Native loader that counts conversions and can refuse cache writes.
#[derive(Default)]
struct CountingLoader {
    conversions: Cell<usize>,
    refuse_writes: bool,
}

struct CountedRun<'a> {
    checkpoint: Checkpoint,
    conversions: &'a Cell<usize>,
}

impl Run for CountedRun<'_> {
    fn make_products(&self) -> Result<Products, LoadError> {
        self.conversions.set(self.conversions.get() + 1);
        self.checkpoint.make_products()
    }
}

impl<'a> SnapshotLoader for &'a CountingLoader {
    type Run = CountedRun<'a>;

    fn deserialize_checkpoint(&self, path: &Path) -> Result<CountedRun<'a>, LoadError> {
        let loader: &'a CountingLoader = *self;
        Ok(CountedRun {
            checkpoint: NativeLoader.deserialize_checkpoint(path)?,
            conversions: &loader.conversions,
        })
    }

    fn deserialize_products(&self, path: &Path) -> Result<Products, LoadError> {
        NativeLoader.deserialize_products(path)
    }

    fn serialize_products(&self, products: &Products, path: &Path) -> Result<(), LoadError> {
        if self.refuse_writes {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into());
        }
        NativeLoader.serialize_products(products, path)
    }

    fn source_fingerprint(&self, path: &Path) -> Result<u64, LoadError> {
        NativeLoader.source_fingerprint(path)
    }

    fn cached_fingerprint(&self, path: &Path) -> Result<Option<u64>, LoadError> {
        NativeLoader.cached_fingerprint(path)
    }
}

#[test]
fn checkpoint_is_converted_once() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_checkpoint(dir.path(), "chkpt.0001.nova", &grid_products());
    let loader = CountingLoader::default();
    let cache = SnapshotCache::new(&loader);

    let first = cache.load(&source).unwrap();
    assert_eq!(loader.conversions.get(), 1);
    assert!(dir.path().join("prods.0001.nova").exists());

    let second = cache.load(&source).unwrap();
    assert_eq!(loader.conversions.get(), 1);
    assert_eq!(first, second);
}

#[test]
fn cached_and_fresh_loads_agree_bit_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_checkpoint(dir.path(), "chkpt.0002.nova", &grid_products());

    let fresh = NativeLoader
        .deserialize_checkpoint(&source)
        .unwrap()
        .make_products()
        .unwrap();
    let built = load(&source).unwrap();
    let cached = load(&source).unwrap();

    assert_eq!(compare_products(&fresh, &built), None);
    assert_eq!(compare_products(&built, &cached), None);
    assert_eq!(built.source_fingerprint(), cached.source_fingerprint());
    assert!(built.source_fingerprint().is_some());
}

#[test]
fn products_path_is_read_directly() {
    let dir = tempfile::tempdir().unwrap();
    let products = grid_products();
    let path = dir.path().join("prods.0003.nova");
    products.save(&path).unwrap();

    let loader = CountingLoader::default();
    let loaded = SnapshotCache::new(&loader).load(&path).unwrap();
    assert_eq!(loaded, products);
    assert_eq!(loader.conversions.get(), 0);
}

#[test]
fn failed_cache_write_still_returns_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_checkpoint(dir.path(), "chkpt.0004.nova", &grid_products());
    let loader = CountingLoader {
        refuse_writes: true,
        ..CountingLoader::default()
    };
    let cache = SnapshotCache::new(&loader);

    let products = cache.load(&source).unwrap();
    assert_eq!(products.len(), grid_products().len());
    assert!(!dir.path().join("prods.0004.nova").exists());

    cache.load(&source).unwrap();
    assert_eq!(loader.conversions.get(), 2);
}

#[test]
fn stale_cache_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_checkpoint(dir.path(), "chkpt.0005.nova", &grid_products());
    let loader = CountingLoader::default();
    let cache = SnapshotCache::new(&loader);
    cache.load(&source).unwrap();

    // Overwrite the checkpoint with a different state.
    let other = Products::new(
        9.0,
        sample_configuration(3),
        [(BlockIndex::new(0, 0), random_block(7, 4, 3))],
    )
    .unwrap();
    Checkpoint::from_products(&other, 41).save(&source).unwrap();

    let rebuilt = cache.load(&source).unwrap();
    assert_eq!(loader.conversions.get(), 2);
    assert_eq!(rebuilt.time(), 9.0);
    assert_eq!(rebuilt.len(), 1);
}

#[test]
fn corrupt_cache_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_checkpoint(dir.path(), "chkpt.0006.nova", &grid_products());
    fs::write(dir.path().join("prods.0006.nova"), b"not a products file").unwrap();

    let loader = CountingLoader::default();
    let products = SnapshotCache::new(&loader).load(&source).unwrap();
    assert_eq!(loader.conversions.get(), 1);

    let repaired = Products::open(dir.path().join("prods.0006.nova")).unwrap();
    assert_eq!(compare_products(&products, &repaired), None);
}

#[test]
fn rewriting_the_cache_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_checkpoint(dir.path(), "chkpt.0007.nova", &grid_products());
    let cache_path = dir.path().join("prods.0007.nova");

    let products = load(&source).unwrap();
    let first = fs::read(&cache_path).unwrap();
    NativeLoader.serialize_products(&products, &cache_path).unwrap();
    assert_eq!(fs::read(&cache_path).unwrap(), first);
}

#[test]
fn missing_checkpoint_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path().join("chkpt.9999.nova")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)), "{err}");
}

#[test]
fn checkpoint_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint = Checkpoint::from_products(&grid_products(), 3);
    let path = dir.path().join("chkpt.0008.nova");
    checkpoint.save(&path).unwrap();
    assert_eq!(Checkpoint::open(&path).unwrap(), checkpoint);
}
