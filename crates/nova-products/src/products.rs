//! The [`Products`] snapshot.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use nova_core::{Block, BlockIndex, Configuration, Dimensionality};
use tracing::debug;

use crate::error::{CodecError, ProductsError};
use crate::profile::{self, PolarRows};
use crate::reader::ProductsReader;
use crate::writer::ProductsWriter;

/// One time slice of a run in primitive variables.
///
/// Blocks iterate in ascending [`BlockIndex`] order. The configuration is
/// shared, so cloning products or handing the configuration to renderers
/// does not copy it. The radial profile is built on first use and
/// memoized; `Products` is `Send + Sync` and needs no external locking.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use nova_core::{Block, BlockIndex, Configuration, Dimensionality};
/// use nova_products::Products;
/// # let yaml = nova_test_utils::config_yaml(1);
/// # let config = Configuration::from_yaml(&yaml).unwrap();
///
/// let block = Block::builder(array![1.0, 2.0, 3.0], array![0.0, 1.0])
///     .comoving_mass_density(array![[1.0], [2.0]])
///     .gas_pressure(array![[0.1], [0.1]])
///     .radial_four_velocity(array![[0.0], [0.0]])
///     .polar_four_velocity(array![[0.0], [0.0]])
///     .scalar(array![[0.0], [0.0]])
///     .build()
///     .unwrap();
/// let products = Products::new(1.5, config, [(BlockIndex::new(0, 0), block)]).unwrap();
///
/// assert_eq!(products.dimensionality(), Dimensionality::OneDimensional);
/// let line = products.radial_profile_at(0).unwrap().unwrap();
/// assert_eq!(line.shape(), (2, 1));
/// ```
#[derive(Clone, Debug)]
pub struct Products {
    time: f64,
    configuration: Arc<Configuration>,
    blocks: IndexMap<BlockIndex, Block>,
    version: String,
    source_fingerprint: Option<u64>,
    dimensionality: Dimensionality,
    polar_rows: PolarRows,
    radial_profile: OnceLock<Result<Vec<Block>, ProductsError>>,
}

impl Products {
    /// Assemble products from blocks in any order.
    ///
    /// # Errors
    ///
    /// - [`ProductsError::DuplicateBlock`] if an index repeats
    /// - [`ProductsError::InconsistentPolarLayout`] if blocks in one polar
    ///   row disagree on their polar zone count
    pub fn new(
        time: f64,
        configuration: impl Into<Arc<Configuration>>,
        blocks: impl IntoIterator<Item = (BlockIndex, Block)>,
    ) -> Result<Self, ProductsError> {
        let configuration = configuration.into();
        let mut map = IndexMap::new();
        for (index, block) in blocks {
            if map.insert(index, block).is_some() {
                return Err(ProductsError::DuplicateBlock { index });
            }
        }
        map.sort_keys();

        let polar_rows = PolarRows::from_blocks(&map)?;
        let dimensionality =
            Dimensionality::from_num_polar_zones(configuration.mesh().num_polar_zones);

        Ok(Self {
            time,
            configuration,
            blocks: map,
            version: env!("CARGO_PKG_VERSION").to_string(),
            source_fingerprint: None,
            dimensionality,
            polar_rows,
            radial_profile: OnceLock::new(),
        })
    }

    /// Set the producer version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Record the fingerprint of the checkpoint these products came from.
    pub fn with_source_fingerprint(mut self, fingerprint: u64) -> Self {
        self.source_fingerprint = Some(fingerprint);
        self
    }

    /// Simulation time of the snapshot.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The run configuration.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// A shared handle to the run configuration.
    pub fn shared_configuration(&self) -> Arc<Configuration> {
        Arc::clone(&self.configuration)
    }

    /// Display label of the physical setup.
    pub fn model_name(&self) -> &str {
        self.configuration.model_name()
    }

    /// Producer version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Fingerprint of the source checkpoint, if these products were
    /// derived from one.
    pub fn source_fingerprint(&self) -> Option<u64> {
        self.source_fingerprint
    }

    /// One polar slice or a full polar mesh.
    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    /// All blocks in ascending index order.
    pub fn blocks(&self) -> &IndexMap<BlockIndex, Block> {
        &self.blocks
    }

    /// The block at `index`.
    pub fn block(&self, index: BlockIndex) -> Option<&Block> {
        self.blocks.get(&index)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the snapshot holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of global polar zones covered by the blocks present.
    pub fn num_polar_zones_present(&self) -> usize {
        self.polar_rows.num_zones()
    }

    /// Map global polar zone `j` to `(polar block index, local column)`.
    pub fn locate_polar_zone(&self, j: usize) -> Option<(u32, usize)> {
        self.polar_rows.locate(j)
    }

    /// One synthetic `Nq = 1` block per global polar zone.
    ///
    /// Built on first call and reused afterwards.
    pub fn radial_profile(&self) -> Result<&[Block], ProductsError> {
        self.radial_profile
            .get_or_init(|| profile::build(&self.blocks, &self.polar_rows))
            .as_deref()
            .map_err(Clone::clone)
    }

    /// The radial profile at global polar zone `j`, or `None` if `j` is
    /// past the last zone present.
    pub fn radial_profile_at(&self, j: usize) -> Result<Option<&Block>, ProductsError> {
        Ok(self.radial_profile()?.get(j))
    }

    /// Write the products file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        let path = path.as_ref();
        let mut writer = ProductsWriter::new(BufWriter::new(File::create(path)?));
        writer.write(self)?;
        writer.into_inner().flush()?;
        debug!(path = %path.display(), blocks = self.len(), "wrote products");
        Ok(())
    }

    /// Read the products file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let products = ProductsReader::open(BufReader::new(File::open(path)?))?.read_products()?;
        debug!(path = %path.display(), blocks = products.len(), "read products");
        Ok(products)
    }
}

impl PartialEq for Products {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
            && self.configuration == other.configuration
            && self.version == other.version
            && self.source_fingerprint == other.source_fingerprint
            && self.blocks.len() == other.blocks.len()
            && self.blocks.iter().eq(other.blocks.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::Primitive;
    use nova_test_utils::{block_grid, marked_value, random_block, sample_configuration, GridSpec};
    use proptest::prelude::*;

    fn grid_products(spec: &GridSpec) -> Products {
        let config = sample_configuration(spec.num_polar_zones());
        Products::new(2.0, config, block_grid(spec).into_iter().rev()).unwrap()
    }

    #[test]
    fn blocks_iterate_in_index_order() {
        let products = grid_products(&GridSpec {
            radial_blocks: -2..2,
            ..GridSpec::default()
        });
        let keys: Vec<_> = products.blocks().keys().copied().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], BlockIndex::new(-2, 0));
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let block = random_block(1, 2, 2);
        let index = BlockIndex::new(0, 0);
        let err = Products::new(
            0.0,
            sample_configuration(2),
            [(index, block.clone()), (index, block)],
        )
        .unwrap_err();
        assert_eq!(err, ProductsError::DuplicateBlock { index });
    }

    #[test]
    fn dimensionality_follows_configuration() {
        let one = Products::new(0.0, sample_configuration(1), []).unwrap();
        assert_eq!(one.dimensionality(), Dimensionality::OneDimensional);
        let two = Products::new(0.0, sample_configuration(64), []).unwrap();
        assert_eq!(two.dimensionality(), Dimensionality::TwoDimensional);
        assert!(two.radial_profile().unwrap().is_empty());
    }

    #[test]
    fn empty_products_have_empty_profile() {
        let products = Products::new(0.0, sample_configuration(1), []).unwrap();
        assert!(products.is_empty());
        assert_eq!(products.num_polar_zones_present(), 0);
        assert_eq!(products.locate_polar_zone(0), None);
        assert!(products.radial_profile().unwrap().is_empty());
        assert!(products.radial_profile_at(0).unwrap().is_none());
    }

    #[test]
    fn one_block_1d_profile_is_the_block() {
        let block = random_block(11, 5, 1);
        let products = Products::new(
            0.5,
            sample_configuration(1),
            [(BlockIndex::new(3, 0), block.clone())],
        )
        .unwrap();
        assert_eq!(products.dimensionality(), Dimensionality::OneDimensional);

        let profile = products.radial_profile().unwrap();
        assert_eq!(profile.len(), 1);
        let line = &profile[0];
        assert_eq!(line.radial_vertices(), block.radial_vertices());
        assert_eq!(line.polar_vertices(), block.polar_vertices());
        for which in Primitive::ALL {
            assert_eq!(line.primitive(which), block.primitive(which), "{which:?}");
        }
        assert!(products.radial_profile_at(1).unwrap().is_none());
    }

    #[test]
    fn profile_covers_every_polar_zone() {
        let spec = GridSpec::default();
        let products = grid_products(&spec);
        let profile = products.radial_profile().unwrap();
        assert_eq!(profile.len(), spec.num_polar_zones());
        assert_eq!(products.num_polar_zones_present(), 6);

        let total_radial = spec.radial_blocks.len() * spec.radial_zones;
        for (j, line) in profile.iter().enumerate() {
            assert_eq!(line.shape(), (total_radial, 1));
            assert_eq!(line.radial_vertices().len(), total_radial + 1);
            for i in 0..total_radial {
                assert_eq!(
                    line.comoving_mass_density()[[i, 0]],
                    marked_value(i as i64, j)
                );
            }
        }
    }

    #[test]
    fn profile_polar_edges_match_zone() {
        let spec = GridSpec::default();
        let products = grid_products(&spec);
        let (polar, column) = products.locate_polar_zone(4).unwrap();
        assert_eq!((polar, column), (1, 1));
        let source = products.block(BlockIndex::new(0, polar)).unwrap();
        let line = products.radial_profile_at(4).unwrap().unwrap();
        assert_eq!(line.polar_vertices()[0], source.polar_vertices()[column]);
        assert_eq!(line.polar_vertices()[1], source.polar_vertices()[column + 1]);
        assert!(products.radial_profile_at(6).unwrap().is_none());
    }

    #[test]
    fn profile_is_memoized() {
        let products = grid_products(&GridSpec::default());
        let first = products.radial_profile().unwrap().as_ptr();
        let second = products.radial_profile().unwrap().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn products_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Products>();
    }

    #[test]
    fn concurrent_profile_readers_agree() {
        let products = grid_products(&GridSpec::default());
        let lengths: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| products.radial_profile().unwrap().len()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(lengths.iter().all(|&n| n == 6));
    }

    #[test]
    fn save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prods.0001.nova");
        let products = grid_products(&GridSpec::default()).with_source_fingerprint(42);
        products.save(&path).unwrap();
        let back = Products::open(&path).unwrap();
        assert_eq!(back, products);
        assert_eq!(back.source_fingerprint(), Some(42));
    }

    proptest! {
        #[test]
        fn insertion_order_never_changes_iteration_order(
            order in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle(),
        ) {
            let spec = GridSpec {
                radial_blocks: -1..2,
                ..GridSpec::default()
            };
            let grid = block_grid(&spec);
            let shuffled: Vec<_> = order.iter().map(|&k| grid[k].clone()).collect();
            let products =
                Products::new(1.0, sample_configuration(spec.num_polar_zones()), shuffled)
                    .unwrap();
            let keys: Vec<_> = products.blocks().keys().copied().collect();
            let expected: Vec<_> = grid.iter().map(|(index, _)| *index).collect();
            prop_assert_eq!(keys, expected);
        }
    }
}
