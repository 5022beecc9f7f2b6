//! Checkpoints: run state in conserved variables.
//!
//! A checkpoint stores, per block, the conserved *totals* of every cell
//! (density times cell volume) plus the passive scalar mass. Converting to
//! [`Products`] divides by the cell volume and recovers primitives, which
//! is the expensive step the products cache exists to avoid.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use ndarray::{Array1, Array2, Zip};
use nova_core::physics::cell_volume;
use nova_core::{Block, BlockIndex, Configuration, ShapeMismatchError};
use nova_products::codec::{Decoder, Encoder};
use nova_products::{CodecError, FileKind, Products};
use tracing::debug;

use crate::error::{LoadError, RecoveryError};
use crate::loader::Run;
use crate::srhd::{Conserved, Primitive};

/// Names of the per-cell arrays, in storage order.
const ARRAY_NAMES: [&str; 5] = [
    "lab_frame_mass",
    "radial_momentum",
    "polar_momentum",
    "energy",
    "scalar_mass",
];

/// Conserved totals of one block.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockState {
    radial_vertices: Array1<f64>,
    polar_vertices: Array1<f64>,
    /// `lab_frame_mass`, `radial_momentum`, `polar_momentum`, `energy`,
    /// `scalar_mass`, each `(Nr, Nq)`.
    arrays: [Array2<f64>; 5],
}

impl BlockState {
    /// Build block state from vertices and the five per-cell totals
    /// (`lab_frame_mass`, `radial_momentum`, `polar_momentum`, `energy`,
    /// `scalar_mass`).
    ///
    /// # Errors
    ///
    /// Returns [`ShapeMismatchError`] if a vertex array is empty or an
    /// array is not `(Nr, Nq)`.
    pub fn new(
        radial_vertices: Array1<f64>,
        polar_vertices: Array1<f64>,
        arrays: [Array2<f64>; 5],
    ) -> Result<Self, ShapeMismatchError> {
        let zones = |array: &'static str, len: usize| {
            len.checked_sub(1).ok_or(ShapeMismatchError {
                array,
                expected: (1, 1),
                actual: (0, 1),
            })
        };
        let expected = (
            zones("radial_vertices", radial_vertices.len())?,
            zones("polar_vertices", polar_vertices.len())?,
        );
        for (&name, array) in ARRAY_NAMES.iter().zip(&arrays) {
            if array.dim() != expected {
                return Err(ShapeMismatchError {
                    array: name,
                    expected,
                    actual: array.dim(),
                });
            }
        }
        Ok(Self {
            radial_vertices,
            polar_vertices,
            arrays,
        })
    }

    /// Conserved totals for a block of primitives.
    pub fn from_block(block: &Block, gamma_law_index: f64) -> Self {
        let volumes = cell_volumes(block.radial_vertices(), block.polar_vertices());
        let mut totals: [Array2<f64>; 4] = std::array::from_fn(|_| Array2::zeros(block.shape()));

        for ((i, j), &volume) in volumes.indexed_iter() {
            let primitive = Primitive {
                mass_density: block.comoving_mass_density()[[i, j]],
                radial_four_velocity: block.radial_four_velocity()[[i, j]],
                polar_four_velocity: block.polar_four_velocity()[[i, j]],
                gas_pressure: block.gas_pressure()[[i, j]],
            };
            let u = primitive.to_conserved(gamma_law_index).scaled(volume);
            totals[0][[i, j]] = u.lab_frame_density;
            totals[1][[i, j]] = u.radial_momentum;
            totals[2][[i, j]] = u.polar_momentum;
            totals[3][[i, j]] = u.energy_density;
        }
        let scalar_mass = block.scalar() * &totals[0];
        let [lab_frame_mass, radial_momentum, polar_momentum, energy] = totals;

        Self {
            radial_vertices: block.radial_vertices().clone(),
            polar_vertices: block.polar_vertices().clone(),
            arrays: [
                lab_frame_mass,
                radial_momentum,
                polar_momentum,
                energy,
                scalar_mass,
            ],
        }
    }

    /// Recover the block of primitives.
    ///
    /// The scalar concentration is `scalar_mass / lab_frame_mass`.
    pub fn to_block(&self, index: BlockIndex, gamma_law_index: f64) -> Result<Block, LoadError> {
        let volumes = cell_volumes(&self.radial_vertices, &self.polar_vertices);
        let shape = volumes.dim();
        let mut rho = Array2::zeros(shape);
        let mut pre = Array2::zeros(shape);
        let mut ur = Array2::zeros(shape);
        let mut uq = Array2::zeros(shape);

        for ((i, j), &volume) in volumes.indexed_iter() {
            let u = Conserved {
                lab_frame_density: self.lab_frame_mass()[[i, j]],
                radial_momentum: self.radial_momentum()[[i, j]],
                polar_momentum: self.polar_momentum()[[i, j]],
                energy_density: self.energy()[[i, j]],
            }
            .scaled(1.0 / volume);
            let p = u
                .to_primitive(gamma_law_index)
                .map_err(|failure| RecoveryError {
                    block: index,
                    zone: (i, j),
                    failure,
                })?;
            rho[[i, j]] = p.mass_density;
            pre[[i, j]] = p.gas_pressure;
            ur[[i, j]] = p.radial_four_velocity;
            uq[[i, j]] = p.polar_four_velocity;
        }
        let scalar = Zip::from(self.scalar_mass())
            .and(self.lab_frame_mass())
            .map_collect(|&s, &m| s / m);

        Ok(
            Block::builder(self.radial_vertices.clone(), self.polar_vertices.clone())
                .comoving_mass_density(rho)
                .gas_pressure(pre)
                .radial_four_velocity(ur)
                .polar_four_velocity(uq)
                .scalar(scalar)
                .build()?,
        )
    }

    /// Radial cell edges.
    pub fn radial_vertices(&self) -> &Array1<f64> {
        &self.radial_vertices
    }

    /// Polar cell edges.
    pub fn polar_vertices(&self) -> &Array1<f64> {
        &self.polar_vertices
    }

    /// Total lab-frame mass per cell.
    pub fn lab_frame_mass(&self) -> &Array2<f64> {
        &self.arrays[0]
    }

    /// Total radial momentum per cell.
    pub fn radial_momentum(&self) -> &Array2<f64> {
        &self.arrays[1]
    }

    /// Total polar momentum per cell.
    pub fn polar_momentum(&self) -> &Array2<f64> {
        &self.arrays[2]
    }

    /// Total energy (without rest mass) per cell.
    pub fn energy(&self) -> &Array2<f64> {
        &self.arrays[3]
    }

    /// Total passive scalar mass per cell.
    pub fn scalar_mass(&self) -> &Array2<f64> {
        &self.arrays[4]
    }
}

fn cell_volumes(r: &Array1<f64>, q: &Array1<f64>) -> Array2<f64> {
    let shape = (r.len().saturating_sub(1), q.len().saturating_sub(1));
    Array2::from_shape_fn(shape, |(i, j)| cell_volume(r[i], r[i + 1], q[j], q[j + 1]))
}

/// A run's conserved state at one time.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    time: f64,
    iteration: u64,
    configuration: Arc<Configuration>,
    version: String,
    blocks: IndexMap<BlockIndex, BlockState>,
}

impl Checkpoint {
    /// Assemble a checkpoint. Blocks are stored in ascending index order;
    /// a repeated index keeps the last state supplied.
    pub fn new(
        time: f64,
        iteration: u64,
        configuration: impl Into<Arc<Configuration>>,
        blocks: impl IntoIterator<Item = (BlockIndex, BlockState)>,
    ) -> Self {
        let mut blocks: IndexMap<_, _> = blocks.into_iter().collect();
        blocks.sort_keys();
        Self {
            time,
            iteration,
            configuration: configuration.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            blocks,
        }
    }

    /// Conserved state equivalent to `products`, using the products'
    /// configured gamma-law index.
    pub fn from_products(products: &Products, iteration: u64) -> Self {
        let gamma = products.configuration().hydro().gamma_law_index;
        let blocks = products
            .blocks()
            .iter()
            .map(|(index, block)| (*index, BlockState::from_block(block, gamma)));
        Self::new(
            products.time(),
            iteration,
            products.shared_configuration(),
            blocks,
        )
        .with_version(products.version())
    }

    /// Set the producer version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Engine iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// The run configuration.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Producer version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Per-block state, in ascending index order.
    pub fn blocks(&self) -> &IndexMap<BlockIndex, BlockState> {
        &self.blocks
    }

    /// Encode the checkpoint format.
    pub fn write_to(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        let mut e = Encoder::new(w);
        e.preamble(FileKind::Checkpoint)?;
        e.str(&self.version)?;
        e.f64(self.time)?;
        e.u64(self.iteration)?;
        e.configuration(&self.configuration)?;
        e.count(self.blocks.len())?;
        for (index, state) in &self.blocks {
            e.block_index(*index)?;
            e.array1(&state.radial_vertices)?;
            e.array1(&state.polar_vertices)?;
            for array in &state.arrays {
                e.array2(array)?;
            }
        }
        Ok(())
    }

    /// Decode the checkpoint format.
    pub fn read_from(r: &mut dyn Read) -> Result<Self, CodecError> {
        let mut d = Decoder::new(r);
        d.preamble(FileKind::Checkpoint)?;
        let version = d.str()?;
        let time = d.f64()?;
        let iteration = d.u64()?;
        let configuration = d.configuration()?;

        let count = d.count()?;
        let mut blocks = IndexMap::new();
        for _ in 0..count {
            let index = d.block_index()?;
            let radial_vertices = d.array1()?;
            let polar_vertices = d.array1()?;
            let arrays = [d.array2()?, d.array2()?, d.array2()?, d.array2()?, d.array2()?];
            let state = BlockState::new(radial_vertices, polar_vertices, arrays)?;
            if blocks.insert(index, state).is_some() {
                return Err(CodecError::Malformed {
                    detail: format!("duplicate block {index}"),
                });
            }
        }
        Ok(Self::new(time, iteration, configuration, blocks).with_version(version))
    }

    /// Write the checkpoint file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)?;
        w.flush()?;
        debug!(path = %path.display(), blocks = self.blocks.len(), "wrote checkpoint");
        Ok(())
    }

    /// Read the checkpoint file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let checkpoint = Self::read_from(&mut BufReader::new(File::open(path)?))?;
        debug!(
            path = %path.display(),
            blocks = checkpoint.blocks.len(),
            iteration = checkpoint.iteration,
            "read checkpoint"
        );
        Ok(checkpoint)
    }
}

impl Run for Checkpoint {
    fn make_products(&self) -> Result<Products, LoadError> {
        let gamma = self.configuration.hydro().gamma_law_index;
        let blocks = self
            .blocks
            .iter()
            .map(|(index, state)| Ok((*index, state.to_block(*index, gamma)?)))
            .collect::<Result<Vec<_>, LoadError>>()?;
        let products = Products::new(self.time, Arc::clone(&self.configuration), blocks)?
            .with_version(self.version.clone());
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nova_core::Primitive as Field;
    use nova_test_utils::{block_grid, random_block, sample_configuration, GridSpec};

    fn sample_products() -> Products {
        let blocks = (0..4).map(|k| (BlockIndex::new(k - 1, 0), random_block(k as u64, 5, 3)));
        Products::new(4.0, sample_configuration(3), blocks).unwrap()
    }

    #[test]
    fn totals_scale_with_cell_volume() {
        let block = nova_test_utils::uniform_block(
            (1.0, 2.0, 1),
            (0.0, std::f64::consts::PI, 1),
            3.0,
            0.0,
        );
        let state = BlockState::from_block(&block, 4.0 / 3.0);
        let volume = 4.0 * std::f64::consts::PI / 3.0 * 7.0;
        assert_relative_eq!(state.lab_frame_mass()[[0, 0]], 3.0 * volume, max_relative = 1e-12);
        assert_eq!(state.radial_momentum()[[0, 0]], 0.0);
    }

    #[test]
    fn make_products_recovers_primitives() {
        let products = sample_products();
        let recovered = Checkpoint::from_products(&products, 100)
            .make_products()
            .unwrap();

        assert_eq!(recovered.time(), products.time());
        assert_eq!(recovered.version(), products.version());
        for ((ia, a), (ib, b)) in products.blocks().iter().zip(recovered.blocks()) {
            assert_eq!(ia, ib);
            assert_eq!(a.radial_vertices(), b.radial_vertices());
            for which in Field::ALL {
                for (x, y) in a.primitive(which).iter().zip(b.primitive(which)) {
                    assert_relative_eq!(*x, *y, max_relative = 1e-9, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn recovery_failure_names_block_and_zone() {
        let products = sample_products();
        let mut checkpoint = Checkpoint::from_products(&products, 0);
        let index = BlockIndex::new(1, 0);
        let state = checkpoint.blocks.get_mut(&index).unwrap();
        state.arrays[0][[2, 1]] = -1.0;

        let err = match checkpoint.make_products().unwrap_err() {
            LoadError::Recovery(err) => err,
            other => panic!("expected a recovery error, got {other}"),
        };
        assert_eq!(err.block, index);
        assert_eq!(err.zone, (2, 1));
    }

    #[test]
    fn codec_roundtrip_is_exact() {
        let checkpoint = Checkpoint::from_products(&sample_products(), 12);
        let mut buf = Vec::new();
        checkpoint.write_to(&mut buf).unwrap();
        let back = Checkpoint::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(back, checkpoint);
        assert_eq!(back.iteration(), 12);
    }

    #[test]
    fn products_file_is_not_a_checkpoint() {
        let mut buf = Vec::new();
        nova_products::ProductsWriter::new(&mut buf)
            .write(&sample_products())
            .unwrap();
        let err = Checkpoint::read_from(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, CodecError::WrongKind { .. }), "{err}");
    }

    #[test]
    fn mismatched_state_is_rejected() {
        let arrays = [
            Array2::zeros((2, 2)),
            Array2::zeros((2, 2)),
            Array2::zeros((2, 3)),
            Array2::zeros((2, 2)),
            Array2::zeros((2, 2)),
        ];
        let err = BlockState::new(
            Array1::linspace(1.0, 2.0, 3),
            Array1::linspace(0.0, 1.0, 3),
            arrays,
        )
        .unwrap_err();
        assert_eq!(err.array, "polar_momentum");
    }

    #[test]
    fn grid_roundtrip_keeps_profile() {
        let spec = GridSpec::default();
        let products = Products::new(
            1.0,
            sample_configuration(spec.num_polar_zones()),
            block_grid(&spec),
        )
        .unwrap();
        let recovered = Checkpoint::from_products(&products, 0)
            .make_products()
            .unwrap();
        let a = products.radial_profile_at(5).unwrap().unwrap();
        let b = recovered.radial_profile_at(5).unwrap().unwrap();
        for (x, y) in a.comoving_mass_density().iter().zip(b.comoving_mass_density()) {
            assert_relative_eq!(*x, *y, max_relative = 1e-10);
        }
    }
}
