//! A rectangular patch of the polar mesh with its primitive variables.

use ndarray::{Array1, Array2};

use crate::error::{BlockError, ShapeMismatchError};

/// The five primitive fluid arrays a [`Block`] carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Rest-frame mass density (g/cm³).
    ComovingMassDensity,
    /// Gas pressure, in units of mass density times c².
    GasPressure,
    /// Radial component of the four-velocity, `γβ_r`.
    RadialFourVelocity,
    /// Polar component of the four-velocity, `γβ_θ`.
    PolarFourVelocity,
    /// Passive scalar concentration.
    Scalar,
}

impl Primitive {
    /// Every primitive, in storage order.
    pub const ALL: [Primitive; 5] = [
        Primitive::ComovingMassDensity,
        Primitive::GasPressure,
        Primitive::RadialFourVelocity,
        Primitive::PolarFourVelocity,
        Primitive::Scalar,
    ];

    /// Array name as it appears in products files and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::ComovingMassDensity => "comoving_mass_density",
            Self::GasPressure => "gas_pressure",
            Self::RadialFourVelocity => "radial_four_velocity",
            Self::PolarFourVelocity => "polar_four_velocity",
            Self::Scalar => "scalar",
        }
    }
}

/// Whether a snapshot is a single polar slice or a full polar mesh.
///
/// Fixed when the snapshot is built, from `mesh.num_polar_zones`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    /// One polar zone: a radial line.
    OneDimensional,
    /// More than one polar zone.
    TwoDimensional,
}

impl Dimensionality {
    /// Classify from the configured polar zone count.
    pub fn from_num_polar_zones(num_polar_zones: usize) -> Self {
        if num_polar_zones == 1 {
            Self::OneDimensional
        } else {
            Self::TwoDimensional
        }
    }
}

/// Primitive variables on one `(Nr, Nq)` patch of the polar mesh.
///
/// The vertex arrays have `Nr + 1` and `Nq + 1` entries; every primitive
/// array has shape `(Nr, Nq)`. The shape relation is checked by
/// [`BlockBuilder::build`]; vertex monotonicity is the producer's
/// guarantee.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    radial_vertices: Array1<f64>,
    polar_vertices: Array1<f64>,
    primitives: [Array2<f64>; 5],
}

impl Block {
    /// Start building a block over the given vertices.
    pub fn builder(radial_vertices: Array1<f64>, polar_vertices: Array1<f64>) -> BlockBuilder {
        BlockBuilder::new(radial_vertices, polar_vertices)
    }

    /// Radial cell edges (cm), length `Nr + 1`.
    pub fn radial_vertices(&self) -> &Array1<f64> {
        &self.radial_vertices
    }

    /// Polar cell edges (radians, within `[0, π]`), length `Nq + 1`.
    pub fn polar_vertices(&self) -> &Array1<f64> {
        &self.polar_vertices
    }

    /// `(Nr, Nq)`, the shape of every primitive array.
    pub fn shape(&self) -> (usize, usize) {
        (
            self.radial_vertices.len() - 1,
            self.polar_vertices.len() - 1,
        )
    }

    /// Number of radial zones.
    pub fn num_radial_zones(&self) -> usize {
        self.shape().0
    }

    /// Number of polar zones.
    pub fn num_polar_zones(&self) -> usize {
        self.shape().1
    }

    /// The array holding one primitive variable.
    pub fn primitive(&self, which: Primitive) -> &Array2<f64> {
        &self.primitives[which as usize]
    }

    /// Rest-frame mass density.
    pub fn comoving_mass_density(&self) -> &Array2<f64> {
        self.primitive(Primitive::ComovingMassDensity)
    }

    /// Gas pressure.
    pub fn gas_pressure(&self) -> &Array2<f64> {
        self.primitive(Primitive::GasPressure)
    }

    /// Radial four-velocity.
    pub fn radial_four_velocity(&self) -> &Array2<f64> {
        self.primitive(Primitive::RadialFourVelocity)
    }

    /// Polar four-velocity.
    pub fn polar_four_velocity(&self) -> &Array2<f64> {
        self.primitive(Primitive::PolarFourVelocity)
    }

    /// Passive scalar concentration.
    pub fn scalar(&self) -> &Array2<f64> {
        self.primitive(Primitive::Scalar)
    }
}

/// Builder for [`Block`].
///
/// All five primitive arrays must be supplied; there are no defaults.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use nova_core::{Block, BlockError};
///
/// let builder = Block::builder(array![1.0e18, 1.1e18], array![0.0, std::f64::consts::FRAC_PI_2])
///     .comoving_mass_density(array![[1.0e-20]])
///     .gas_pressure(array![[1.0e-23]])
///     .radial_four_velocity(array![[0.0]]);
///
/// let err = builder.clone().build().unwrap_err();
/// assert_eq!(err, BlockError::MissingPrimitive { array: "polar_four_velocity" });
///
/// let block = builder
///     .polar_four_velocity(array![[0.0]])
///     .scalar(array![[0.0]])
///     .build()
///     .unwrap();
/// assert_eq!(block.shape(), (1, 1));
/// ```
#[derive(Clone, Debug)]
pub struct BlockBuilder {
    radial_vertices: Array1<f64>,
    polar_vertices: Array1<f64>,
    primitives: [Option<Array2<f64>>; 5],
}

impl BlockBuilder {
    /// Create a builder over the given vertices.
    pub fn new(radial_vertices: Array1<f64>, polar_vertices: Array1<f64>) -> Self {
        Self {
            radial_vertices,
            polar_vertices,
            primitives: Default::default(),
        }
    }

    /// Set one primitive array.
    pub fn primitive(mut self, which: Primitive, values: Array2<f64>) -> Self {
        self.primitives[which as usize] = Some(values);
        self
    }

    /// Set the rest-frame mass density.
    pub fn comoving_mass_density(self, values: Array2<f64>) -> Self {
        self.primitive(Primitive::ComovingMassDensity, values)
    }

    /// Set the gas pressure.
    pub fn gas_pressure(self, values: Array2<f64>) -> Self {
        self.primitive(Primitive::GasPressure, values)
    }

    /// Set the radial four-velocity.
    pub fn radial_four_velocity(self, values: Array2<f64>) -> Self {
        self.primitive(Primitive::RadialFourVelocity, values)
    }

    /// Set the polar four-velocity.
    pub fn polar_four_velocity(self, values: Array2<f64>) -> Self {
        self.primitive(Primitive::PolarFourVelocity, values)
    }

    /// Set the passive scalar concentration.
    pub fn scalar(self, values: Array2<f64>) -> Self {
        self.primitive(Primitive::Scalar, values)
    }

    /// Check shapes and produce the block.
    ///
    /// # Errors
    ///
    /// - [`BlockError::Shape`] if either vertex array is empty or a
    ///   primitive array is not `(Nr, Nq)`
    /// - [`BlockError::MissingPrimitive`] if a primitive array was never
    ///   supplied
    pub fn build(self) -> Result<Block, BlockError> {
        let nr = vertex_count_to_zones("radial_vertices", self.radial_vertices.len())?;
        let nq = vertex_count_to_zones("polar_vertices", self.polar_vertices.len())?;

        let [rho, pre, ur, uq, scalar] = self.primitives;
        let check = |which: Primitive,
                     supplied: Option<Array2<f64>>|
         -> Result<Array2<f64>, BlockError> {
            let values = supplied.ok_or(BlockError::MissingPrimitive {
                array: which.name(),
            })?;
            if values.dim() != (nr, nq) {
                return Err(BlockError::Shape(ShapeMismatchError {
                    array: which.name(),
                    expected: (nr, nq),
                    actual: values.dim(),
                }));
            }
            Ok(values)
        };

        Ok(Block {
            primitives: [
                check(Primitive::ComovingMassDensity, rho)?,
                check(Primitive::GasPressure, pre)?,
                check(Primitive::RadialFourVelocity, ur)?,
                check(Primitive::PolarFourVelocity, uq)?,
                check(Primitive::Scalar, scalar)?,
            ],
            radial_vertices: self.radial_vertices,
            polar_vertices: self.polar_vertices,
        })
    }
}

fn vertex_count_to_zones(array: &'static str, len: usize) -> Result<usize, ShapeMismatchError> {
    len.checked_sub(1).ok_or(ShapeMismatchError {
        array,
        expected: (1, 1),
        actual: (0, 1),
    })
}
