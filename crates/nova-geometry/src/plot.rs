//! Rendering hand-off.
//!
//! [`PlotData`] is everything a renderer needs and nothing it has to
//! compute: vertex grids or a radial line, the transformed field values,
//! a color range, the simulation time, and the setup label.

use std::time::Instant;

use ndarray::{s, Array1, Array2};
use nova_core::{BlockIndex, Dimensionality};
use nova_fields::Field;
use nova_products::{Products, ProductsError};
use tracing::debug;

use crate::field::{block_field, FieldTransform};
use crate::vertices::{block_vertices, BlockVertices};

/// One block's quads: `(Nr + 1, Nq + 1)` vertices and `(Nr, Nq)` values.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshPatch {
    /// Source block.
    pub index: BlockIndex,
    /// Cartesian vertices.
    pub vertices: BlockVertices,
    /// Transformed field values.
    pub values: Array2<f64>,
}

/// What is drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum PlotGeometry {
    /// Pseudocolor patches over the `(x, z)` plane, in snapshot order.
    Mesh(Vec<MeshPatch>),
    /// A line of `values` against `radii` (cell inner edges).
    Profile {
        /// Inner-edge radius of each cell.
        radii: Array1<f64>,
        /// Transformed field values.
        values: Array1<f64>,
    },
}

/// Renderable data for one field of one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotData {
    /// Simulation time.
    pub time: f64,
    /// Setup name from the configuration.
    pub model: String,
    /// The field drawn.
    pub field: Field,
    /// Transform applied to the values.
    pub transform: FieldTransform,
    /// `(min, max)` over finite values, or `None` if there are none.
    pub range: Option<(f64, f64)>,
    /// Patches or profile.
    pub geometry: PlotGeometry,
}

impl PlotData {
    /// Assemble plot data according to the snapshot's dimensionality.
    ///
    /// Two-dimensional snapshots yield one [`MeshPatch`] per block. One-
    /// dimensional snapshots yield the radial profile at polar zone 0
    /// (empty if the snapshot has no blocks).
    pub fn assemble(
        products: &Products,
        field: Field,
        transform: FieldTransform,
    ) -> Result<Self, ProductsError> {
        let start = Instant::now();
        let geometry = match products.dimensionality() {
            Dimensionality::TwoDimensional => PlotGeometry::Mesh(
                products
                    .blocks()
                    .iter()
                    .map(|(index, block)| MeshPatch {
                        index: *index,
                        vertices: block_vertices(block),
                        values: block_field(block, field, transform),
                    })
                    .collect(),
            ),
            Dimensionality::OneDimensional => match products.radial_profile_at(0)? {
                Some(line) => {
                    let nr = line.num_radial_zones();
                    PlotGeometry::Profile {
                        radii: line.radial_vertices().slice(s![..nr]).to_owned(),
                        values: block_field(line, field, transform).column(0).to_owned(),
                    }
                }
                None => PlotGeometry::Profile {
                    radii: Array1::zeros(0),
                    values: Array1::zeros(0),
                },
            },
        };

        let range = finite_range(&geometry);
        debug!(
            field = %field,
            blocks = products.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "assembled plot data"
        );

        Ok(Self {
            time: products.time(),
            model: products.model_name().to_string(),
            field,
            transform,
            range,
            geometry,
        })
    }

    /// Colorbar or axis label, e.g. `log10(rho) [g/cm^3]`.
    pub fn variable_label(&self) -> String {
        self.transform.label(self.field)
    }

    /// Figure title with the setup name and time.
    pub fn title(&self) -> String {
        format!(
            "Setup: {}   {}   t = {:.4}s",
            self.model.replace('_', "-"),
            self.variable_label(),
            self.time
        )
    }
}

fn finite_range(geometry: &PlotGeometry) -> Option<(f64, f64)> {
    let values: Box<dyn Iterator<Item = f64> + '_> = match geometry {
        PlotGeometry::Mesh(patches) => {
            Box::new(patches.iter().flat_map(|p| p.values.iter().copied()))
        }
        PlotGeometry::Profile { values, .. } => Box::new(values.iter().copied()),
    };
    values
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
