//! Geometry and profile assembly for nova products.
//!
//! Turns per-block arrays into structures a renderer can draw:
//!
//! - [`block_vertices`] / [`mesh_vertices`]: Cartesian `(x, z)` vertex
//!   grids of the polar mesh (x along the equator, z along the pole)
//! - [`block_field`] / [`mesh_field`]: derived fields with an optional
//!   [`FieldTransform`], keyed by block index
//! - [`PlotData`]: the rendering hand-off, either a set of mesh patches
//!   with a shared color range or a radial line profile

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod field;
pub mod plot;
pub mod vertices;

pub use field::{block_field, mesh_field, FieldTransform};
pub use plot::{MeshPatch, PlotData, PlotGeometry};
pub use vertices::{block_vertices, mesh_vertices, BlockVertices};
