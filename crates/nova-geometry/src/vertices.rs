//! Cartesian vertices of polar mesh blocks.

use indexmap::IndexMap;
use ndarray::Array2;
use nova_core::{Block, BlockIndex};
use nova_products::Products;

/// Cartesian coordinates of a block's vertices, each `(Nr + 1, Nq + 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockVertices {
    /// `R sin Θ`, the cylindrical radius.
    pub x: Array2<f64>,
    /// `R cos Θ`, the height along the polar axis.
    pub z: Array2<f64>,
}

/// Vertex coordinates over the outer product of a block's radial and
/// polar vertices.
pub fn block_vertices(block: &Block) -> BlockVertices {
    let r = block.radial_vertices();
    let q = block.polar_vertices();
    let shape = (r.len(), q.len());
    BlockVertices {
        x: Array2::from_shape_fn(shape, |(i, j)| r[i] * q[j].sin()),
        z: Array2::from_shape_fn(shape, |(i, j)| r[i] * q[j].cos()),
    }
}

/// [`block_vertices`] for every block, in snapshot order.
pub fn mesh_vertices(products: &Products) -> IndexMap<BlockIndex, BlockVertices> {
    products
        .blocks()
        .iter()
        .map(|(index, block)| (*index, block_vertices(block)))
        .collect()
}
