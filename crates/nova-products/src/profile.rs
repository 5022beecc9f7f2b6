//! Radial profiles: one synthetic `Nq = 1` block per global polar zone.
//!
//! Blocks sharing a polar index form a *row*. Global polar zone `j` is
//! found by walking the rows in ascending polar index; within its row the
//! column of every block is concatenated in ascending radial order.
//! Radial extents are assumed contiguous and are not checked.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use ndarray::{array, Array1, Axis};
use nova_core::{Block, BlockIndex, Primitive};

use crate::error::ProductsError;

/// Polar zone count of every block row, ascending by polar index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PolarRows {
    rows: Vec<(u32, usize)>,
}

impl PolarRows {
    /// Collect the row layout, requiring a single polar zone count per row.
    pub(crate) fn from_blocks(blocks: &IndexMap<BlockIndex, Block>) -> Result<Self, ProductsError> {
        let mut rows: BTreeMap<u32, usize> = BTreeMap::new();
        for (index, block) in blocks {
            let found = block.num_polar_zones();
            let expected = *rows.entry(index.polar).or_insert(found);
            if expected != found {
                return Err(ProductsError::InconsistentPolarLayout {
                    index: *index,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            rows: rows.into_iter().collect(),
        })
    }

    /// Total polar zones across all rows.
    pub(crate) fn num_zones(&self) -> usize {
        self.rows.iter().map(|&(_, n)| n).sum()
    }

    /// Map global polar zone `j` to `(polar index, local column)`.
    pub(crate) fn locate(&self, mut j: usize) -> Option<(u32, usize)> {
        for &(polar, n) in &self.rows {
            if j < n {
                return Some((polar, j));
            }
            j -= n;
        }
        None
    }
}

/// Build the profile for every global polar zone.
pub(crate) fn build(
    blocks: &IndexMap<BlockIndex, Block>,
    rows: &PolarRows,
) -> Result<Vec<Block>, ProductsError> {
    let mut profile = Vec::with_capacity(rows.num_zones());
    for &(polar, num_zones) in &rows.rows {
        // `blocks` is sorted by (radial, polar), so each row comes out in radial order.
        let row: Vec<&Block> = blocks
            .iter()
            .filter(|(index, _)| index.polar == polar)
            .map(|(_, block)| block)
            .collect();
        for column in 0..num_zones {
            profile.push(column_profile(&row, column)?);
        }
    }
    Ok(profile)
}

fn column_profile(row: &[&Block], column: usize) -> Result<Block, ProductsError> {
    let mut radial_vertices = Vec::new();
    for (k, block) in row.iter().enumerate() {
        let vertices = block.radial_vertices();
        let keep = if k + 1 == row.len() {
            vertices.len()
        } else {
            vertices.len() - 1
        };
        radial_vertices.extend(vertices.iter().take(keep).copied());
    }

    let polar_vertices = match row.first() {
        Some(block) => {
            let q = block.polar_vertices();
            array![q[column], q[column + 1]]
        }
        None => Array1::zeros(0),
    };

    let mut builder = Block::builder(Array1::from(radial_vertices), polar_vertices);
    for which in Primitive::ALL {
        let values: Vec<f64> = row
            .iter()
            .flat_map(|block| block.primitive(which).column(column).to_vec())
            .collect();
        builder = builder.primitive(which, Array1::from(values).insert_axis(Axis(1)));
    }
    Ok(builder.build()?)
}
