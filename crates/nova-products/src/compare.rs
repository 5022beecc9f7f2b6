//! Bit-exact products comparison.
//!
//! Every block and array is compared bit for bit; a matching
//! [`products_hash`](crate::products_hash) is never taken as proof of
//! equality. Used to check that products loaded from a cache equal
//! products freshly derived from the checkpoint.

use ndarray::{ArrayBase, Data, Dimension};
use nova_core::{Block, BlockIndex, Primitive};

use crate::products::Products;

/// How one array (or block) differs.
#[derive(Clone, Debug, PartialEq)]
pub enum DivergenceKind {
    /// The block is in the expected products only.
    Missing,
    /// The block is in the actual products only.
    Unexpected,
    /// The array shapes differ.
    Shape {
        /// Shape in the expected products.
        expected: Vec<usize>,
        /// Shape in the actual products.
        actual: Vec<usize>,
    },
    /// The first cell (in logical order) whose bits differ.
    Value {
        /// Flat row-major cell index.
        cell: usize,
        /// Value in the expected products.
        expected: f64,
        /// Value in the actual products.
        actual: f64,
    },
}

/// A single divergence, located by block and array name.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockDivergence {
    /// The block that differs.
    pub block: BlockIndex,
    /// Array name, or `None` when the whole block is missing or extra.
    pub array: Option<&'static str>,
    /// What differs.
    pub kind: DivergenceKind,
}

/// All divergences between two products.
#[derive(Clone, Debug, PartialEq)]
pub struct DivergenceReport {
    /// `(expected, actual)` times when they differ.
    pub time: Option<(f64, f64)>,
    /// Block- and array-level divergences, in block order.
    pub divergences: Vec<BlockDivergence>,
}

/// Compare two products bit for bit.
///
/// Returns `None` when the times and every block array agree bit for
/// bit. Otherwise reports, for every block and array that differs, the
/// first differing cell.
pub fn compare_products(expected: &Products, actual: &Products) -> Option<DivergenceReport> {
    let time = (expected.time().to_bits() != actual.time().to_bits())
        .then_some((expected.time(), actual.time()));

    let mut divergences = Vec::new();
    for (index, a) in expected.blocks() {
        match actual.block(*index) {
            Some(b) => compare_block(*index, a, b, &mut divergences),
            None => divergences.push(BlockDivergence {
                block: *index,
                array: None,
                kind: DivergenceKind::Missing,
            }),
        }
    }
    for index in actual.blocks().keys() {
        if expected.block(*index).is_none() {
            divergences.push(BlockDivergence {
                block: *index,
                array: None,
                kind: DivergenceKind::Unexpected,
            });
        }
    }

    if time.is_none() && divergences.is_empty() {
        return None;
    }
    Some(DivergenceReport { time, divergences })
}

fn compare_block(index: BlockIndex, a: &Block, b: &Block, out: &mut Vec<BlockDivergence>) {
    let mut push = |array: &'static str, kind: Option<DivergenceKind>| {
        if let Some(kind) = kind {
            out.push(BlockDivergence {
                block: index,
                array: Some(array),
                kind,
            });
        }
    };
    push(
        "radial_vertices",
        compare_array(a.radial_vertices(), b.radial_vertices()),
    );
    push(
        "polar_vertices",
        compare_array(a.polar_vertices(), b.polar_vertices()),
    );
    for which in Primitive::ALL {
        push(
            which.name(),
            compare_array(a.primitive(which), b.primitive(which)),
        );
    }
}

fn compare_array<S, D>(a: &ArrayBase<S, D>, b: &ArrayBase<S, D>) -> Option<DivergenceKind>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if a.shape() != b.shape() {
        return Some(DivergenceKind::Shape {
            expected: a.shape().to_vec(),
            actual: b.shape().to_vec(),
        });
    }
    a.iter()
        .zip(b.iter())
        .enumerate()
        .find(|(_, (x, y))| x.to_bits() != y.to_bits())
        .map(|(cell, (&expected, &actual))| DivergenceKind::Value {
            cell,
            expected,
            actual,
        })
}
