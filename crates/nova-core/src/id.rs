//! Block identifiers.

use std::fmt;

/// Location of a block in the global block grid.
///
/// The radial index is signed: when the inner boundary is excised the
/// innermost blocks are dropped and new ones appended at the outer edge,
/// so indexes drift over the course of a run and may go negative relative
/// to the initial grid. Ordering is by radial index, then polar index,
/// which is the iteration order of blocks in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockIndex {
    /// Position along the radial axis of the block grid.
    pub radial: i32,
    /// Position along the polar axis of the block grid.
    pub polar: u32,
}

impl BlockIndex {
    /// Create a block index from its radial and polar components.
    pub const fn new(radial: i32, polar: u32) -> Self {
        Self { radial, polar }
    }
}

impl fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.radial, self.polar)
    }
}

impl From<(i32, u32)> for BlockIndex {
    fn from((radial, polar): (i32, u32)) -> Self {
        Self { radial, polar }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ordering_is_radial_then_polar() {
        let mut keys = vec![
            BlockIndex::new(1, 0),
            BlockIndex::new(0, 1),
            BlockIndex::new(-1, 3),
            BlockIndex::new(0, 0),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                BlockIndex::new(-1, 3),
                BlockIndex::new(0, 0),
                BlockIndex::new(0, 1),
                BlockIndex::new(1, 0),
            ]
        );
    }

    #[test]
    fn display_shows_pair() {
        assert_eq!(BlockIndex::new(-2, 5).to_string(), "(-2, 5)");
    }

    proptest! {
        #[test]
        fn ordering_matches_component_tuples(
            pairs in proptest::collection::vec((any::<i32>(), any::<u32>()), 0..32),
        ) {
            let mut keys: Vec<BlockIndex> = pairs.iter().copied().map(BlockIndex::from).collect();
            let mut tuples = pairs;
            keys.sort();
            tuples.sort();
            let flattened: Vec<(i32, u32)> = keys.iter().map(|k| (k.radial, k.polar)).collect();
            prop_assert_eq!(flattened, tuples);
        }
    }
}
