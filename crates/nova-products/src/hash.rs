//! FNV-1a hashing of products and source files.
//!
//! These hashes are not cryptographically secure. They identify the
//! checkpoint a products file was derived from and give a fast equality
//! check before a full per-array comparison.

use std::io::{self, Read};

use ndarray::{ArrayBase, Data, Dimension};
use nova_core::Primitive;

use crate::products::Products;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

fn fnv1a_array<S, D>(mut hash: u64, a: &ArrayBase<S, D>) -> u64
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    for &d in a.shape() {
        hash = fnv1a_u64(hash, d as u64);
    }
    for v in a.iter() {
        hash = fnv1a_u64(hash, v.to_bits());
    }
    hash
}

/// Hash the time and every array of every block, in iteration order.
///
/// Block indices and array shapes are folded in so that moving data
/// between blocks or reshaping changes the hash. Configuration and
/// version metadata are not included.
pub fn products_hash(products: &Products) -> u64 {
    let mut hash = fnv1a_u64(FNV_OFFSET, products.time().to_bits());
    for (index, block) in products.blocks() {
        hash = fnv1a_bytes(hash, &index.radial.to_le_bytes());
        hash = fnv1a_bytes(hash, &index.polar.to_le_bytes());
        hash = fnv1a_array(hash, block.radial_vertices());
        hash = fnv1a_array(hash, block.polar_vertices());
        for which in Primitive::ALL {
            hash = fnv1a_array(hash, block.primitive(which));
        }
    }
    hash
}

/// FNV-1a over raw bytes.
pub fn fingerprint_bytes(bytes: &[u8]) -> u64 {
    fnv1a_bytes(FNV_OFFSET, bytes)
}

/// FNV-1a over everything `reader` yields; equals [`fingerprint_bytes`]
/// of the same content.
pub fn fingerprint_reader(mut reader: impl Read) -> io::Result<u64> {
    let mut hash = FNV_OFFSET;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(hash),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hash = fnv1a_bytes(hash, &buf[..n]);
    }
}
