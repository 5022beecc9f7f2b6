//! Binary encode/decode for nova data files.
//!
//! All integers and floats are little-endian. Strings are length-prefixed
//! with a `u32` byte count. Arrays are written as `u32` dimensions followed
//! by row-major `f64` data. There is no padding and no compression.

use std::fmt;
use std::io::{Read, Write};

use ndarray::{Array1, Array2};
use nova_core::{Block, BlockIndex, Configuration, Primitive};

use crate::error::CodecError;
use crate::{FORMAT_VERSION, MAGIC};

/// The kind of payload following the file preamble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Primitive-variable snapshot.
    Products,
    /// Conserved-variable run state.
    Checkpoint,
}

impl FileKind {
    /// The tag byte written after the format version.
    pub fn tag(self) -> u8 {
        match self {
            Self::Products => 1,
            Self::Checkpoint => 2,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => f.write_str("products"),
            Self::Checkpoint => f.write_str("checkpoint"),
        }
    }
}

/// Streams the nova framing into a byte sink.
///
/// Scalars are encoded straight into the sink; arrays are staged into one
/// buffer per array so each costs a single `write_all`.
pub struct Encoder<'w> {
    out: &'w mut dyn Write,
}

impl<'w> Encoder<'w> {
    /// Encode into `out`.
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self { out }
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.out.write_all(bytes)?;
        Ok(())
    }

    /// Magic, format version, and kind tag.
    pub fn preamble(&mut self, kind: FileKind) -> Result<(), CodecError> {
        self.raw(&MAGIC)?;
        self.raw(&[FORMAT_VERSION, kind.tag()])
    }

    /// A `u32` element count, rejecting counts that do not fit.
    pub fn count(&mut self, n: usize) -> Result<(), CodecError> {
        let n = u32::try_from(n).map_err(|_| CodecError::Malformed {
            detail: format!("count {n} does not fit in u32"),
        })?;
        self.raw(&n.to_le_bytes())
    }

    /// A `u64`.
    pub fn u64(&mut self, v: u64) -> Result<(), CodecError> {
        self.raw(&v.to_le_bytes())
    }

    /// An `f64`, bit for bit.
    pub fn f64(&mut self, v: f64) -> Result<(), CodecError> {
        self.raw(&v.to_le_bytes())
    }

    /// A presence byte, then the value if present.
    pub fn optional_u64(&mut self, v: Option<u64>) -> Result<(), CodecError> {
        match v {
            Some(v) => {
                self.raw(&[1])?;
                self.u64(v)
            }
            None => self.raw(&[0]),
        }
    }

    /// A byte count, then UTF-8 bytes.
    pub fn str(&mut self, s: &str) -> Result<(), CodecError> {
        self.count(s.len())?;
        self.raw(s.as_bytes())
    }

    /// The configuration as a YAML string.
    pub fn configuration(&mut self, config: &Configuration) -> Result<(), CodecError> {
        self.str(&config.to_yaml()?)
    }

    /// Radial index as `i32`, polar index as `u32`.
    pub fn block_index(&mut self, index: BlockIndex) -> Result<(), CodecError> {
        self.raw(&index.radial.to_le_bytes())?;
        self.raw(&index.polar.to_le_bytes())
    }

    /// Length, then values.
    pub fn array1(&mut self, a: &Array1<f64>) -> Result<(), CodecError> {
        self.count(a.len())?;
        self.values(a.iter())
    }

    /// Rows, columns, then values in logical row-major order.
    pub fn array2(&mut self, a: &Array2<f64>) -> Result<(), CodecError> {
        let (rows, cols) = a.dim();
        self.count(rows)?;
        self.count(cols)?;
        self.values(a.iter())
    }

    fn values<'a>(&mut self, values: impl ExactSizeIterator<Item = &'a f64>) -> Result<(), CodecError> {
        let mut staged = Vec::with_capacity(values.len() * 8);
        for v in values {
            staged.extend_from_slice(&v.to_le_bytes());
        }
        self.raw(&staged)
    }

    /// Index, vertices, then the five primitive arrays.
    pub fn block(&mut self, index: BlockIndex, block: &Block) -> Result<(), CodecError> {
        self.block_index(index)?;
        self.array1(block.radial_vertices())?;
        self.array1(block.polar_vertices())?;
        for which in Primitive::ALL {
            self.array2(block.primitive(which))?;
        }
        Ok(())
    }
}

/// Reads what [`Encoder`] writes.
///
/// Declared lengths are never trusted for allocation: variable-size
/// payloads are read through a bounded `take` and rejected when short.
pub struct Decoder<'r> {
    input: &'r mut dyn Read,
}

impl<'r> Decoder<'r> {
    /// Decode from `input`.
    pub fn new(input: &'r mut dyn Read) -> Self {
        Self { input }
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        self.input.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn sized(&mut self, len: usize, what: &str) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        Read::take(&mut *self.input, len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(CodecError::Malformed {
                detail: format!("truncated {what}: expected {len} bytes, found {}", bytes.len()),
            });
        }
        Ok(bytes)
    }

    /// Validate magic, format version, and kind tag.
    pub fn preamble(&mut self, expected: FileKind) -> Result<(), CodecError> {
        if self.fixed::<4>()? != MAGIC {
            return Err(CodecError::InvalidMagic);
        }
        let [version, found] = self.fixed::<2>()?;
        if version != FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion { found: version });
        }
        if found != expected.tag() {
            return Err(CodecError::WrongKind { expected, found });
        }
        Ok(())
    }

    /// A `u32` element count.
    pub fn count(&mut self) -> Result<usize, CodecError> {
        Ok(u32::from_le_bytes(self.fixed()?) as usize)
    }

    /// A `u64`.
    pub fn u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.fixed()?))
    }

    /// An `f64`, bit for bit.
    pub fn f64(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_le_bytes(self.fixed()?))
    }

    /// See [`Encoder::optional_u64`].
    pub fn optional_u64(&mut self) -> Result<Option<u64>, CodecError> {
        match self.fixed::<1>()? {
            [0] => Ok(None),
            [1] => Ok(Some(self.u64()?)),
            [flag] => Err(CodecError::Malformed {
                detail: format!("invalid presence flag {flag}"),
            }),
        }
    }

    /// See [`Encoder::str`].
    pub fn str(&mut self) -> Result<String, CodecError> {
        let len = self.count()?;
        String::from_utf8(self.sized(len, "string")?).map_err(|e| CodecError::Malformed {
            detail: format!("invalid UTF-8 string: {e}"),
        })
    }

    /// See [`Encoder::configuration`].
    pub fn configuration(&mut self) -> Result<Configuration, CodecError> {
        Ok(Configuration::from_yaml(&self.str()?)?)
    }

    /// See [`Encoder::block_index`].
    pub fn block_index(&mut self) -> Result<BlockIndex, CodecError> {
        let radial = i32::from_le_bytes(self.fixed()?);
        let polar = u32::from_le_bytes(self.fixed()?);
        Ok(BlockIndex::new(radial, polar))
    }

    /// See [`Encoder::array1`].
    pub fn array1(&mut self) -> Result<Array1<f64>, CodecError> {
        let len = self.count()?;
        Ok(Array1::from(self.values(len)?))
    }

    /// See [`Encoder::array2`].
    pub fn array2(&mut self) -> Result<Array2<f64>, CodecError> {
        let rows = self.count()?;
        let cols = self.count()?;
        let len = rows.checked_mul(cols).ok_or_else(|| CodecError::Malformed {
            detail: format!("array shape ({rows}, {cols}) overflows"),
        })?;
        Array2::from_shape_vec((rows, cols), self.values(len)?).map_err(|e| CodecError::Malformed {
            detail: format!("array shape ({rows}, {cols}): {e}"),
        })
    }

    fn values(&mut self, len: usize) -> Result<Vec<f64>, CodecError> {
        let byte_len = len.checked_mul(8).ok_or_else(|| CodecError::Malformed {
            detail: format!("array length {len} overflows"),
        })?;
        let bytes = self.sized(byte_len, "array")?;
        Ok(bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut b = [0u8; 8];
                b.copy_from_slice(chunk);
                f64::from_le_bytes(b)
            })
            .collect())
    }

    /// See [`Encoder::block`]. The decoded arrays must form a valid block.
    pub fn block(&mut self) -> Result<(BlockIndex, Block), CodecError> {
        let index = self.block_index()?;
        let mut builder = Block::builder(self.array1()?, self.array1()?);
        for which in Primitive::ALL {
            builder = builder.primitive(which, self.array2()?);
        }
        Ok((index, builder.build()?))
    }
}
