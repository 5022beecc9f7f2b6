//! Products file writer.

use std::io::Write;

use crate::codec::{Encoder, FileKind};
use crate::error::CodecError;
use crate::products::Products;

/// Writes products to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use nova_products::{Products, ProductsReader, ProductsWriter};
/// # let config = nova_test_utils::sample_configuration(2);
///
/// let products = Products::new(3.0, config, []).unwrap().with_source_fingerprint(7);
///
/// let mut buf = Vec::new();
/// ProductsWriter::new(&mut buf).write(&products).unwrap();
///
/// let reader = ProductsReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.header().source_fingerprint, Some(7));
/// assert_eq!(reader.read_products().unwrap(), products);
/// ```
pub struct ProductsWriter<W: Write> {
    writer: W,
}

impl<W: Write> ProductsWriter<W> {
    /// Wrap a byte sink.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encode a complete products file.
    pub fn write(&mut self, products: &Products) -> Result<(), CodecError> {
        let mut e = Encoder::new(&mut self.writer);
        e.preamble(FileKind::Products)?;
        e.str(products.version())?;
        e.f64(products.time())?;
        e.optional_u64(products.source_fingerprint())?;
        e.configuration(products.configuration())?;
        e.count(products.len())?;
        for (index, block) in products.blocks() {
            e.block(*index, block)?;
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
