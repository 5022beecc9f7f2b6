//! Products file reader.
//!
//! [`ProductsReader`] validates the preamble and decodes the header on
//! construction, so callers that only need the header (for example the
//! recorded source fingerprint) never touch the block data.

use std::io::Read;

use nova_core::Configuration;

use crate::codec::{Decoder, FileKind};
use crate::error::CodecError;
use crate::products::Products;

/// Everything in a products file before the blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductsHeader {
    /// Producer version string.
    pub version: String,
    /// Simulation time.
    pub time: f64,
    /// Fingerprint of the source checkpoint, if any.
    pub source_fingerprint: Option<u64>,
    /// Run configuration.
    pub configuration: Configuration,
}

/// Reads products from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production
/// code can use `BufReader<File>`.
pub struct ProductsReader<R: Read> {
    reader: R,
    header: ProductsHeader,
}

impl<R: Read> ProductsReader<R> {
    /// Open a products stream, reading and validating the header.
    pub fn open(mut reader: R) -> Result<Self, CodecError> {
        let header = {
            let mut d = Decoder::new(&mut reader);
            d.preamble(FileKind::Products)?;
            let version = d.str()?;
            let time = d.f64()?;
            let source_fingerprint = d.optional_u64()?;
            let configuration = d.configuration()?;
            ProductsHeader {
                version,
                time,
                source_fingerprint,
                configuration,
            }
        };
        Ok(Self { reader, header })
    }

    /// The decoded header.
    pub fn header(&self) -> &ProductsHeader {
        &self.header
    }

    /// Decode the blocks and assemble the products.
    pub fn read_products(mut self) -> Result<Products, CodecError> {
        let mut d = Decoder::new(&mut self.reader);
        let count = d.count()?;
        let blocks = (0..count)
            .map(|_| d.block())
            .collect::<Result<Vec<_>, _>>()?;

        let header = self.header;
        let mut products =
            Products::new(header.time, header.configuration, blocks)?.with_version(header.version);
        if let Some(fingerprint) = header.source_fingerprint {
            products = products.with_source_fingerprint(fingerprint);
        }
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ProductsWriter;
    use crate::MAGIC;
    use nova_core::Primitive;
    use nova_test_utils::{block_grid, sample_configuration, GridSpec};

    fn sample_products() -> Products {
        let spec = GridSpec {
            radial_blocks: -1..2,
            ..GridSpec::default()
        };
        Products::new(
            1.25,
            sample_configuration(spec.num_polar_zones()),
            block_grid(&spec),
        )
        .unwrap()
        .with_version("0.2.0-test")
    }

    fn encoded(products: &Products) -> Vec<u8> {
        let mut buf = Vec::new();
        ProductsWriter::new(&mut buf).write(products).unwrap();
        buf
    }

    #[test]
    fn roundtrip_is_bit_exact() {
        let products = sample_products();
        let back = ProductsReader::open(encoded(&products).as_slice())
            .unwrap()
            .read_products()
            .unwrap();

        assert_eq!(back.time().to_bits(), products.time().to_bits());
        assert_eq!(back.version(), "0.2.0-test");
        assert_eq!(back.configuration(), products.configuration());
        assert_eq!(back.source_fingerprint(), None);
        for ((ia, a), (ib, b)) in products.blocks().iter().zip(back.blocks()) {
            assert_eq!(ia, ib);
            for which in Primitive::ALL {
                let bits_a: Vec<u64> = a.primitive(which).iter().map(|v| v.to_bits()).collect();
                let bits_b: Vec<u64> = b.primitive(which).iter().map(|v| v.to_bits()).collect();
                assert_eq!(bits_a, bits_b);
            }
        }
    }

    #[test]
    fn header_is_available_before_blocks() {
        let products = sample_products().with_source_fingerprint(0xABCD);
        let buf = encoded(&products);
        let reader = ProductsReader::open(buf.as_slice()).unwrap();
        assert_eq!(reader.header().source_fingerprint, Some(0xABCD));
        assert_eq!(reader.header().configuration.model_name(), "kinetic_bomb");
    }

    #[test]
    fn truncated_stream_errors() {
        let mut buf = encoded(&sample_products());
        buf.truncate(buf.len() - 4);
        let reader = ProductsReader::open(buf.as_slice()).unwrap();
        assert!(reader.read_products().is_err());
    }

    #[test]
    fn bad_magic_on_open() {
        let data = b"XOVA\x01\x01rest of data";
        let result = ProductsReader::open(data.as_slice());
        assert!(matches!(result, Err(CodecError::InvalidMagic)));
    }

    #[test]
    fn header_starts_with_magic() {
        let buf = encoded(&sample_products());
        assert_eq!(&buf[..4], &MAGIC);
    }
}
