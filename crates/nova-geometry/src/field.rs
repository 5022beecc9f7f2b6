//! Mesh-level field assembly.

use indexmap::IndexMap;
use ndarray::Array2;
use nova_core::{Block, BlockIndex};
use nova_fields::{derive, Field};
use nova_products::Products;

/// Transform applied to a derived field before rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FieldTransform {
    /// Values as derived.
    #[default]
    Identity,
    /// Base-10 logarithm. Non-positive values become `NaN` or `-inf`.
    Log10,
}

impl FieldTransform {
    /// Apply the transform in place.
    pub fn apply(self, mut values: Array2<f64>) -> Array2<f64> {
        if let Self::Log10 = self {
            values.mapv_inplace(f64::log10);
        }
        values
    }

    /// Axis/colorbar label for `field` under this transform.
    pub fn label(self, field: Field) -> String {
        let units = field.units();
        let name = match self {
            Self::Identity => field.name().to_string(),
            Self::Log10 => format!("log10({})", field.name()),
        };
        if units.is_empty() {
            name
        } else {
            format!("{name} [{units}]")
        }
    }
}

/// Derive `field` on one block and apply `transform`.
pub fn block_field(block: &Block, field: Field, transform: FieldTransform) -> Array2<f64> {
    transform.apply(derive(block, field))
}

/// [`block_field`] for every block, in snapshot order.
pub fn mesh_field(
    products: &Products,
    field: Field,
    transform: FieldTransform,
) -> IndexMap<BlockIndex, Array2<f64>> {
    products
        .blocks()
        .iter()
        .map(|(index, block)| (*index, block_field(block, field, transform)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nova_test_utils::{block_grid, sample_configuration, GridSpec};

    #[test]
    fn log10_transform() {
        let block = nova_test_utils::uniform_block((1.0, 2.0, 2), (0.0, 1.0, 1), 100.0, 1.0);
        let values = block_field(&block, Field::Rho, FieldTransform::Log10);
        for v in values.iter() {
            assert_relative_eq!(*v, 2.0);
        }
    }

    #[test]
    fn mesh_field_has_block_shapes() {
        let spec = GridSpec::default();
        let products =
            Products::new(0.0, sample_configuration(6), block_grid(&spec)).unwrap();
        let fields = mesh_field(&products, Field::Energy, FieldTransform::Identity);
        assert_eq!(fields.len(), products.len());
        for (index, values) in &fields {
            assert_eq!(values.dim(), products.block(*index).unwrap().shape());
        }
    }

    #[test]
    fn labels_include_units() {
        assert_eq!(
            FieldTransform::Log10.label(Field::Rho),
            "log10(rho) [g/cm^3]"
        );
        assert_eq!(FieldTransform::Identity.label(Field::GammaBeta), "gamma_beta");
    }
}
