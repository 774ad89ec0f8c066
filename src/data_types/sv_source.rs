
use crate::data_types::structural_variant::StructuralVariant;

/// All the decoded variants of one caller/platform, in file order.
#[derive(Clone, Debug, Default)]
pub struct SvSource {
    /// Tag identifying the source, also used in report column names
    tag: String,
    /// Decoded (and possibly deduplicated) variants
    variants: Vec<StructuralVariant>
}

impl SvSource {
    /// Constructor
    pub fn new(tag: String, variants: Vec<StructuralVariant>) -> Self {
        Self {
            tag,
            variants
        }
    }

    // getters
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn variants(&self) -> &[StructuralVariant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
