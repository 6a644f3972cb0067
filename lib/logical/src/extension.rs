use crate::op::{Op, OpExtension, OpRef};
use rdf_fusion_common::AlgebraResult;
use rdf_fusion_model::Expression;
use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// A reference-counted [ExtensionBuilder].
pub type ExtensionBuilderRef = Arc<dyn ExtensionBuilder>;

/// Creates the operator for an extension element of a query pattern.
pub trait ExtensionBuilder: Debug + Send + Sync {
    /// The tag that identifies the extension.
    fn tag(&self) -> &str;

    /// Builds the operator for an extension element with the given `args`.
    ///
    /// The default implementation creates an opaque [Op::Extension].
    fn build(&self, args: &[Expression]) -> AlgebraResult<OpRef> {
        Ok(Arc::new(Op::Extension(OpExtension {
            tag: self.tag().to_owned(),
            args: args.to_vec(),
        })))
    }
}

/// The set of known extensions.
///
/// The registry is passed explicitly to the components that need it. There is no global
/// registry.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    builders: FxHashMap<String, ExtensionBuilderRef>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `builder` for its tag. A previously registered builder for the same tag is
    /// replaced.
    pub fn register(&mut self, builder: ExtensionBuilderRef) {
        self.builders.insert(builder.tag().to_owned(), builder);
    }

    pub fn get(&self, tag: &str) -> Option<&ExtensionBuilderRef> {
        self.builders.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.builders.contains_key(tag)
    }
}

/// An [ExtensionBuilder] that creates opaque [Op::Extension] operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueExtensionBuilder {
    tag: String,
}

impl OpaqueExtensionBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl ExtensionBuilder for OpaqueExtensionBuilder {
    fn tag(&self) -> &str {
        &self.tag
    }
}
