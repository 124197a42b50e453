//! The meta information registry.

use std::borrow::Cow;

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{Model, Reference, TypeTarget};
use crate::expr::OperatorRegistry;

use super::{builtins, BlockTypeInfo, ConstraintTypeInfo};

/// Block types and constraint types by name.
///
/// Built once at startup, then only read. Block types and constraint types
/// share one namespace.
#[derive(Debug, Clone, Default)]
pub struct MetaInformationRegistry {
    block_types: IndexMap<String, BlockTypeInfo>,
    constraint_types: IndexMap<String, ConstraintTypeInfo>,
}

impl MetaInformationRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in block and constraint type
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        debug!(
            block_types = registry.block_types.len(),
            constraint_types = registry.constraint_types.len(),
            "registered built-in types"
        );
        registry
    }

    fn is_registered(&self, name: &str) -> bool {
        self.block_types.contains_key(name) || self.constraint_types.contains_key(name)
    }

    /// # Panics
    ///
    /// Panics if a type with the same name is already registered.
    pub fn register_block_type(&mut self, info: BlockTypeInfo) {
        assert!(
            !self.is_registered(&info.name),
            "meta information for \"{}\" is registered twice",
            info.name
        );
        self.block_types.insert(info.name.clone(), info);
    }

    /// # Panics
    ///
    /// Panics if a type with the same name is already registered.
    pub fn register_constraint_type(&mut self, info: ConstraintTypeInfo) {
        assert!(
            !self.is_registered(&info.name),
            "meta information for \"{}\" is registered twice",
            info.name
        );
        self.constraint_types.insert(info.name.clone(), info);
    }

    pub fn block_type(&self, name: &str) -> Option<&BlockTypeInfo> {
        self.block_types.get(name)
    }

    pub fn constraint_type(&self, name: &str) -> Option<&ConstraintTypeInfo> {
        self.constraint_types.get(name)
    }

    pub fn block_types(&self) -> impl Iterator<Item = &BlockTypeInfo> {
        self.block_types.values()
    }

    pub fn constraint_types(&self) -> impl Iterator<Item = &ConstraintTypeInfo> {
        self.constraint_types.values()
    }

    /// Meta information behind a block's type reference.
    ///
    /// `None` for unresolved references and composite types that cannot be
    /// wrapped. Composite information is derived from the model each time.
    pub fn block_type_of<'r>(
        &'r self,
        model: &Model,
        reference: &Reference<TypeTarget>,
        operators: &OperatorRegistry,
    ) -> Option<Cow<'r, BlockTypeInfo>> {
        match reference.get()? {
            TypeTarget::Builtin => self.block_type(&reference.name).map(Cow::Borrowed),
            TypeTarget::Composite(id) => BlockTypeInfo::from_composite(model, id, operators)
                .ok()
                .map(Cow::Owned),
        }
    }

    /// Meta information behind a typed constraint's type reference
    pub fn constraint_type_of(
        &self,
        reference: &Reference<TypeTarget>,
    ) -> Option<&ConstraintTypeInfo> {
        match reference.get()? {
            TypeTarget::Builtin => self.constraint_type(&reference.name),
            TypeTarget::Composite(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::IoType;

    #[test]
    fn test_builtins_are_registered() {
        let registry = MetaInformationRegistry::with_builtins();
        assert_eq!(registry.block_types().count(), 17);
        assert_eq!(registry.constraint_types().count(), 5);

        let extractor = registry.block_type("HttpExtractor").unwrap();
        assert_eq!(extractor.input, IoType::None);
        assert_eq!(extractor.output, IoType::File);
        assert!(registry.constraint_type("RangeConstraint").is_some());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_is_fatal() {
        let mut registry = MetaInformationRegistry::with_builtins();
        registry.register_block_type(BlockTypeInfo::builtin(
            "HttpExtractor",
            IoType::None,
            IoType::File,
        ));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_block_and_constraint_types_share_names() {
        let mut registry = MetaInformationRegistry::with_builtins();
        registry.register_block_type(BlockTypeInfo::builtin(
            "RegexConstraint",
            IoType::Sheet,
            IoType::Sheet,
        ));
    }

    #[test]
    fn test_unresolved_reference_has_no_meta_information() {
        let registry = MetaInformationRegistry::with_builtins();
        let model = Model::new();
        let operators = OperatorRegistry::standard();
        let reference = Reference::new("HttpExtractor", Default::default());
        assert!(registry
            .block_type_of(&model, &reference, &operators)
            .is_none());

        let linked = Reference::resolved("HttpExtractor", Default::default(), TypeTarget::Builtin);
        assert!(registry.block_type_of(&model, &linked, &operators).is_some());
    }
}
