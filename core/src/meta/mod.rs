//! Block/Constraint Type Wrapper ("Meta Information")
//!
//! Describes what a block type or constraint type accepts: its ordered
//! property specifications (type, optional default, optional validator),
//! body-level validators and, for block types, the input/output IO types
//! that govern which pipes are legal.
//!
//! Built-in types live in a [`MetaInformationRegistry`] that is built once
//! at startup and passed around by reference. Composite block types are
//! derived from the model on demand.

mod block_type;
pub mod builtins;
mod constraint_type;
mod property;
mod registry;

#[cfg(test)]
mod tests;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use block_type::{BlockTypeInfo, BlockTypeKind};
pub use constraint_type::{execute_constraint, ConstraintExecutor, ConstraintTypeInfo};
pub use property::{
    lenient_required, strict_required, BodyValidator, PropertyDefault, PropertySpecification,
    PropertyValidator, PropertyValues, RequiredPropertyStrategy,
};
pub use registry::MetaInformationRegistry;

/// The shape of data flowing between blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IoType {
    None,
    File,
    TextFile,
    FileSystem,
    Sheet,
    Table,
}

impl IoType {
    pub const ALL: [IoType; 6] = [
        IoType::None,
        IoType::File,
        IoType::TextFile,
        IoType::FileSystem,
        IoType::Sheet,
        IoType::Table,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IoType::None => "None",
            IoType::File => "File",
            IoType::TextFile => "TextFile",
            IoType::FileSystem => "FileSystem",
            IoType::Sheet => "Sheet",
            IoType::Table => "Table",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn is_none(self) -> bool {
        self == IoType::None
    }
}

impl std::fmt::Display for IoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What block types and constraint types have in common.
pub trait MetaInformation {
    fn name(&self) -> &str;

    /// Property specifications in declaration order
    fn properties(&self) -> &IndexMap<String, PropertySpecification>;

    fn body_validator(&self) -> Option<BodyValidator>;

    fn docs(&self) -> Option<&str>;

    /// Whether a block or constraint must assign this property
    fn is_required(&self, specification: &PropertySpecification) -> bool {
        strict_required(specification)
    }

    fn property(&self, name: &str) -> Option<&PropertySpecification> {
        self.properties().get(name)
    }

    fn has_property(&self, name: &str) -> bool {
        self.properties().contains_key(name)
    }

    /// Required properties missing from `present`, in declaration order
    fn missing_required_property_names(&self, present: &[&str]) -> Vec<String> {
        self.properties()
            .iter()
            .filter(|(name, spec)| self.is_required(spec) && !present.contains(&name.as_str()))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
