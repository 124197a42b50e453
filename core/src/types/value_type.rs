//! The value type algebra.

use serde::{Deserialize, Serialize};

use crate::ast::ValueTypeId;

use super::ValueTypeProvider;

/// Built-in, non-generic value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveValueType {
    Boolean,
    Decimal,
    Integer,
    Text,
    Regex,
    CellRange,
    Constraint,
    ValuetypeAssignment,
    Transform,
}

impl PrimitiveValueType {
    pub const ALL: [PrimitiveValueType; 9] = [
        PrimitiveValueType::Boolean,
        PrimitiveValueType::Decimal,
        PrimitiveValueType::Integer,
        PrimitiveValueType::Text,
        PrimitiveValueType::Regex,
        PrimitiveValueType::CellRange,
        PrimitiveValueType::Constraint,
        PrimitiveValueType::ValuetypeAssignment,
        PrimitiveValueType::Transform,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveValueType::Boolean => "Boolean",
            PrimitiveValueType::Decimal => "Decimal",
            PrimitiveValueType::Integer => "Integer",
            PrimitiveValueType::Text => "Text",
            PrimitiveValueType::Regex => "Regex",
            PrimitiveValueType::CellRange => "CellRange",
            PrimitiveValueType::Constraint => "Constraint",
            PrimitiveValueType::ValuetypeAssignment => "ValuetypeAssignment",
            PrimitiveValueType::Transform => "Transform",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Users may write this type in their programs
    pub fn is_referenceable_by_user(self) -> bool {
        matches!(
            self,
            PrimitiveValueType::Boolean
                | PrimitiveValueType::Decimal
                | PrimitiveValueType::Integer
                | PrimitiveValueType::Text
        )
    }

    /// Values of this type can be supplied through `requires NAME`
    pub fn is_allowed_as_runtime_parameter(self) -> bool {
        matches!(
            self,
            PrimitiveValueType::Boolean
                | PrimitiveValueType::Decimal
                | PrimitiveValueType::Integer
                | PrimitiveValueType::Text
        )
    }
}

/// A user-defined value type, identified by its definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomicTypeRef {
    pub id: ValueTypeId,
    pub name: String,
    #[serde(default)]
    pub generic_arguments: Vec<ValueType>,
}

/// The static type of a property, port or expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Primitive(PrimitiveValueType),
    Collection(Box<ValueType>),
    /// The type of `[]`, convertible to every collection
    EmptyCollection,
    /// An unbound generic parameter
    Generic { name: String },
    Atomic(AtomicTypeRef),
}

/// The kind discriminator of a [`ValueType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTypeKind {
    Primitive,
    Collection,
    Generic,
    UserDefined,
}

impl ValueType {
    pub const BOOLEAN: ValueType = ValueType::Primitive(PrimitiveValueType::Boolean);
    pub const DECIMAL: ValueType = ValueType::Primitive(PrimitiveValueType::Decimal);
    pub const INTEGER: ValueType = ValueType::Primitive(PrimitiveValueType::Integer);
    pub const TEXT: ValueType = ValueType::Primitive(PrimitiveValueType::Text);
    pub const REGEX: ValueType = ValueType::Primitive(PrimitiveValueType::Regex);
    pub const CELL_RANGE: ValueType = ValueType::Primitive(PrimitiveValueType::CellRange);
    pub const CONSTRAINT: ValueType = ValueType::Primitive(PrimitiveValueType::Constraint);
    pub const VALUETYPE_ASSIGNMENT: ValueType =
        ValueType::Primitive(PrimitiveValueType::ValuetypeAssignment);
    pub const TRANSFORM: ValueType = ValueType::Primitive(PrimitiveValueType::Transform);

    pub fn collection(element: ValueType) -> Self {
        ValueType::Collection(Box::new(element))
    }

    pub fn kind(&self) -> ValueTypeKind {
        match self {
            ValueType::Primitive(_) => ValueTypeKind::Primitive,
            ValueType::Collection(_) | ValueType::EmptyCollection => ValueTypeKind::Collection,
            ValueType::Generic { .. } => ValueTypeKind::Generic,
            ValueType::Atomic(_) => ValueTypeKind::UserDefined,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveValueType> {
        match self {
            ValueType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Element type of a collection; `None` for `[]` and non-collections
    pub fn element_type(&self) -> Option<&ValueType> {
        match self {
            ValueType::Collection(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, ValueType::Collection(_) | ValueType::EmptyCollection)
    }

    /// Whether users may write this type in their programs.
    ///
    /// This is a declarative flag consulted by validation; the algebra does
    /// not enforce it.
    pub fn is_referenceable_by_user(&self) -> bool {
        match self {
            ValueType::Primitive(p) => p.is_referenceable_by_user(),
            ValueType::Collection(_) => true,
            ValueType::EmptyCollection | ValueType::Generic { .. } => false,
            ValueType::Atomic(_) => true,
        }
    }

    /// See [`ValueTypeProvider::is_convertible`]
    pub fn is_convertible_to(&self, target: &ValueType, provider: &ValueTypeProvider<'_>) -> bool {
        provider.is_convertible(self, target)
    }

    /// See [`ValueTypeProvider::is_allowed_as_runtime_parameter`]
    pub fn is_allowed_as_runtime_parameter(&self, provider: &ValueTypeProvider<'_>) -> bool {
        provider.is_allowed_as_runtime_parameter(self)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Primitive(p) => f.write_str(p.name()),
            ValueType::Collection(element) => write!(f, "Collection<{}>", element),
            ValueType::EmptyCollection => f.write_str("EmptyCollection"),
            ValueType::Generic { name } => f.write_str(name),
            ValueType::Atomic(atomic) => {
                f.write_str(&atomic.name)?;
                if !atomic.generic_arguments.is_empty() {
                    let args: Vec<String> = atomic
                        .generic_arguments
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

impl From<PrimitiveValueType> for ValueType {
    fn from(primitive: PrimitiveValueType) -> Self {
        ValueType::Primitive(primitive)
    }
}
