//! Value Type Model
//!
//! The static types of the DSL: primitives, `Collection<T>`, generic
//! parameters and user-defined value types (`valuetype X oftype Y`).
//!
//! # Overview
//!
//! - [`ValueType`] is an owned description of a type. User-defined types
//!   only carry the id of their definition.
//! - [`ValueTypeProvider`] borrows the [`Model`](crate::ast::Model) and
//!   answers every question that needs to follow an `oftype` chain:
//!   resolution of use sites, supertypes, convertibility, cycle detection.
//! - [`AtomicValueType`] wraps one user-defined definition.
//!
//! Convertibility is reflexive, follows supertypes transitively, widens
//! `Integer` to `Decimal` and is covariant for collections. Nothing else
//! converts implicitly.

pub mod atomic;
pub mod parse;
mod provider;
mod value_type;

#[cfg(test)]
mod tests;

pub use atomic::AtomicValueType;
pub use parse::parse_value_to_internal_representation;
pub use provider::ValueTypeProvider;
pub use value_type::{AtomicTypeRef, PrimitiveValueType, ValueType, ValueTypeKind};
