//! Built-in block and constraint types.

mod blocks;
mod constraints;
mod validators;

use super::MetaInformationRegistry;

/// Register every built-in type into `registry`
pub fn register_all(registry: &mut MetaInformationRegistry) {
    blocks::register(registry);
    constraints::register(registry);
}
