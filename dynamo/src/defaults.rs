//! Built-in default types
//!
//! Guards for the value kinds every runtime shares. A `Dynamo` seeds its
//! registry with these unless it is created with `TypeSeed::None`.

use crate::environment::Definition;
use crate::error::Result;
use crate::registry::TypeRegistry;
use crate::types::TypeTag;
use crate::value::Value;

/// The default type set
///
/// `BigInt` has a built-in tag but no default guard; callers opt in by
/// registering one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypes;

impl DefaultTypes {
    /// Register every default guard
    pub fn register(registry: &mut TypeRegistry) {
        registry
            .add_type(&TypeTag::number(), |x| matches!(x, Value::Number(_)))
            .add_type(&TypeTag::string(), |x| matches!(x, Value::String(_)))
            .add_type(&TypeTag::boolean(), |x| matches!(x, Value::Boolean(_)))
            .add_type(&TypeTag::function(), |x| matches!(x, Value::Function(_)))
            .add_type(&TypeTag::array(), |x| matches!(x, Value::Array(_)))
            .add_type(&TypeTag::date(), |x| matches!(x, Value::Date(_)))
            .add_type(&TypeTag::regexp(), |x| matches!(x, Value::RegExp(_)))
            .add_type(&TypeTag::null(), Value::is_null)
            .add_type(&TypeTag::undefined(), Value::is_undefined)
            .add_type(&TypeTag::object(), |x| matches!(x, Value::Object(_)))
            .add_type(&TypeTag::any(), |_| true);
    }
}

impl Definition for DefaultTypes {
    fn define(&self, registry: &mut TypeRegistry) -> Result<()> {
        Self::register(registry);
        Ok(())
    }
}
