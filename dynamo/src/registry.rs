//! Type registry
//!
//! Source of truth for which guards belong to a type tag and which
//! conversions target it. A registry is filled during setup and read by the
//! signature compiler; compiled dispatchers keep no reference to it.

use crate::conversion::{Conversion, ConversionGraph};
use crate::error::{DynamoError, Result};
use crate::guards::{Converter, Guard, intersect};
use crate::types::TypeTag;
use crate::value::Value;
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Mapping from type tag to guards, plus the conversion graph
///
/// Mutation takes `&mut self`: registries are written by one owner during
/// setup and are not synchronised.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    guards: IndexMap<TypeTag, Vec<Guard>>,
    conversions: ConversionGraph,
    autoadd: bool,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that synthesizes guards for native tags
    pub fn with_autoadd(autoadd: bool) -> Self {
        Self {
            autoadd,
            ..Self::default()
        }
    }

    pub fn autoadd(&self) -> bool {
        self.autoadd
    }

    pub fn set_autoadd(&mut self, autoadd: bool) {
        self.autoadd = autoadd;
    }

    /// Append a guard to a tag's guard list
    ///
    /// Guards registered for the same tag all have to pass.
    pub fn register_guard(&mut self, tag: &TypeTag, guard: Guard) -> &mut Self {
        let guards = self.guards.entry(tag.clone()).or_default();
        guards.push(guard);
        debug!(tag = %tag, guards = guards.len(), "registered guard");
        self
    }

    /// Append a guard built from a closure
    pub fn add_type<F>(&mut self, tag: &TypeTag, test: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.register_guard(tag, Guard::new(test))
    }

    /// Declare `child` as a refinement of `parent`
    ///
    /// The child's guards become the parent's current guards, then any
    /// guards the child already had, then `test`. Everything registered for
    /// the child only ever sees values the parent accepted.
    pub fn add_subtype<F>(&mut self, child: &TypeTag, parent: &TypeTag, test: F) -> Result<&mut Self>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let mut guards = self.guard_list(parent)?;
        let own = self.guards.entry(child.clone()).or_default();
        guards.append(own);
        guards.push(Guard::new(test));
        *own = guards;
        debug!(tag = %child, parent = %parent, guards = own.len(), "registered subtype");
        Ok(self)
    }

    /// Register a conversion from `from` into `to`
    ///
    /// No de-duplication: registering the same conversion twice keeps both.
    pub fn register_conversion(&mut self, from: &TypeTag, to: &TypeTag, convert: Converter) -> &mut Self {
        self.conversions.add(from, to, convert);
        debug!(from = %from, to = %to, "registered conversion");
        self
    }

    /// Register a conversion built from a closure
    pub fn add_conversion<F>(&mut self, from: &TypeTag, to: &TypeTag, convert: F) -> &mut Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.register_conversion(from, to, Converter::new(convert))
    }

    /// The combined guard for a tag
    ///
    /// Unknown tags fail with `UnknownType`, except native tags when autoadd
    /// is enabled, which get an instance-of guard on the fly.
    pub fn resolve_guard(&self, tag: &TypeTag) -> Result<Guard> {
        match self.guards.get(tag) {
            Some(guards) => Ok(combine_guards(guards)),
            None => self.synthesize(tag),
        }
    }

    /// The guards registered for a tag, if any
    pub fn guards_for(&self, tag: &TypeTag) -> Option<&[Guard]> {
        self.guards.get(tag).map(Vec::as_slice)
    }

    /// Conversions targeting `to`, in registration order
    pub fn conversions_to(&self, to: &TypeTag) -> Vec<Conversion> {
        self.conversions.incoming(to)
    }

    pub fn conversions(&self) -> &ConversionGraph {
        &self.conversions
    }

    pub fn has_type(&self, tag: &TypeTag) -> bool {
        self.guards.contains_key(tag)
    }

    pub fn type_count(&self) -> usize {
        self.guards.len()
    }

    /// Registered tags in registration order
    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> {
        self.guards.keys()
    }

    fn guard_list(&self, tag: &TypeTag) -> Result<Vec<Guard>> {
        match self.guards.get(tag) {
            Some(guards) => Ok(guards.clone()),
            None => Ok(vec![self.synthesize(tag)?]),
        }
    }

    fn synthesize(&self, tag: &TypeTag) -> Result<Guard> {
        match tag.native_type() {
            Some(type_id) if self.autoadd => {
                trace!(tag = %tag, "synthesized instance guard");
                Ok(Guard::new(move |x| {
                    x.as_instance().is_some_and(|instance| instance.class_id() == type_id)
                }))
            }
            _ => Err(DynamoError::unknown_type(tag.name())),
        }
    }
}

/// Guard passing when every guard in the list passes
pub fn combine_guards(guards: &[Guard]) -> Guard {
    intersect(guards.to_vec())
}
