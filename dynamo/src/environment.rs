//! Dispatch configuration instances
//!
//! A `Dynamo` owns one type registry and the signatures submitted for each
//! logical function. Independent instances share nothing, so unrelated
//! function sets can declare conflicting types without interfering.
//!
//! ## Lifecycle
//!
//! 1. Create an instance, optionally seeded with the default types
//! 2. Register types, refinements and conversions
//! 3. Submit signatures grouped by function name
//! 4. Compile each function into a [`Dispatcher`]
//!
//! Compiled dispatchers keep no reference to the instance; registering more
//! types afterwards only affects functions compiled later.

use crate::defaults::DefaultTypes;
use crate::dispatch::Dispatcher;
use crate::error::{DynamoError, Result};
use crate::registry::TypeRegistry;
use crate::signature::{Method, Parameter, Signature, compile_signature};
use crate::types::TypeTag;
use crate::value::Value;
use indexmap::IndexMap;
use tracing::debug;

/// A bundle of guards and conversions registered together
///
/// Implemented by anything that knows how to describe one or more types,
/// and by closures over the registry.
pub trait Definition {
    fn define(&self, registry: &mut TypeRegistry) -> Result<()>;
}

impl<F> Definition for F
where
    F: Fn(&mut TypeRegistry) -> Result<()>,
{
    fn define(&self, registry: &mut TypeRegistry) -> Result<()> {
        self(registry)
    }
}

/// Which guards a new instance starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeSeed {
    /// The built-in [`DefaultTypes`]
    #[default]
    Defaults,
    /// An empty registry
    None,
}

/// Instance configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub types: TypeSeed,
    /// Synthesize instance-of guards for unregistered native tags instead of
    /// failing with `UnknownType`
    pub autoadd: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(mut self, types: TypeSeed) -> Self {
        self.types = types;
        self
    }

    pub fn autoadd(mut self, autoadd: bool) -> Self {
        self.autoadd = autoadd;
        self
    }
}

/// Explicit declaration of one logical function
///
/// Signatures keep the order they were added in, which is the order the
/// dispatcher tries them.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    name: String,
    signatures: Vec<Signature>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signatures: Vec::new(),
        }
    }

    /// Start from every signature of `base`; own signatures follow them
    pub fn extending(name: impl Into<String>, base: &FunctionDef) -> Self {
        Self {
            name: name.into(),
            signatures: base.signatures.clone(),
        }
    }

    /// Add a signature
    pub fn signature<P, F>(mut self, params: impl IntoIterator<Item = P>, body: F) -> Self
    where
        P: Into<Parameter>,
        F: Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.signatures.push(Signature::new(params, Method::new(body)));
        self
    }

    /// Add a signature taking no arguments
    pub fn nullary<F>(mut self, body: F) -> Self
    where
        F: Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.signatures.push(Signature::nullary(Method::new(body)));
        self
    }

    pub fn push(&mut self, signature: Signature) {
        self.signatures.push(signature);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// An isolated dispatch configuration
#[derive(Debug, Clone)]
pub struct Dynamo {
    types: TypeSeed,
    registry: TypeRegistry,
    functions: IndexMap<String, Vec<Signature>>,
}

impl Dynamo {
    /// Instance seeded with the default types
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Instance with an empty registry
    pub fn empty() -> Self {
        Self::with_options(Options::new().types(TypeSeed::None))
    }

    pub fn with_options(options: Options) -> Self {
        let mut registry = TypeRegistry::with_autoadd(options.autoadd);
        if options.types == TypeSeed::Defaults {
            DefaultTypes::register(&mut registry);
        }
        debug!(types = registry.type_count(), autoadd = options.autoadd, "created dynamo");

        Self {
            types: options.types,
            registry,
            functions: IndexMap::new(),
        }
    }

    /// Current options; `autoadd` is read from the registry
    pub fn options(&self) -> Options {
        Options {
            types: self.types,
            autoadd: self.registry.autoadd(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// Register a bundle of types and conversions
    pub fn add(&mut self, definition: &impl Definition) -> Result<&mut Self> {
        definition.define(&mut self.registry)?;
        Ok(self)
    }

    pub fn add_type<F>(&mut self, tag: &TypeTag, test: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.registry.add_type(tag, test);
        self
    }

    pub fn add_subtype<F>(&mut self, child: &TypeTag, parent: &TypeTag, test: F) -> Result<&mut Self>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.registry.add_subtype(child, parent, test)?;
        Ok(self)
    }

    pub fn add_conversion<F>(&mut self, from: &TypeTag, to: &TypeTag, convert: F) -> &mut Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.registry.add_conversion(from, to, convert);
        self
    }

    /// Submit one signature for the function `name`
    pub fn define<P, F>(&mut self, name: &str, params: impl IntoIterator<Item = P>, body: F) -> &mut Self
    where
        P: Into<Parameter>,
        F: Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.push(name, Signature::new(params, Method::new(body)));
        self
    }

    /// Submit every signature of a function declaration
    ///
    /// Signatures append to any already submitted under the same name.
    pub fn submit(&mut self, function: FunctionDef) -> &mut Self {
        let FunctionDef { name, signatures } = function;
        for signature in signatures {
            self.push(&name, signature);
        }
        self
    }

    /// Compile the submitted signatures of `name`
    pub fn compile(&self, name: &str) -> Result<Dispatcher> {
        let signatures = self
            .functions
            .get(name)
            .ok_or_else(|| DynamoError::no_signatures(name))?;
        self.build(name, signatures)
    }

    /// Compile a function declaration without submitting it
    pub fn function(&self, function: &FunctionDef) -> Result<Dispatcher> {
        self.build(function.name(), function.signatures())
    }

    /// A new instance starting from a copy of this one's types and signatures
    pub fn fork(&self) -> Self {
        debug!(types = self.registry.type_count(), functions = self.functions.len(), "forked dynamo");
        self.clone()
    }

    /// Names with submitted signatures, in submission order
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    fn push(&mut self, name: &str, signature: Signature) {
        self.functions.entry(name.to_string()).or_default().push(signature);
    }

    fn build(&self, name: &str, signatures: &[Signature]) -> Result<Dispatcher> {
        let compiled = signatures
            .iter()
            .map(|signature| compile_signature(signature, &self.registry))
            .collect::<Result<Vec<_>>>()?;
        Dispatcher::build(name, compiled)
    }
}

impl Default for Dynamo {
    fn default() -> Self {
        Self::new()
    }
}
