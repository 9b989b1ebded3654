//! Signatures and the signature compiler
//!
//! A signature is a fixed-arity list of parameters, each a union of type
//! tags, paired with the method implementing it. Compiling a signature
//! resolves every tag against a registry once and produces a tuple guard, an
//! argument converter and a description used in mismatch errors.

use crate::conversion::widen;
use crate::error::{DynamoError, Result};
use crate::guards::{ArgsConverter, ArgsGuard, Converter, Guard, mapper, match_first, tuple, union};
use crate::registry::TypeRegistry;
use crate::types::TypeTag;
use crate::value::{NativeFn, Value};
use std::fmt;
use std::sync::Arc;

/// Implementation body of one signature
///
/// Receives the call receiver and the already converted arguments.
#[derive(Clone)]
pub struct Method(Arc<NativeFn>);

impl Method {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Method(Arc::new(body))
    }

    #[inline]
    pub fn call(&self, receiver: &Value, args: Vec<Value>) -> Result<Value> {
        (self.0)(receiver, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method")
    }
}

/// The acceptable types at one argument position
///
/// Holds at least one tag once compiled; an empty union fails
/// compilation with `EmptyParameter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter(Vec<TypeTag>);

impl Parameter {
    /// Union of the given tags, in the given order
    pub fn union(tags: impl IntoIterator<Item = TypeTag>) -> Self {
        Parameter(tags.into_iter().collect())
    }

    pub fn tags(&self) -> &[TypeTag] {
        &self.0
    }

    pub fn is_union(&self) -> bool {
        self.0.len() > 1
    }
}

impl From<TypeTag> for Parameter {
    fn from(tag: TypeTag) -> Self {
        Parameter(vec![tag])
    }
}

impl From<&TypeTag> for Parameter {
    fn from(tag: &TypeTag) -> Self {
        Parameter(vec![tag.clone()])
    }
}

impl<const N: usize> From<[TypeTag; N]> for Parameter {
    fn from(tags: [TypeTag; N]) -> Self {
        Parameter(tags.into())
    }
}

impl From<Vec<TypeTag>> for Parameter {
    fn from(tags: Vec<TypeTag>) -> Self {
        Parameter(tags)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(TypeTag::name).collect();
        f.write_str(&names.join("|"))
    }
}

/// One typed alternative of a logical function
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<Parameter>,
    method: Method,
}

impl Signature {
    pub fn new<P: Into<Parameter>>(params: impl IntoIterator<Item = P>, method: Method) -> Self {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            method,
        }
    }

    /// Signature taking no arguments
    pub fn nullary(method: Method) -> Self {
        Self {
            params: Vec::new(),
            method,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// A parameter resolved against a registry
#[derive(Debug, Clone)]
pub struct CompiledParameter {
    pub guard: Guard,
    pub converter: Converter,
    /// Every accepted tag, declared ones first, then conversion sources
    pub tags: Vec<TypeTag>,
    /// Accepted tag names joined with `|`
    pub name: String,
}

/// A signature resolved against a registry
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    pub guard: ArgsGuard,
    pub converter: ArgsConverter,
    pub method: Method,
    pub arity: usize,
    /// Bracketed position names, e.g. `[Number,String|Boolean]`
    pub description: String,
}

/// Resolve one parameter position
///
/// Positions that no conversion widened keep the identity converter.
pub fn compile_parameter(param: &Parameter, registry: &TypeRegistry) -> Result<CompiledParameter> {
    if param.tags().is_empty() {
        return Err(DynamoError::EmptyParameter);
    }
    let widened = widen(param.tags(), registry)?;
    let name = widened
        .tags
        .iter()
        .map(TypeTag::name)
        .collect::<Vec<_>>()
        .join("|");

    let converter = if widened.is_widened() {
        match_first(widened.guards.clone(), widened.converters)
    } else {
        Converter::identity()
    };

    Ok(CompiledParameter {
        guard: union(widened.guards),
        converter,
        tags: widened.tags,
        name,
    })
}

/// Resolve a whole signature
pub fn compile_signature(signature: &Signature, registry: &TypeRegistry) -> Result<CompiledSignature> {
    let arity = signature.arity();
    if arity == 0 {
        return Ok(CompiledSignature {
            guard: tuple(Vec::new()),
            converter: ArgsConverter::identity(),
            method: signature.method.clone(),
            arity,
            description: "[]".to_string(),
        });
    }

    let mut guards = Vec::with_capacity(arity);
    let mut converters = Vec::with_capacity(arity);
    let mut names = Vec::with_capacity(arity);
    for param in &signature.params {
        let compiled = compile_parameter(param, registry)?;
        guards.push(compiled.guard);
        converters.push(compiled.converter);
        names.push(compiled.name);
    }

    Ok(CompiledSignature {
        guard: tuple(guards),
        converter: mapper(converters),
        method: signature.method.clone(),
        arity,
        description: format!("[{}]", names.join(",")),
    })
}
