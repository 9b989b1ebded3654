//! Dispatcher builder
//!
//! Assembles the compiled signatures of one logical function into a single
//! callable. At call time the tuple guards are tried in declaration order;
//! the first match converts the arguments and invokes its method. There is
//! no specificity ranking: when two signatures accept the same arguments the
//! one declared first wins.

use crate::error::{DynamoError, Result};
use crate::guards::{ArgsConverter, ArgsGuard};
use crate::signature::{CompiledSignature, Method};
use crate::value::{Callable, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// How a dispatcher selects its method, fixed when it is built
enum Body {
    /// Every signature takes no arguments; the first one wins
    Nullary(Method),
    /// A single signature; no search loop
    Single {
        guard: ArgsGuard,
        converter: ArgsConverter,
        method: Method,
    },
    /// Parallel lists searched in declaration order
    Many {
        guards: Box<[ArgsGuard]>,
        converters: Box<[ArgsConverter]>,
        methods: Box<[Method]>,
    },
}

struct Inner {
    name: String,
    arity: usize,
    description: String,
    signature_count: usize,
    body: Body,
}

/// Compiled multiple-dispatch function
///
/// Immutable once built. Clones share the same compiled data and may be
/// called from any thread.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Build a dispatcher from compiled signatures in declaration order
    pub fn build(name: &str, signatures: Vec<CompiledSignature>) -> Result<Self> {
        if signatures.is_empty() {
            return Err(DynamoError::no_signatures(name));
        }

        let arity = signatures.iter().map(|s| s.arity).max().unwrap_or(0);
        let signature_count = signatures.len();
        let description = signatures
            .iter()
            .map(|s| s.description.as_str())
            .collect::<Vec<_>>()
            .join(" or ");

        let body = if arity == 0 {
            let method = signatures
                .into_iter()
                .next()
                .map(|s| s.method)
                .ok_or_else(|| DynamoError::no_signatures(name))?;
            Body::Nullary(method)
        } else if signature_count == 1 {
            let signature = signatures
                .into_iter()
                .next()
                .ok_or_else(|| DynamoError::no_signatures(name))?;
            Body::Single {
                guard: signature.guard,
                converter: signature.converter,
                method: signature.method,
            }
        } else {
            let mut guards = Vec::with_capacity(signature_count);
            let mut converters = Vec::with_capacity(signature_count);
            let mut methods = Vec::with_capacity(signature_count);
            for signature in signatures {
                guards.push(signature.guard);
                converters.push(signature.converter);
                methods.push(signature.method);
            }
            Body::Many {
                guards: guards.into_boxed_slice(),
                converters: converters.into_boxed_slice(),
                methods: methods.into_boxed_slice(),
            }
        };

        debug!(function = name, arity, signatures = signature_count, "built dispatcher");

        Ok(Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                arity,
                description,
                signature_count,
                body,
            }),
        })
    }

    /// Call with `undefined` as the receiver
    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        self.call_with(&Value::Undefined, args)
    }

    /// Call with an explicit receiver passed through to the matched method
    pub fn call_with(&self, receiver: &Value, args: Vec<Value>) -> Result<Value> {
        match &self.inner.body {
            Body::Nullary(method) => {
                if !args.is_empty() {
                    return Err(DynamoError::arity(&self.inner.name, args.len()));
                }
                method.call(receiver, args)
            }
            Body::Single {
                guard,
                converter,
                method,
            } => {
                if guard.test(&args) {
                    return method.call(receiver, converter.apply(args));
                }
                Err(self.mismatch(&args))
            }
            Body::Many {
                guards,
                converters,
                methods,
            } => {
                for (i, guard) in guards.iter().enumerate() {
                    if guard.test(&args) {
                        return methods[i].call(receiver, converters[i].apply(args));
                    }
                }
                Err(self.mismatch(&args))
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Largest declared arity across all signatures
    pub fn arity(&self) -> usize {
        self.inner.arity
    }

    /// All signature descriptions joined with ` or `
    pub fn description(&self) -> &str {
        &self.inner.description
    }

    pub fn signature_count(&self) -> usize {
        self.inner.signature_count
    }

    /// Wrap as a `Function` value
    pub fn into_value(self) -> Value {
        Value::from(self)
    }

    fn mismatch(&self, args: &[Value]) -> DynamoError {
        DynamoError::dispatch_mismatch(
            &self.inner.name,
            &self.inner.description,
            args.iter().map(Value::type_name).collect(),
        )
    }
}

impl From<Dispatcher> for Value {
    fn from(dispatcher: Dispatcher) -> Self {
        let name = dispatcher.name().to_string();
        let arity = dispatcher.arity();
        Value::Function(Callable::from_arc(
            &name,
            arity,
            Arc::new(move |receiver: &Value, args: Vec<Value>| dispatcher.call_with(receiver, args)),
        ))
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.inner.name)
            .field("arity", &self.inner.arity)
            .field("description", &self.inner.description)
            .finish()
    }
}
