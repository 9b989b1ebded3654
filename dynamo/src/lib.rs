//! Dynamo - runtime multiple dispatch
//!
//! Builds a single callable out of several typed implementations of one
//! logical function. At call time the callable picks the first signature
//! whose parameter types match the runtime types of the arguments, applies
//! any declared conversions and invokes that implementation.
//!
//! ## Architecture
//!
//! - **Type Registry**: type tag -> guards, plus the conversion graph
//! - **Guard Combinators**: union, intersection, tuple and converter builders
//! - **Signature Compiler**: turns declared parameter unions into one tuple
//!   guard and one argument converter per signature
//! - **Conversion Resolution**: widens a position with the direct sources of
//!   conversions into its declared types
//! - **Dispatcher**: tries compiled signatures in declaration order
//!
//! ```
//! use dynamo::{Dynamo, TypeTag, Value};
//!
//! let mut dynamo = Dynamo::new();
//! dynamo
//!     .define("add", [TypeTag::number(), TypeTag::number()], |_, args| {
//!         let a = args[0].as_number().unwrap_or_default();
//!         let b = args[1].as_number().unwrap_or_default();
//!         Ok(Value::Number(a + b))
//!     })
//!     .define("add", [TypeTag::string(), TypeTag::string()], |_, args| {
//!         Ok(Value::string(format!("{}{}", args[0], args[1])))
//!     });
//!
//! let add = dynamo.compile("add").unwrap();
//! assert_eq!(add.call(vec![2.into(), 3.into()]).unwrap(), Value::Number(5.0));
//! assert_eq!(add.call(vec!["x".into(), "y".into()]).unwrap(), Value::string("xy"));
//! assert!(add.call(vec![2.into(), "y".into()]).is_err());
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod conversion;
pub mod defaults;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod guards;
pub mod registry;
pub mod signature;
pub mod types;
pub mod value;

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

// Re-export public API
pub use conversion::{Conversion, ConversionGraph, Widened, widen};
pub use defaults::DefaultTypes;
pub use dispatch::Dispatcher;
pub use environment::{Definition, Dynamo, FunctionDef, Options, TypeSeed};
pub use error::{DynamoError, Result};
pub use guards::{ArgsConverter, ArgsGuard, Converter, Guard, intersect, mapper, match_first, tuple, union};
pub use registry::{TypeRegistry, combine_guards};
pub use signature::{
    CompiledParameter, CompiledSignature, Method, Parameter, Signature, compile_parameter,
    compile_signature,
};
pub use types::{TagId, TypeTag};
pub use value::{Callable, Instance, Pattern, Value};
