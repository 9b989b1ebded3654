//! Error types for the dispatch engine.
//!
//! Configuration mistakes (unknown types, empty functions) surface while
//! types are registered or dispatchers are compiled. Only argument mismatches
//! and failures raised by implementations surface at call time.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced by registries, the signature compiler and dispatchers
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum DynamoError {
    #[error("Unknown type \"{name}\"")]
    #[diagnostic(
        code(dynamo::unknown_type),
        help("Register a guard for this type with `add_type`, or enable `autoadd`")
    )]
    UnknownType { name: String },

    #[error("No signatures provided for function \"{function}\"")]
    #[diagnostic(
        code(dynamo::no_signatures),
        help("Define at least one signature before compiling the function")
    )]
    NoSignatures { function: String },

    #[error("Parameter declares no types")]
    #[diagnostic(
        code(dynamo::empty_parameter),
        help("Every parameter position needs at least one type tag; use `TypeTag::any()` to accept anything")
    )]
    EmptyParameter,

    #[error("Unexpected type of arguments. Expected {expected}.")]
    #[diagnostic(
        code(dynamo::dispatch_mismatch),
        help("Function {function} was called with ({found})")
    )]
    DispatchMismatch {
        function: String,
        expected: String,
        found: String,
    },

    #[error("Too many arguments in function {function} (expected: 0, actual: {found})")]
    #[diagnostic(
        code(dynamo::arity),
        help("Every signature of {function} takes no arguments")
    )]
    Arity { function: String, found: usize },

    #[error("{message}")]
    #[diagnostic(code(dynamo::method))]
    Method { message: String },
}

impl DynamoError {
    /// Create an unknown type error
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    /// Create an error for a function compiled without signatures
    pub fn no_signatures(function: impl Into<String>) -> Self {
        Self::NoSignatures {
            function: function.into(),
        }
    }

    /// Create a dispatch mismatch error
    ///
    /// `found` lists the runtime type names of the rejected arguments.
    pub fn dispatch_mismatch(function: &str, expected: &str, found: Vec<&str>) -> Self {
        Self::DispatchMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            found: found.join(", "),
        }
    }

    /// Create an arity error for a nullary function called with arguments
    pub fn arity(function: &str, found: usize) -> Self {
        Self::Arity {
            function: function.to_string(),
            found,
        }
    }

    /// Create an error raised from inside a method implementation
    pub fn method(message: impl Into<String>) -> Self {
        Self::Method {
            message: message.into(),
        }
    }
}

/// Type alias for dispatch results
pub type Result<T> = std::result::Result<T, DynamoError>;
