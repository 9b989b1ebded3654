//! Runtime value representation for dispatched functions.
//!
//! This module defines the Value enum that every guard, converter and method
//! implementation operates on, along with helpers for inspecting values,
//! rendering them and wrapping native Rust data as class instances.

use crate::error::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Signature of a native function body: receiver plus positional arguments
pub type NativeFn = dyn Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync;

/// Runtime values seen by dispatched functions
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value
    Undefined,
    /// Explicit null
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit floating point number
    Number(f64),
    /// Wide integer
    BigInt(i128),
    /// UTF-8 string
    String(String),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// Plain record with insertion-ordered keys
    Object(IndexMap<String, Value>),
    /// Invocable value
    Function(Callable),
    /// Point in time
    Date(DateTime<Utc>),
    /// Compiled regular expression
    RegExp(Pattern),
    /// Instance of a user-defined class
    Instance(Instance),
}

impl Value {
    /// Build a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Build a plain record from key/value pairs
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap native data as a class instance
    pub fn instance<T: Any + Send + Sync>(data: T) -> Self {
        Value::Instance(Instance::new(data))
    }

    /// Build a native function value
    pub fn function<F>(name: &str, arity: usize, function: F) -> Self
    where
        F: Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Value::Function(Callable::new(name, arity, function))
    }

    /// Compile a regular expression value
    pub fn regexp(source: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Value::RegExp(Pattern::new(source)?))
    }

    /// Current wall-clock time as a date value
    pub fn now() -> Self {
        Value::Date(Utc::now())
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::BigInt(_) => "BigInt",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Function(_) => "Function",
            Value::Date(_) => "Date",
            Value::RegExp(_) => "RegExp",
            Value::Instance(instance) => instance.class_name(),
        }
    }

    /// Check if this value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<i128> {
        match self {
            Value::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Function(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Value::RegExp(pattern) => Some(pattern),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Borrow the native data of an instance value as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_instance()?.downcast_ref::<T>()
    }

    /// Convert to string representation
    ///
    /// Follows the usual dynamic-language rendering: integral numbers print
    /// without a fraction, arrays join their items with `,` and plain records
    /// render as `[object Object]`.
    pub fn to_string_repr(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_string_repr(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(callable) => format!("[Function: {}]", callable.name()),
            Value::Date(date) => date.to_rfc3339(),
            Value::RegExp(pattern) => pattern.to_string(),
            Value::Instance(instance) => format!("[object {}]", instance.class_name()),
        }
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string() // -0 renders as 0
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_repr())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Value::Date(date)
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Value::Function(callable)
    }
}

/// A named native function that can be stored inside a `Value`
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    arity: usize,
    function: Arc<NativeFn>,
}

impl Callable {
    pub fn new<F>(name: &str, arity: usize, function: F) -> Self
    where
        F: Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::from_arc(name, arity, Arc::new(function))
    }

    pub(crate) fn from_arc(name: &str, arity: usize, function: Arc<NativeFn>) -> Self {
        Self {
            name: Arc::from(name),
            arity,
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter count
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke with `undefined` as the receiver
    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        (self.function)(&Value::Undefined, args)
    }

    pub fn call_with(&self, receiver: &Value, args: Vec<Value>) -> Result<Value> {
        (self.function)(receiver, args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

// Functions compare by identity
impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
    }
}

/// Regular expression payload
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
        })
    }

    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source())
    }
}

/// Native Rust data carried as an instance of a user-defined class
///
/// The class identity is the Rust type of the wrapped data.
#[derive(Clone)]
pub struct Instance {
    class: Arc<str>,
    data: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self {
            class: Arc::from(short_type_name::<T>()),
            data: Arc::new(data),
        }
    }

    /// Unqualified name of the wrapped Rust type
    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn class_id(&self) -> TypeId {
        (*self.data).type_id()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.class_id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

// Instances compare by identity
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// `std::any::type_name` with every path stripped
///
/// `a::b::Person` -> `Person`, `alloc::vec::Vec<a::P>` -> `Vec<P>`,
/// `(a::P, a::Q)` -> `(P, Q)`.
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut short = String::with_capacity(full.len());
    let mut segment = 0;
    let mut rest = full;
    while let Some(c) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("::") {
            short.truncate(segment);
            rest = tail;
            continue;
        }
        short.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment = short.len();
        }
        rest = &rest[c.len_utf8()..];
    }
    short
}
