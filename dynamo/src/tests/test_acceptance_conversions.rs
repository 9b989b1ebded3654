//! Conversions widening declared parameter types

use crate::{Dynamo, DynamoError, FunctionDef, TypeTag, Value};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct Boxed {
    value: Value,
    kind: &'static str,
}

impl Boxed {
    fn inspect(&self) -> String {
        format!("boxed value {} is a {}", self.value, self.kind)
    }
}

fn boxed(value: Value, kind: &'static str) -> Value {
    Value::instance(Boxed { value, kind })
}

fn boxing_dynamo() -> Dynamo {
    super::init_tracing();
    let boxed_tag = TypeTag::of::<Boxed>();
    let mut dynamo = Dynamo::new();
    dynamo
        .add_type(&boxed_tag, |x| x.downcast_ref::<Boxed>().is_some())
        .add_conversion(&TypeTag::boolean(), &boxed_tag, |x| boxed(x, "boolean"))
        .add_conversion(&TypeTag::number(), &boxed_tag, |x| boxed(x, "number"));
    dynamo
}

fn inspect() -> FunctionDef {
    FunctionDef::new("inspect")
        .signature([TypeTag::string()], |_, args| {
            Ok(Value::string(format!("unboxed value {} is a string", args[0])))
        })
        .signature([TypeTag::of::<Boxed>()], |_, args| {
            let inner = args[0].downcast_ref::<Boxed>().map(Boxed::inspect).unwrap_or_default();
            Ok(Value::string(inner))
        })
        .signature([TypeTag::unknown()], |_, args| {
            Ok(Value::string(format!("value {} is unknown", args[0])))
        })
}

#[test]
fn test_calls_without_conversion() {
    let f = boxing_dynamo().function(&inspect()).unwrap();

    assert_eq!(
        f.call(vec![boxed(Value::Boolean(true), "boolean")]).unwrap(),
        Value::string("boxed value true is a boolean")
    );
    assert_eq!(
        f.call(vec![boxed(Value::Number(3.0), "number")]).unwrap(),
        Value::string("boxed value 3 is a number")
    );
    assert_eq!(f.call(vec![Value::string("Y")]).unwrap(), Value::string("unboxed value Y is a string"));
    assert_eq!(
        f.call(vec![Value::object::<&str>([])]).unwrap(),
        Value::string("value [object Object] is unknown")
    );
}

#[test]
fn test_calls_with_conversion() {
    let f = boxing_dynamo().function(&inspect()).unwrap();

    assert_eq!(f.call(vec![Value::Boolean(true)]).unwrap(), Value::string("boxed value true is a boolean"));
    assert_eq!(f.call(vec![Value::Number(3.0)]).unwrap(), Value::string("boxed value 3 is a number"));
    assert_eq!(f.description(), "[String] or [Boxed|Boolean|Number] or [Any]");
}

#[test]
fn test_conversion_only_applies_to_unmatched_declared_types() {
    let mut dynamo = Dynamo::new();
    dynamo.add_conversion(&TypeTag::boolean(), &TypeTag::number(), |x| {
        Value::Number(if x.is_truthy() { 1.0 } else { 0.0 })
    });
    let double = dynamo
        .function(&FunctionDef::new("double").signature([TypeTag::number()], |_, args| {
            Ok(Value::Number(args[0].as_number().unwrap_or_default() * 2.0))
        }))
        .unwrap();

    assert_eq!(double.call(vec![Value::Number(4.0)]).unwrap(), Value::Number(8.0));
    assert_eq!(double.call(vec![Value::Boolean(true)]).unwrap(), Value::Number(2.0));
    assert_eq!(double.call(vec![Value::Boolean(false)]).unwrap(), Value::Number(0.0));
    assert!(matches!(
        double.call(vec![Value::string("4")]),
        Err(DynamoError::DispatchMismatch { .. })
    ));
}

#[test]
fn test_conversions_are_not_chained() {
    let (a, b, c) = (TypeTag::new("A"), TypeTag::new("B"), TypeTag::new("C"));
    let mut dynamo = Dynamo::empty();
    dynamo
        .add_type(&a, |x| x.as_str() == Some("a"))
        .add_type(&b, |x| x.as_str() == Some("b"))
        .add_type(&c, |x| x.as_str() == Some("c"))
        .add_conversion(&a, &b, |_| Value::string("b"))
        .add_conversion(&b, &c, |_| Value::string("c"));

    let f = dynamo
        .function(&FunctionDef::new("f").signature([c.clone()], |_, args| Ok(args[0].clone())))
        .unwrap();

    assert_eq!(f.call(vec![Value::string("b")]).unwrap(), Value::string("c"));
    let err = f.call(vec![Value::string("a")]).unwrap_err();
    assert_eq!(err.to_string(), "Unexpected type of arguments. Expected [C|B].");
}

#[test]
fn test_registering_after_compilation_does_not_affect_dispatcher() {
    let mut dynamo = Dynamo::new();
    let def = FunctionDef::new("f").signature([TypeTag::number()], |_, args| Ok(args[0].clone()));
    let before = dynamo.function(&def).unwrap();

    dynamo.add_conversion(&TypeTag::string(), &TypeTag::number(), |x| {
        Value::Number(x.as_str().and_then(|s| s.parse().ok()).unwrap_or(f64::NAN))
    });
    let after = dynamo.function(&def).unwrap();

    assert!(before.call(vec![Value::string("2")]).is_err());
    assert_eq!(after.call(vec![Value::string("2")]).unwrap(), Value::Number(2.0));
    assert_eq!(before.description(), "[Number]");
    assert_eq!(after.description(), "[Number|String]");
}
