//! Guard combinators
//!
//! Pure builders for the predicates and converters the dispatcher runs on
//! every call. Every builder does its work once, up front: the returned
//! closures capture pre-extracted guard and converter lists and special-case
//! the short lists that dominate real signatures.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

type GuardFn = dyn Fn(&Value) -> bool + Send + Sync;
type ArgsGuardFn = dyn Fn(&[Value]) -> bool + Send + Sync;
type ConvertFn = dyn Fn(Value) -> Value + Send + Sync;
type ArgsConvertFn = dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync;

/// Predicate testing whether a value belongs to a type
#[derive(Clone)]
pub struct Guard(Arc<GuardFn>);

impl Guard {
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Guard(Arc::new(test))
    }

    /// Guard that accepts everything
    pub fn always() -> Self {
        Guard::new(|_| true)
    }

    /// Guard that rejects everything
    pub fn never() -> Self {
        Guard::new(|_| false)
    }

    #[inline]
    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}

/// Predicate over a whole argument list
#[derive(Clone)]
pub struct ArgsGuard(Arc<ArgsGuardFn>);

impl ArgsGuard {
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        ArgsGuard(Arc::new(test))
    }

    #[inline]
    pub fn test(&self, args: &[Value]) -> bool {
        (self.0)(args)
    }
}

impl fmt::Debug for ArgsGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ArgsGuard")
    }
}

/// Value conversion; `None` marks the identity so callers can skip it
#[derive(Clone, Default)]
pub struct Converter(Option<Arc<ConvertFn>>);

impl Converter {
    pub fn new<F>(convert: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Converter(Some(Arc::new(convert)))
    }

    pub fn identity() -> Self {
        Converter(None)
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn apply(&self, value: Value) -> Value {
        match &self.0 {
            Some(convert) => convert(value),
            None => value,
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            f.write_str("Converter(identity)")
        } else {
            f.write_str("Converter")
        }
    }
}

/// Argument list conversion; `None` marks the identity
#[derive(Clone, Default)]
pub struct ArgsConverter(Option<Arc<ArgsConvertFn>>);

impl ArgsConverter {
    pub fn identity() -> Self {
        ArgsConverter(None)
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn apply(&self, args: Vec<Value>) -> Vec<Value> {
        match &self.0 {
            Some(convert) => convert(args),
            None => args,
        }
    }
}

impl fmt::Debug for ArgsConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            f.write_str("ArgsConverter(identity)")
        } else {
            f.write_str("ArgsConverter")
        }
    }
}

/// True if any guard passes
///
/// A single guard is returned as is. An empty list never matches.
pub fn union(guards: Vec<Guard>) -> Guard {
    match guards.len() {
        0 => Guard::never(),
        1 => guards.into_iter().next().unwrap_or_else(Guard::never),
        2 => {
            let (g0, g1) = (guards[0].clone(), guards[1].clone());
            Guard::new(move |x| g0.test(x) || g1.test(x))
        }
        _ => {
            let g0 = guards[0].clone();
            let g1 = guards[1].clone();
            let rest: Arc<[Guard]> = guards[2..].into();
            Guard::new(move |x| {
                if g0.test(x) || g1.test(x) {
                    return true;
                }
                rest.iter().any(|g| g.test(x))
            })
        }
    }
}

/// True if all guards pass, evaluated in order
///
/// A single guard is returned as is. An empty list always matches.
pub fn intersect(guards: Vec<Guard>) -> Guard {
    match guards.len() {
        0 => Guard::always(),
        1 => guards.into_iter().next().unwrap_or_else(Guard::always),
        2 => {
            let (g0, g1) = (guards[0].clone(), guards[1].clone());
            Guard::new(move |x| g0.test(x) && g1.test(x))
        }
        _ => {
            let g0 = guards[0].clone();
            let g1 = guards[1].clone();
            let rest: Arc<[Guard]> = guards[2..].into();
            Guard::new(move |x| {
                if !g0.test(x) || !g1.test(x) {
                    return false;
                }
                rest.iter().all(|g| g.test(x))
            })
        }
    }
}

/// Argument list of exactly `guards.len()` values where `guards[i]` passes
/// for value `i`
pub fn tuple(guards: Vec<Guard>) -> ArgsGuard {
    let len = guards.len();
    match len {
        0 => ArgsGuard::new(|args| args.is_empty()),
        1 => {
            let g0 = guards[0].clone();
            ArgsGuard::new(move |args| args.len() == 1 && g0.test(&args[0]))
        }
        2 => {
            let (g0, g1) = (guards[0].clone(), guards[1].clone());
            ArgsGuard::new(move |args| args.len() == 2 && g0.test(&args[0]) && g1.test(&args[1]))
        }
        _ => {
            let guards: Arc<[Guard]> = guards.into();
            ArgsGuard::new(move |args| {
                args.len() == len && guards.iter().zip(args).all(|(g, arg)| g.test(arg))
            })
        }
    }
}

/// Convert a value with the converter paired to the first passing guard
///
/// Values no guard accepts are returned unchanged; callers only reach this
/// after the matching union guard has passed.
pub fn match_first(guards: Vec<Guard>, converters: Vec<Converter>) -> Converter {
    let len = guards.len().min(converters.len());
    if len == 0 || converters[..len].iter().all(Converter::is_identity) {
        return Converter::identity();
    }

    if len == 1 {
        let (g0, c0) = (guards[0].clone(), converters[0].clone());
        return Converter::new(move |x| if g0.test(&x) { c0.apply(x) } else { x });
    }

    let cases: Arc<[(Guard, Converter)]> = guards.into_iter().zip(converters).take(len).collect();
    Converter::new(move |x| match cases.iter().find(|(g, _)| g.test(&x)) {
        Some((_, convert)) => convert.apply(x),
        None => x,
    })
}

/// Apply `converters[i]` to argument `i`, in place
///
/// Returns the identity pipeline when every converter is the identity.
pub fn mapper(converters: Vec<Converter>) -> ArgsConverter {
    if converters.iter().all(Converter::is_identity) {
        return ArgsConverter::identity();
    }

    let converters: Arc<[Converter]> = converters.into();
    ArgsConverter(Some(Arc::new(move |mut args: Vec<Value>| {
        for (arg, convert) in args.iter_mut().zip(converters.iter()) {
            if !convert.is_identity() {
                let value = std::mem::replace(arg, Value::Undefined);
                *arg = convert.apply(value);
            }
        }
        args
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_number() -> Guard {
        Guard::new(|x| matches!(x, Value::Number(_)))
    }

    fn is_string() -> Guard {
        Guard::new(|x| matches!(x, Value::String(_)))
    }

    fn is_boolean() -> Guard {
        Guard::new(|x| matches!(x, Value::Boolean(_)))
    }

    fn is_positive() -> Guard {
        Guard::new(|x| x.as_number().is_some_and(|n| n > 0.0))
    }

    #[test]
    fn test_union() {
        let guard = union(vec![is_number(), is_string(), is_boolean()]);

        assert!(guard.test(&Value::Number(1.0)));
        assert!(guard.test(&Value::string("x")));
        assert!(guard.test(&Value::Boolean(false)));
        assert!(!guard.test(&Value::Null));
        assert!(!union(vec![]).test(&Value::Null));
    }

    #[test]
    fn test_intersect() {
        let guard = intersect(vec![is_number(), is_positive()]);

        assert!(guard.test(&Value::Number(1.0)));
        assert!(!guard.test(&Value::Number(-1.0)));
        assert!(!guard.test(&Value::string("1")));
        assert!(intersect(vec![]).test(&Value::Null));
    }

    #[test]
    fn test_intersect_short_circuits_in_order() {
        // The refinement would panic on non-numbers if it ever ran first
        let refinement = Guard::new(|x| match x {
            Value::Number(n) => *n > 0.0,
            other => panic!("refinement ran before base guard on {other}"),
        });
        let guard = intersect(vec![is_number(), refinement, Guard::always()]);

        assert!(!guard.test(&Value::string("x")));
        assert!(guard.test(&Value::Number(3.0)));
    }

    #[test]
    fn test_tuple_checks_length_and_positions() {
        let pair = tuple(vec![is_number(), is_string()]);

        assert!(pair.test(&[Value::Number(1.0), Value::string("a")]));
        assert!(!pair.test(&[Value::string("a"), Value::Number(1.0)]));
        assert!(!pair.test(&[Value::Number(1.0)]));
        assert!(!pair.test(&[Value::Number(1.0), Value::string("a"), Value::Null]));

        let triple = tuple(vec![is_number(), is_number(), is_number()]);
        assert!(triple.test(&[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]));
        assert!(!triple.test(&[Value::Number(1.0), Value::Number(2.0)]));
    }

    #[test]
    fn test_empty_tuple() {
        let empty = tuple(vec![]);

        assert!(empty.test(&[]));
        assert!(!empty.test(&[Value::Undefined]));
    }

    #[test]
    fn test_match_first_picks_converter_of_matching_guard() {
        let convert = match_first(
            vec![is_string(), is_number(), is_boolean()],
            vec![
                Converter::identity(),
                Converter::new(|x| Value::string(format!("n:{x}"))),
                Converter::new(|x| Value::string(format!("b:{x}"))),
            ],
        );

        assert!(!convert.is_identity());
        assert_eq!(convert.apply(Value::string("s")), Value::string("s"));
        assert_eq!(convert.apply(Value::Number(2.0)), Value::string("n:2"));
        assert_eq!(convert.apply(Value::Boolean(true)), Value::string("b:true"));
        assert_eq!(convert.apply(Value::Null), Value::Null);
    }

    #[test]
    fn test_match_first_all_identity_is_identity() {
        let convert = match_first(
            vec![is_string(), is_number()],
            vec![Converter::identity(), Converter::identity()],
        );
        assert!(convert.is_identity());
    }

    #[test]
    fn test_mapper() {
        let double = Converter::new(|x| Value::Number(x.as_number().unwrap_or(0.0) * 2.0));
        let convert = mapper(vec![Converter::identity(), double]);

        assert_eq!(
            convert.apply(vec![Value::Number(1.0), Value::Number(2.0)]),
            vec![Value::Number(1.0), Value::Number(4.0)]
        );
        assert!(mapper(vec![Converter::identity(), Converter::identity()]).is_identity());
        assert!(mapper(vec![]).is_identity());
    }
}
