//! Compiled dispatchers shared across threads

use crate::{Dispatcher, Dynamo, FunctionDef, TypeTag, Value};
use std::thread;

fn add() -> Dispatcher {
    let mut dynamo = Dynamo::new();
    dynamo.add_conversion(&TypeTag::boolean(), &TypeTag::number(), |x| {
        Value::Number(if x.is_truthy() { 1.0 } else { 0.0 })
    });
    dynamo
        .function(
            &FunctionDef::new("add")
                .signature([TypeTag::number(), TypeTag::number()], |_, args| {
                    let sum = args.iter().filter_map(Value::as_number).sum::<f64>();
                    Ok(Value::Number(sum))
                })
                .signature([TypeTag::string(), TypeTag::string()], |_, args| {
                    Ok(Value::string(format!("{}{}", args[0], args[1])))
                }),
        )
        .unwrap()
}

#[test]
fn test_dispatcher_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Dispatcher>();
    assert_send_sync::<Value>();
}

#[test]
fn test_concurrent_calls_agree() {
    let add = add();

    let handles: Vec<_> = (0..8i32)
        .map(|i| {
            let add = add.clone();
            thread::spawn(move || {
                let mut results = Vec::new();
                for j in 0..100i32 {
                    let n = f64::from(i * 100 + j);
                    results.push(add.call(vec![Value::Number(n), Value::Boolean(true)]));
                    results.push(add.call(vec![Value::string("a"), Value::string("b")]));
                }
                (i, results)
            })
        })
        .collect();

    for handle in handles {
        let (i, results) = handle.join().unwrap();
        for (j, pair) in results.chunks(2).enumerate() {
            let n = f64::from(i * 100 + j as i32);
            assert_eq!(pair[0].as_ref().unwrap(), &Value::Number(n + 1.0));
            assert_eq!(pair[1].as_ref().unwrap(), &Value::string("ab"));
        }
    }
}
