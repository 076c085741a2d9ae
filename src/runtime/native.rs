use crate::runtime::{callable::Callable, environment::EnvRef, value::Value};
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    function: fn(&[Value]) -> Value,
}

impl NativeFunction {
    pub fn call(&self, arguments: &[Value]) -> Value {
        (self.function)(arguments)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

const NATIVES: &[NativeFunction] = &[NativeFunction {
    name: "clock",
    arity: 0,
    function: clock,
}];

/// Defines every native function in `globals`.
pub fn install(globals: &EnvRef) {
    let mut globals = globals.borrow_mut();
    for native in NATIVES {
        let function = Rc::new(native.clone());
        globals.define(native.name, Value::Callable(Callable::Native(function)));
    }
}

fn clock(_: &[Value]) -> Value {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default();
    Value::Number(seconds)
}
