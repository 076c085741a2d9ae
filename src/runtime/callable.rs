use crate::language::token::Token;
use crate::runtime::{
    class::Class, error::RuntimeResult, function::Function, interpreter::Interpreter,
    native::NativeFunction, value::Value,
};
use std::fmt;
use std::rc::Rc;

/// Anything a call expression can invoke.
#[derive(Clone, Debug)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<Function>),
    Class(Rc<Class>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.arity(),
            Callable::Class(class) => class.arity(),
        }
    }

    /// Runs the call body. Arity has already been checked by the caller.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> RuntimeResult<Value> {
        match self {
            Callable::Native(native) => Ok(native.call(&arguments)),
            Callable::Function(function) => function.call(interpreter, arguments, paren),
            Callable::Class(class) => Class::construct(class, interpreter, arguments, paren),
        }
    }

    pub fn same_as(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
            Callable::Class(class) => write!(f, "{}", class.name),
        }
    }
}
