use crate::language::{
    ast::FunctionDecl,
    scope::{ScopeKind, THIS},
    token::Token,
};
use crate::runtime::{
    class::InstanceRef,
    environment::{EnvRef, Environment},
    error::{RuntimeError, RuntimeResult},
    interpreter::{FlowSignal, Interpreter},
    value::Value,
};
use std::fmt;
use std::rc::Rc;

/// A declared function or method together with the scope it closes over.
pub struct Function {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Method specialised to `instance`: same body, with `this` fixed in a
    /// scope between the class scope and the call scope.
    pub fn bind(&self, instance: &InstanceRef) -> Function {
        let receiver = Environment::open(
            &self.closure,
            ScopeKind::Receiver,
            Some(Value::Instance(Rc::clone(instance))),
        );
        Function::new(Rc::clone(&self.declaration), receiver, self.is_initializer)
    }

    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        _paren: &Token,
    ) -> RuntimeResult<Value> {
        let env = Environment::open(&self.closure, ScopeKind::Call, None);
        {
            let mut frame = env.borrow_mut();
            for (param, argument) in self.declaration.params.iter().zip(arguments) {
                frame.define(param.lexeme.clone(), argument);
            }
        }

        let returned = match interpreter.execute_block(&self.declaration.body, env)? {
            None => Value::Nil,
            Some(FlowSignal::Return(value)) => value,
            Some(FlowSignal::Break(keyword) | FlowSignal::Continue(keyword)) => {
                return Err(RuntimeError::LoopControlOutsideLoop { token: keyword })
            }
        };

        if self.is_initializer {
            if let Some(this) = self.closure.borrow().get_here(THIS) {
                return Ok(this);
            }
        }
        Ok(returned)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
