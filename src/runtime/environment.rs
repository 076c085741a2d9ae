use crate::language::{scope::ScopeKind, token::Token};
use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    value::Value,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope. Closures and bound methods keep their scope
/// alive by holding one of these after the block that created it exits.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> EnvRef {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn enclosed(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(enclosing)),
        }))
    }

    /// Opens the runtime counterpart of a resolver scope. Superclass and
    /// receiver scopes bind their implicit name to `implicit`.
    pub fn open(parent: &EnvRef, kind: ScopeKind, implicit: Option<Value>) -> EnvRef {
        let env = Self::enclosed(parent);
        if let (Some(name), Some(value)) = (kind.implicit_binding(), implicit) {
            env.borrow_mut().define(name, value);
        }
        env
    }

    /// Binds `name` in this scope, replacing any previous binding here.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &Token) -> RuntimeResult<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get(name),
            None => Err(RuntimeError::UndefinedVariable {
                token: name.clone(),
            }),
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> RuntimeResult<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            return Ok(());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(RuntimeError::UndefinedVariable {
                token: name.clone(),
            }),
        }
    }

    /// Looks up `name` in this scope only.
    pub fn get_here(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Names bound in this scope only.
    pub fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Reads `name` exactly `distance` scopes out, without searching.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> RuntimeResult<Value> {
        Self::ancestor(env, distance)
            .and_then(|scope| scope.borrow().get_here(&name.lexeme))
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                token: name.clone(),
            })
    }

    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> RuntimeResult<()> {
        let scope = Self::ancestor(env, distance).ok_or_else(|| RuntimeError::UndefinedVariable {
            token: name.clone(),
        })?;
        let mut scope = scope.borrow_mut();
        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::UndefinedVariable {
                token: name.clone(),
            }),
        }
    }

    fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let next = current.borrow().enclosing.clone()?;
            current = next;
        }
        Some(current)
    }
}
