use crate::language::{scope::INITIALIZER, token::Token};
use crate::runtime::{
    callable::Callable,
    error::{RuntimeError, RuntimeResult},
    function::Function,
    interpreter::Interpreter,
    value::Value,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub struct Class {
    pub name: String,
    superclass: Option<Rc<Class>>,
    methods: HashMap<String, Rc<Function>>,
    static_methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(
        name: impl Into<String>,
        superclass: Option<Rc<Class>>,
        methods: HashMap<String, Rc<Function>>,
        static_methods: HashMap<String, Rc<Function>>,
    ) -> Self {
        Self {
            name: name.into(),
            superclass,
            methods,
            static_methods,
        }
    }

    /// Instance method lookup; the nearest class in the chain wins.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self.superclass.as_ref()?.find_method(name),
        }
    }

    pub fn find_static_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.static_methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self.superclass.as_ref()?.find_static_method(name),
        }
    }

    pub fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map(|init| init.arity())
            .unwrap_or(0)
    }

    /// Calling a class allocates an instance and runs `init` on it when one
    /// exists. The result is always the instance.
    pub fn construct(
        class: &Rc<Class>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> RuntimeResult<Value> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(class))));
        if let Some(init) = class.find_method(INITIALIZER) {
            init.bind(&instance).call(interpreter, arguments, paren)?;
        }
        Ok(Value::Instance(instance))
    }

    /// Property read on the class itself: only static methods are visible.
    pub fn get(&self, name: &Token) -> RuntimeResult<Value> {
        self.find_static_method(&name.lexeme)
            .map(|method| Value::Callable(Callable::Function(method)))
            .ok_or_else(|| RuntimeError::UndefinedProperty {
                token: name.clone(),
            })
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

pub type InstanceRef = Rc<RefCell<Instance>>;

pub struct Instance {
    class: Rc<Class>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    /// Fields shadow methods. Methods come back bound to `instance`.
    pub fn get(instance: &InstanceRef, name: &Token) -> RuntimeResult<Value> {
        let this = instance.borrow();
        if let Some(value) = this.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(method) = this.class.find_method(&name.lexeme) {
            let bound = method.bind(instance);
            return Ok(Value::Callable(Callable::Function(Rc::new(bound))));
        }
        if this.class.find_static_method(&name.lexeme).is_some() {
            return Err(RuntimeError::StaticMethodOnInstance {
                token: name.clone(),
            });
        }
        Err(RuntimeError::UndefinedProperty {
            token: name.clone(),
        })
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

// Fields may refer back to the instance, so only the shape is printed.
impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        fields.sort_unstable();
        write!(f, "<{} instance {:?}>", self.class.name, fields)
    }
}
