// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope (doesn't walk parent chain)
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a symbol in THIS scope and parent scopes recursively
    pub fn get(&self, name: &str) -> Option<Value> {
        // First check this scope
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }

        // Then check parent scope
        if let Some(ref parent) = self.parent {
            return parent.get(name);
        }

        None
    }

    /// Mutates an existing binding in the nearest frame that owns it.
    /// Fails if no frame in the chain holds `name` (`set!: Unbound
    /// variable`) — `set!` never creates a new binding.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }

        if let Some(ref parent) = self.parent {
            return parent.set(name, value);
        }

        Err(EvalError::SetUnboundVariable(name.to_string()))
    }
}
