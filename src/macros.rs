// ABOUTME: Macro table mapping transformer names to registered closures

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Closure;

/// Process-global (per interpreter instance) mapping from identifier
/// to the `Closure` used as its rewrite rule. Populated by
/// `define-macro`, consulted by the expander. Cheap to clone — every
/// clone shares the same underlying table, which is how the
/// analyzer's `define-macro` closure and the expander both observe
/// the same mutations.
#[derive(Clone)]
pub struct MacroTable(Rc<RefCell<HashMap<String, Rc<Closure>>>>);

impl MacroTable {
    pub fn new() -> Self {
        MacroTable(Rc::new(RefCell::new(HashMap::new())))
    }

    pub fn define(&self, name: String, transformer: Rc<Closure>) {
        self.0.borrow_mut().insert(name, transformer);
    }

    pub fn get(&self, name: &str) -> Option<Rc<Closure>> {
        self.0.borrow().get(name).cloned()
    }
}

impl Default for MacroTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzed;
    use crate::env::Environment;
    use crate::trampoline::Trampoline;
    use crate::value::Value;

    fn dummy_closure() -> Rc<Closure> {
        let body: Analyzed = Rc::new(|_env| Trampoline::done(Value::Nil));
        Rc::new(Closure {
            params: vec!["x".to_string()],
            rest: None,
            body,
            captured_env: Environment::new(),
            name: Some("test-macro".to_string()),
        })
    }

    #[test]
    fn test_define_and_get() {
        let table = MacroTable::new();
        table.define("test-macro".to_string(), dummy_closure());
        assert!(table.get("test-macro").is_some());
    }

    #[test]
    fn test_get_undefined() {
        let table = MacroTable::new();
        assert!(table.get("undefined").is_none());
    }

    #[test]
    fn test_clones_share_table() {
        let table = MacroTable::new();
        let clone = table.clone();
        clone.define("test-macro".to_string(), dummy_closure());
        assert!(table.get("test-macro").is_some());
    }
}
