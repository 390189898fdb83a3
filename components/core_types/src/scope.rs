//! Lexical scope frames captured by closures.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::{JsString, Object, Value};

/// Bindings of one scope frame.
#[derive(Default)]
pub struct ScopeData {
    names: Vec<JsString>,
    values: Vec<Value>,
    object: Option<Object>,
    outer: Option<Scope>,
}

impl ScopeData {
    /// Declared binding names, parallel to [`ScopeData::values`].
    pub fn names(&self) -> &[JsString] {
        &self.names
    }

    /// Binding values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Object whose properties act as bindings (global or `with` scopes).
    pub fn object(&self) -> Option<&Object> {
        self.object.as_ref()
    }

    /// Enclosing scope.
    pub fn outer(&self) -> Option<&Scope> {
        self.outer.as_ref()
    }
}

/// A shared, mutable scope frame.
///
/// # Examples
///
/// ```
/// use core_types::{Scope, Value};
///
/// let global = Scope::new(None);
/// global.declare("x", Value::Smi(1));
/// let inner = Scope::new(Some(global.clone()));
/// assert_eq!(inner.lookup("x"), Some(Value::Smi(1)));
/// ```
#[derive(Clone)]
pub struct Scope(Rc<RefCell<ScopeData>>);

impl Scope {
    /// Creates an empty frame nested in `outer`.
    pub fn new(outer: Option<Scope>) -> Self {
        Scope(Rc::new(RefCell::new(ScopeData {
            outer,
            ..ScopeData::default()
        })))
    }

    /// Creates a frame backed by an object's properties.
    pub fn with_object(object: Object, outer: Option<Scope>) -> Self {
        Scope(Rc::new(RefCell::new(ScopeData {
            object: Some(object),
            outer,
            ..ScopeData::default()
        })))
    }

    /// Identity of this frame.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Read access to the frame.
    pub fn data(&self) -> Ref<'_, ScopeData> {
        self.0.borrow()
    }

    /// Declares (or redeclares) a binding in this frame and returns its slot.
    pub fn declare(&self, name: &str, value: Value) -> usize {
        let name = JsString::from(name);
        let mut data = self.0.borrow_mut();
        if let Some(slot) = data.names.iter().position(|n| *n == name) {
            data.values[slot] = value;
            return slot;
        }
        data.names.push(name);
        data.values.push(value);
        data.values.len() - 1
    }

    /// Resolves a binding through this frame and its outer frames.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            let (found, object, outer) = {
                let data = scope.data();
                let found = data
                    .names
                    .iter()
                    .position(|n| *n == name)
                    .map(|slot| data.values[slot].clone());
                (found, data.object.clone(), data.outer.clone())
            };
            if found.is_some() {
                return found;
            }
            if let Some(object) = object {
                if object.has_property(name) {
                    return Some(object.get(name));
                }
            }
            current = outer;
        }
        None
    }

    /// Assigns to an existing binding; returns false if none was found.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            let object = {
                let mut data = scope.0.borrow_mut();
                if let Some(slot) = data.names.iter().position(|n| *n == name) {
                    data.values[slot] = value;
                    return true;
                }
                data.object.clone()
            };
            if let Some(object) = object {
                if object.has_property(name) {
                    return object.set(name, value);
                }
            }
            current = scope.data().outer.clone();
        }
        false
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        f.debug_struct("Scope")
            .field("names", &data.names)
            .field("has_object", &data.object.is_some())
            .field("has_outer", &data.outer.is_some())
            .finish()
    }
}
