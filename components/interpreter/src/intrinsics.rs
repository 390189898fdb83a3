//! Built-in prototypes every runtime starts with.

use std::rc::Rc;

use core_types::{HostPrototypes, JsError, JsString, Object, PropertyFlags, Value};

/// Prototype objects shared by all objects a runtime creates.
///
/// Only the methods the object model itself relies on are installed; the
/// rest of the standard library lives elsewhere.
#[derive(Debug, Clone)]
pub struct Intrinsics {
    /// `Object.prototype`
    pub object_prototype: Object,
    /// `Function.prototype`
    pub function_prototype: Object,
    /// `Array.prototype`
    pub array_prototype: Object,
    /// `Map.prototype`
    pub map_prototype: Object,
    /// `Set.prototype`
    pub set_prototype: Object,
    /// Prototypes handed to wrapped host values
    pub host: Rc<HostPrototypes>,
}

impl Intrinsics {
    /// Creates a fresh set of prototypes.
    pub fn new() -> Self {
        let object_prototype = Object::plain(None);
        let function_prototype =
            Object::native_function("", |_, _| Ok(Value::Undefined), Some(object_prototype.clone()));

        let method = |name: &str, body: fn(&Value, &[Value]) -> Result<Value, JsError>| {
            Value::Object(Object::native_function(name, body, Some(function_prototype.clone())))
        };
        object_prototype.define_data_property("valueOf", method("valueOf", value_of), PropertyFlags::HIDDEN);
        object_prototype.define_data_property(
            "hasOwnProperty",
            method("hasOwnProperty", has_own_property),
            PropertyFlags::HIDDEN,
        );

        let array_prototype = Object::array(Vec::new(), Some(object_prototype.clone()));
        let map_prototype = Object::plain(Some(object_prototype.clone()));
        let set_prototype = Object::plain(Some(object_prototype.clone()));

        let host = Rc::new(HostPrototypes {
            object: Some(object_prototype.clone()),
            array: Some(array_prototype.clone()),
            function: Some(function_prototype.clone()),
        });

        Intrinsics {
            object_prototype,
            function_prototype,
            array_prototype,
            map_prototype,
            set_prototype,
            host,
        }
    }
}

impl Default for Intrinsics {
    fn default() -> Self {
        Self::new()
    }
}

fn value_of(this: &Value, _args: &[Value]) -> Result<Value, JsError> {
    match this {
        Value::Undefined | Value::Null => Err(JsError::type_error(
            "Cannot convert undefined or null to object",
        )),
        other => Ok(other.clone()),
    }
}

fn has_own_property(this: &Value, args: &[Value]) -> Result<Value, JsError> {
    let key: JsString = args.first().unwrap_or(&Value::Undefined).to_js_string();
    match this {
        Value::Object(object) => Ok(Value::Boolean(object.get_own_property(&key).is_some())),
        Value::Undefined | Value::Null => Err(JsError::type_error(
            "Cannot convert undefined or null to object",
        )),
        _ => Ok(Value::Boolean(false)),
    }
}
