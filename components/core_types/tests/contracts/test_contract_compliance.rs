//! Contract compliance tests for core_types
//!
//! These tests pin the public surface other components rely on: the value
//! variants, the conversion and equality signatures, and the inspection-only
//! object accessors used by memory accounting.

use core_types::{
    ErrorKind, ExportError, HostValue, JsError, JsString, Object, ObjectClass, ObjectKind,
    PrimitiveHint, PropertySlot, Scope, Symbol, Value,
};

#[cfg(test)]
mod value_contract_tests {
    use super::*;

    /// Contract: Value enum must have all specified variants
    #[test]
    fn test_value_has_all_variants() {
        let values = [
            Value::Undefined,
            Value::Null,
            Value::Boolean(true),
            Value::Smi(i64::MAX),
            Value::Int32(i32::MIN),
            Value::UInt32(u32::MAX),
            Value::Int64(i64::MIN),
            Value::Double(f64::NAN),
            Value::String(JsString::empty()),
            Value::Symbol(Symbol::new(None)),
            Value::Object(Object::plain(None)),
        ];
        assert_eq!(values.len(), 11);
    }

    /// Contract: conversions are total and return the documented types
    #[test]
    fn test_conversions_never_fail() {
        let sym = Value::Symbol(Symbol::new(Some("s")));
        let _: isize = sym.to_int();
        let _: i32 = sym.to_int32();
        let _: u32 = sym.to_uint32();
        let _: i64 = sym.to_int64();
        let _: f64 = sym.to_float();
        let _: bool = sym.to_boolean();
        let _: JsString = sym.to_js_string();
        assert!(sym.to_number().is_number());
    }

    /// Contract: the three relations take two values and return bool
    #[test]
    fn test_equality_signatures() {
        let relations: [fn(&Value, &Value) -> bool; 3] =
            [Value::equals, Value::strict_equals, Value::same_as];
        for relation in relations {
            assert!(relation(&Value::Smi(1), &Value::Smi(1)));
        }
    }

    #[test]
    fn test_to_primitive_accepts_all_hints() {
        for hint in [PrimitiveHint::Default, PrimitiveHint::Number, PrimitiveHint::String] {
            assert_eq!(Value::Null.to_primitive(hint), Value::Null);
        }
    }
}

#[cfg(test)]
mod inspection_contract_tests {
    use super::*;

    /// Contract: reading ObjectData never runs a lazy initializer
    #[test]
    fn test_data_does_not_materialize() {
        let lazy = Object::lazy(|| core_types::ObjectData::new(ObjectKind::Plain, None));
        assert!(matches!(lazy.data().kind(), ObjectKind::Lazy(_)));
        assert_eq!(lazy.class(), ObjectClass::Lazy);
        assert!(!lazy.is_initialized());
    }

    /// Contract: accessor slots expose their functions without calling them
    #[test]
    fn test_accessor_slots_are_inspectable() {
        let getter = Object::native_function("g", |_, _| Err(JsError::type_error("called")), None);
        let obj = Object::plain(None);
        obj.define_accessor_property("x", Some(getter), None, Default::default());
        let data = obj.data();
        let slot = data.properties().get(&JsString::from("x"));
        assert!(matches!(slot, Some(PropertySlot::Accessor { getter: Some(_), .. })));
    }

    /// Contract: scope frames expose their bindings and chain
    #[test]
    fn test_scope_is_inspectable() {
        let outer = Scope::new(None);
        let inner = Scope::new(Some(outer.clone()));
        inner.declare("a", Value::Smi(1));
        let data = inner.data();
        assert_eq!(data.names().len(), data.values().len());
        assert_eq!(data.outer().map(Scope::id), Some(outer.id()));
    }
}

#[cfg(test)]
mod error_contract_tests {
    use super::*;

    #[test]
    fn test_js_error_fields() {
        let err = JsError::new(ErrorKind::InternalError, "x");
        assert_eq!(err.kind, ErrorKind::InternalError);
        assert_eq!(err.message, "x");
    }

    #[test]
    fn test_export_error_variants() {
        let errors = [
            ExportError::Circular,
            ExportError::Incompatible {
                from: "number",
                to: "map",
            },
            ExportError::TooDeep { max_depth: 1 },
        ];
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_host_value_type_names() {
        assert_eq!(HostValue::Nil.type_name(), "nil");
        assert_eq!(HostValue::map([]).type_name(), "map");
        assert_eq!(HostValue::Error("e".into()).type_name(), "error");
    }
}
