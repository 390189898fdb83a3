//! Unit tests for host value wrapping and export

use core_types::{
    export_value, to_host_value, wrap_host_value, ExportError, ExportKind, HostPrototypes,
    HostValue, Object, Value, MAX_EXPORT_DEPTH,
};
use std::rc::Rc;

fn protos() -> Rc<HostPrototypes> {
    Rc::new(HostPrototypes {
        object: Some(Object::plain(None)),
        array: Some(Object::plain(None)),
        function: Some(Object::plain(None)),
    })
}

#[cfg(test)]
mod wrap_tests {
    use super::*;

    #[test]
    fn test_slice_is_array_like_and_shared() {
        let host = HostValue::slice([HostValue::Int(1), HostValue::from("two")]);
        let HostValue::Slice(backing) = &host else {
            unreachable!()
        };
        let Value::Object(obj) = wrap_host_value(&host, &protos()) else {
            panic!("expected object");
        };
        assert_eq!(obj.get("length"), Value::Smi(2));
        assert_eq!(obj.get("1"), Value::from("two"));
        assert!(obj.set("2", Value::Boolean(true)));
        assert_eq!(backing.borrow().len(), 3);
        assert_eq!(obj.to_primitive(core_types::PrimitiveHint::String), Value::from("1,two,true"));
    }

    #[test]
    fn test_wrapped_objects_get_prototypes() {
        let protos = protos();
        let Value::Object(map) = wrap_host_value(&HostValue::map([]), &protos) else {
            panic!("expected object");
        };
        let Value::Object(slice) = wrap_host_value(&HostValue::slice([]), &protos) else {
            panic!("expected object");
        };
        assert!(map.prototype().unwrap().ptr_eq(protos.object.as_ref().unwrap()));
        assert!(slice.prototype().unwrap().ptr_eq(protos.array.as_ref().unwrap()));
    }

    #[test]
    fn test_opaque_round_trips_by_identity() {
        struct Point {
            x: i32,
        }
        let host = HostValue::opaque(Point { x: 3 });
        let wrapped = wrap_host_value(&host, &protos());
        let HostValue::Opaque(back) = to_host_value(&wrapped) else {
            panic!("expected opaque");
        };
        assert_eq!(back.downcast_ref::<Point>().map(|p| p.x), Some(3));
        assert_eq!(Some(Rc::as_ptr(&back) as *const () as usize), host.data_id());
    }

    #[test]
    fn test_js_passthrough() {
        let obj = Object::plain(None);
        let value = wrap_host_value(&HostValue::Js(Value::Object(obj.clone())), &protos());
        assert!(value.strict_equals(&Value::Object(obj)));
    }
}

#[cfg(test)]
mod export_tests {
    use super::*;

    #[test]
    fn test_scalar_exports() {
        assert!(matches!(export_value(&Value::from("3"), ExportKind::Int), Ok(HostValue::Int(3))));
        assert!(matches!(export_value(&Value::Smi(0), ExportKind::Bool), Ok(HostValue::Bool(false))));
        assert!(matches!(
            export_value(&Value::Double(0.5), ExportKind::String),
            Ok(HostValue::Str(s)) if s == "0.5"
        ));
        assert!(matches!(
            export_value(&Value::Null, ExportKind::Float),
            Ok(HostValue::Float(f)) if f == 0.0
        ));
    }

    #[test]
    fn test_plain_object_exports_enumerable_properties() {
        let obj = Object::plain(None);
        obj.set("b", Value::Smi(2));
        obj.set("a", Value::from("x"));
        obj.define_data_property("hidden", Value::Null, core_types::PropertyFlags::HIDDEN);
        let HostValue::Map(map) = export_value(&Value::Object(obj), ExportKind::Map).unwrap() else {
            panic!("expected map");
        };
        let map = map.borrow();
        assert_eq!(map.len(), 2);
        assert!(matches!(map.get("b"), Some(HostValue::Int(2))));
    }

    #[test]
    fn test_nested_array_exports_deeply() {
        let inner = Object::array(vec![Value::Smi(1)], None);
        let outer = Object::array(vec![Value::Object(inner)], None);
        let HostValue::Slice(items) = export_value(&Value::Object(outer), ExportKind::Any).unwrap()
        else {
            panic!("expected slice");
        };
        assert!(matches!(&items.borrow()[0], HostValue::Slice(s) if s.borrow().len() == 1));
    }

    #[test]
    fn test_exported_function_is_callable_from_host() {
        let double = Object::native_function(
            "double",
            |_, args| Ok(Value::from_i64(args[0].to_int64() * 2)),
            None,
        );
        let HostValue::Function(f) = export_value(&Value::Object(double), ExportKind::Any).unwrap()
        else {
            panic!("expected function");
        };
        assert!(matches!(f(&[HostValue::Int(21)]), Ok(HostValue::Int(42))));
    }

    #[test]
    fn test_array_cycle_is_circular() {
        let arr = Object::array(vec![], None);
        arr.push(Value::Object(arr.clone()));
        assert_eq!(
            export_value(&Value::Object(arr), ExportKind::Slice).unwrap_err(),
            ExportError::Circular
        );
    }

    #[test]
    fn test_nesting_limit() {
        let nest = |depth: usize| {
            (0..depth).fold(Value::Null, |inner, _| {
                Value::Object(Object::array(vec![inner], None))
            })
        };
        assert!(export_value(&nest(MAX_EXPORT_DEPTH), ExportKind::Any).is_ok());
        assert_eq!(
            export_value(&nest(MAX_EXPORT_DEPTH + 1), ExportKind::Slice).unwrap_err(),
            ExportError::TooDeep {
                max_depth: MAX_EXPORT_DEPTH
            }
        );
        assert!(export_value(&nest(1_000), ExportKind::Any).is_err());
    }

    #[test]
    fn test_symbol_is_not_a_float() {
        let sym = Value::Symbol(core_types::Symbol::new(None));
        assert_eq!(
            export_value(&sym, ExportKind::Float).unwrap_err(),
            ExportError::Incompatible {
                from: "symbol",
                to: "float"
            }
        );
    }
}
