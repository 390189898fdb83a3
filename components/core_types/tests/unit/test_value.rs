//! Unit tests for Value conversions

use core_types::{Object, PrimitiveHint, PropertyFlags, Symbol, Value};

#[cfg(test)]
mod value_creation_tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(7i32), Value::Smi(7));
        assert_eq!(Value::from(7i64), Value::Smi(7));
        assert_eq!(Value::from(0.5), Value::Double(0.5));
        assert_eq!(Value::from("s"), Value::from(String::from("s")));
    }

    #[test]
    fn test_from_f64_canonicalizes_integers() {
        assert_eq!(Value::from_f64(3.0), Value::Smi(3));
        assert_eq!(Value::from_f64(9_007_199_254_740_992.0), Value::Smi(1 << 53));
        assert!(matches!(Value::from_f64(1e16 * 10.0), Value::Double(_)));
        assert!(matches!(Value::from_f64(-0.0), Value::Double(f) if f.is_sign_negative()));
    }
}

#[cfg(test)]
mod value_truthiness_tests {
    use super::*;

    #[test]
    fn test_falsy_values() {
        for v in [
            Value::Undefined,
            Value::Null,
            Value::Boolean(false),
            Value::Smi(0),
            Value::Int32(0),
            Value::UInt32(0),
            Value::Int64(0),
            Value::Double(-0.0),
            Value::Double(f64::NAN),
            Value::from(""),
        ] {
            assert!(!v.is_truthy(), "{:?} should be falsy", v);
        }
    }

    #[test]
    fn test_truthy_values() {
        for v in [
            Value::Boolean(true),
            Value::Int64(-1),
            Value::Double(f64::INFINITY),
            Value::from("false"),
            Value::Symbol(Symbol::new(None)),
            Value::Object(Object::plain(None)),
        ] {
            assert!(v.to_boolean(), "{:?} should be truthy", v);
        }
    }
}

#[cfg(test)]
mod value_typeof_tests {
    use super::*;

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Boolean(true).type_of(), "boolean");
        assert_eq!(Value::UInt32(1).type_of(), "number");
        assert_eq!(Value::from("x").type_of(), "string");
        assert_eq!(Value::Symbol(Symbol::new(None)).type_of(), "symbol");
        assert_eq!(Value::Object(Object::array(vec![], None)).type_of(), "object");
    }
}

#[cfg(test)]
mod value_number_conversion_tests {
    use super::*;

    #[test]
    fn test_numeric_widths_convert_directly() {
        assert_eq!(Value::Int32(-2).to_int64(), -2);
        assert_eq!(Value::UInt32(3).to_float(), 3.0);
        assert_eq!(Value::Int64(i64::MAX).to_int32(), -1);
        assert_eq!(Value::Double(2.9).to_int(), 2);
    }

    #[test]
    fn test_string_conversions() {
        assert_eq!(Value::from("  12  ").to_int64(), 12);
        assert_eq!(Value::from("").to_float(), 0.0);
        assert_eq!(Value::from("-Infinity").to_float(), f64::NEG_INFINITY);
        assert_eq!(Value::from("1e3").to_number(), Value::Smi(1000));
        assert!(Value::from("abc").to_float().is_nan());
    }

    #[test]
    fn test_object_with_value_of() {
        let obj = Object::plain(None);
        let value_of = Object::native_function("valueOf", |_, _| Ok(Value::Double(2.5)), None);
        obj.define_data_property("valueOf", Value::Object(value_of), PropertyFlags::HIDDEN);
        let v = Value::Object(obj);
        assert_eq!(v.to_float(), 2.5);
        assert_eq!(v.to_int32(), 2);
    }

    #[test]
    fn test_to_primitive_on_primitives_is_identity() {
        assert_eq!(Value::Smi(1).to_primitive(PrimitiveHint::String), Value::Smi(1));
        let wrapped = Object::primitive_wrapper(Value::from("w"), None);
        assert_eq!(
            Value::Object(wrapped).to_primitive(PrimitiveHint::Number),
            Value::from("w")
        );
    }
}

#[cfg(test)]
mod value_string_conversion_tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(Value::Double(1.5).to_string(), "1.5");
        assert_eq!(Value::Double(1e-7).to_string(), "1e-7");
        assert_eq!(Value::Double(123456789012345680000.0).to_string(), "123456789012345680000");
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Int32(i32::MIN).to_string(), "-2147483648");
    }

    #[test]
    fn test_objects_stringify() {
        assert_eq!(Value::Object(Object::plain(None)).to_string(), "[object Object]");
        let nested = Object::array(
            vec![Value::Smi(1), Value::Object(Object::array(vec![Value::Smi(2), Value::Smi(3)], None))],
            None,
        );
        assert_eq!(Value::Object(nested).to_string(), "1,2,3");
    }
}
