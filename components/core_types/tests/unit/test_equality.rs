//! Equality relation tables and symmetry checks

use core_types::{HostPrototypes, HostValue, Object, Symbol, Value, wrap_host_value};
use std::rc::Rc;

fn fixtures() -> Vec<(&'static str, Value)> {
    vec![
        ("Smi(5)", Value::Smi(5)),
        ("Int64(5)", Value::Int64(5)),
        ("Double(5.0)", Value::Double(5.0)),
        ("NaN", Value::Double(f64::NAN)),
        ("+0", Value::Double(0.0)),
        ("-0", Value::Double(-0.0)),
        ("\"5\"", Value::from("5")),
        ("\"0.0\"", Value::from("0.0")),
        ("true", Value::Boolean(true)),
    ]
}

// Expected results as 9x9 matrices in fixture order.
const SAME_AS: [[u8; 9]; 9] = [
    [1, 1, 1, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 1, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 1, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 1],
];

const STRICT_EQUALS: [[u8; 9]; 9] = [
    [1, 1, 1, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 1, 0, 0, 0],
    [0, 0, 0, 0, 1, 1, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 1],
];

const EQUALS: [[u8; 9]; 9] = [
    [1, 1, 1, 0, 0, 0, 1, 0, 0],
    [1, 1, 1, 0, 0, 0, 1, 0, 0],
    [1, 1, 1, 0, 0, 0, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 1, 0, 1, 0],
    [0, 0, 0, 0, 1, 1, 0, 1, 0],
    [1, 1, 1, 0, 0, 0, 1, 0, 0],
    [0, 0, 0, 0, 1, 1, 0, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 1],
];

fn check_table(name: &str, table: &[[u8; 9]; 9], relation: fn(&Value, &Value) -> bool) {
    let fixtures = fixtures();
    for (i, (a_name, a)) in fixtures.iter().enumerate() {
        for (j, (b_name, b)) in fixtures.iter().enumerate() {
            assert_eq!(
                relation(a, b),
                table[i][j] == 1,
                "{}({}, {})",
                name,
                a_name,
                b_name
            );
        }
    }
}

#[cfg(test)]
mod equality_table_tests {
    use super::*;

    #[test]
    fn test_same_as_table() {
        check_table("same_as", &SAME_AS, Value::same_as);
    }

    #[test]
    fn test_strict_equals_table() {
        check_table("strict_equals", &STRICT_EQUALS, Value::strict_equals);
    }

    #[test]
    fn test_equals_table() {
        check_table("equals", &EQUALS, Value::equals);
    }

    #[test]
    fn test_highlighted_cases() {
        let nan = Value::Double(f64::NAN);
        assert!(nan.same_as(&nan));
        assert!(!nan.equals(&nan));
        assert!(!Value::from("0.0").strict_equals(&Value::Smi(0)));
        assert!(Value::from("0").equals(&Value::Smi(0)));
    }
}

#[cfg(test)]
mod equality_symmetry_tests {
    use super::*;

    fn wide_fixtures() -> Vec<Value> {
        let array = Object::array(vec![Value::Smi(5)], None);
        let host = HostValue::map([("a".to_string(), HostValue::Int(1))]);
        let protos = Rc::new(HostPrototypes::default());
        let mut values: Vec<Value> = fixtures().into_iter().map(|(_, v)| v).collect();
        values.extend([
            Value::Undefined,
            Value::Null,
            Value::Boolean(false),
            Value::Int32(5),
            Value::UInt32(0),
            Value::Int64(1),
            Value::Double(f64::INFINITY),
            Value::from(""),
            Value::from(" 5 "),
            Value::from("[object Object]"),
            Value::Symbol(Symbol::new(Some("5"))),
            Value::Object(Object::plain(None)),
            Value::Object(array.clone()),
            Value::Object(array),
            wrap_host_value(&host, &protos),
            wrap_host_value(&host, &protos),
        ]);
        values
    }

    #[test]
    fn test_all_relations_are_symmetric() {
        let values = wide_fixtures();
        let relations: [(&str, fn(&Value, &Value) -> bool); 3] = [
            ("equals", Value::equals),
            ("strict_equals", Value::strict_equals),
            ("same_as", Value::same_as),
        ];
        for a in &values {
            for b in &values {
                for (name, relation) in &relations {
                    assert_eq!(relation(a, b), relation(b, a), "{} on {:?} / {:?}", name, a, b);
                }
            }
        }
    }

    #[test]
    fn test_strict_implies_loose() {
        let values = wide_fixtures();
        for a in &values {
            for b in &values {
                if a.strict_equals(b) {
                    assert!(a.equals(b), "{:?} === {:?} but not ==", a, b);
                }
            }
        }
    }

    #[test]
    fn test_host_wrappers_share_identity() {
        let host = HostValue::slice([HostValue::Int(1)]);
        let protos = Rc::new(HostPrototypes::default());
        let a = wrap_host_value(&host, &protos);
        let b = wrap_host_value(&host, &protos);
        assert!(a.strict_equals(&b));
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_object_against_primitive_uses_default_hint() {
        let plain = Value::Object(Object::plain(None));
        assert!(plain.equals(&Value::from("[object Object]")));
        assert!(!plain.equals(&Value::Null));
        assert!(!plain.equals(&Value::Undefined));
    }
}
