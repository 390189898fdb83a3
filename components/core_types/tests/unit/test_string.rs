//! Unit tests for JsString encodings

use core_types::JsString;
use std::rc::Rc;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

fn hash_of(s: &JsString) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod string_encoding_tests {
    use super::*;

    #[test]
    fn test_encodings_are_indistinguishable() {
        let text = "naïve 🚀";
        let unicode = JsString::from(text);
        let imported = JsString::imported(text.to_string());
        let units: Vec<u16> = text.encode_utf16().collect();
        let rebuilt = JsString::from_utf16(&units);

        assert!(matches!(unicode, JsString::Unicode(_)));
        assert_eq!(unicode, imported);
        assert_eq!(imported, rebuilt);
        assert_eq!(hash_of(&unicode), hash_of(&imported));
        assert_eq!(hash_of(&imported), hash_of(&rebuilt));
        assert_eq!(unicode.len(), imported.len());
    }

    #[test]
    fn test_ascii_from_utf16_picks_fast_path() {
        let s = JsString::from_utf16(&[0x61, 0x62]);
        assert!(s.is_ascii());
        assert_eq!(s, "ab");
    }

    #[test]
    fn test_set_membership_across_encodings() {
        let mut set = HashSet::new();
        set.insert(JsString::from("é"));
        assert!(set.contains(&JsString::imported("é".to_string())));
    }

    #[test]
    fn test_ordering_by_code_units() {
        let a = JsString::from("a");
        let b = JsString::imported("b".to_string());
        assert!(a < b);
        // U+FF21 sorts below a surrogate pair in UTF-16 even though it is
        // above it in UTF-8 byte order.
        assert!(JsString::from("\u{FF21}") > JsString::from("\u{1F600}"));
    }
}

#[cfg(test)]
mod string_payload_tests {
    use super::*;

    #[test]
    fn test_payload_bytes_per_representation() {
        assert_eq!(JsString::from("hello").payload_bytes(), 5);
        assert_eq!(JsString::from("hé").payload_bytes(), 4);
        assert_eq!(JsString::imported("hé".to_string()).payload_bytes(), 3);
    }

    #[test]
    fn test_lone_surrogates_survive() {
        let s = JsString::from_utf16(&[0xD800, 0x41]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.code_unit_at(0), Some(0xD800));
        assert_eq!(s.substring(1, 2), "A");
    }

    #[test]
    fn test_concat_mixes_encodings() {
        let joined = JsString::from("ab").concat(&JsString::from("ç"));
        assert_eq!(joined, "abç");
        assert_eq!(joined.len(), 3);
    }

    #[test]
    fn test_array_index_parsing() {
        assert_eq!(JsString::from("0").as_array_index(), Some(0));
        assert_eq!(JsString::from("42").as_array_index(), Some(42));
        assert_eq!(JsString::from("01").as_array_index(), None);
        assert_eq!(JsString::from("-1").as_array_index(), None);
        assert_eq!(JsString::from("4294967295").as_array_index(), None);
    }

    #[test]
    fn test_array_index_ignores_representation() {
        let utf16 = |s: &str| JsString::Unicode(Rc::from(s.encode_utf16().collect::<Vec<u16>>()));
        let imported = |s: &str| JsString::Imported(Rc::from(s));
        for text in ["0", "7", "42", "4294967294"] {
            let expected = JsString::from(text).as_array_index();
            assert!(expected.is_some());
            assert_eq!(utf16(text).as_array_index(), expected);
            assert_eq!(imported(text).as_array_index(), expected);
        }
        for text in ["", "00", "01", "4294967295", "99999999999", "1a", "١"] {
            assert_eq!(utf16(text).as_array_index(), None, "{text:?}");
        }
    }
}
