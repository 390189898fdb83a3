//! Host values, host-backed objects and the native checker

use std::any::Any;
use std::rc::Rc;

use core_types::{wrap_host_value, HostPrototypes, HostValue, Value};
use memory_manager::sizes::{SIZE_EMPTY_STRUCT, SIZE_INT, SIZE_STRING};
use memory_manager::{
    estimate_memory_usage, MemUsage, MemUsageConfig, NativeMemUsageChecker, NoopChecker,
};

struct Blob {
    bytes: Vec<u8>,
}

struct BlobChecker;

impl NativeMemUsageChecker for BlobChecker {
    fn native_mem_usage(&self, value: &dyn Any) -> Option<u64> {
        value.downcast_ref::<Blob>().map(|b| b.bytes.len() as u64)
    }
}

#[cfg(test)]
mod native_checker_tests {
    use super::*;

    #[test]
    fn test_known_type_reports_size() {
        let blob = HostValue::opaque(Blob {
            bytes: vec![0; 100],
        });
        let usage = estimate_memory_usage(&blob, &MemUsageConfig::default(), &BlobChecker).unwrap();
        assert_eq!(usage, MemUsage::uniform(100));
    }

    #[test]
    fn test_unknown_type_is_zero() {
        let other = HostValue::opaque(42u32);
        assert_eq!(
            estimate_memory_usage(&other, &MemUsageConfig::default(), &BlobChecker).unwrap(),
            MemUsage::ZERO
        );
        let blob = HostValue::opaque(Blob { bytes: vec![1] });
        assert_eq!(
            estimate_memory_usage(&blob, &MemUsageConfig::default(), &NoopChecker).unwrap(),
            MemUsage::ZERO
        );
    }

    #[test]
    fn test_wrapped_opaque_goes_through_checker() {
        let protos = Rc::new(HostPrototypes::default());
        let blob = HostValue::opaque(Blob { bytes: vec![0; 10] });
        let wrapped = wrap_host_value(&blob, &protos);
        let usage =
            estimate_memory_usage(&wrapped, &MemUsageConfig::default(), &BlobChecker).unwrap();
        assert_eq!(usage, MemUsage::uniform(SIZE_EMPTY_STRUCT + 10));
    }
}

#[cfg(test)]
mod host_container_tests {
    use super::*;

    #[test]
    fn test_host_map_entries() {
        let map = HostValue::map([("ab".to_string(), HostValue::Int(1))]);
        let usage = estimate_memory_usage(&map, &MemUsageConfig::default(), &NoopChecker).unwrap();
        assert_eq!(usage.refined, SIZE_EMPTY_STRUCT + 2 + SIZE_STRING + SIZE_INT);
        assert_eq!(usage.legacy, SIZE_EMPTY_STRUCT + 2 + SIZE_INT);
    }

    #[test]
    fn test_host_map_sampling() {
        // Keys sort as k00..k19, so k09 and k19 are the sampled entries.
        let map = HostValue::map((0..20).map(|i| {
            let value = if i == 9 || i == 19 {
                HostValue::Int(i)
            } else {
                HostValue::from("never read")
            };
            (format!("k{:02}", i), value)
        }));
        let config = MemUsageConfig {
            obj_props_len_threshold: 10,
            sample_rate: 0.1,
            ..MemUsageConfig::default()
        };
        let usage = estimate_memory_usage(&map, &config, &NoopChecker).unwrap();
        assert_eq!(
            usage.refined,
            SIZE_EMPTY_STRUCT + 20 * (3 + SIZE_STRING + SIZE_INT)
        );
    }

    #[test]
    fn test_wrappers_of_one_allocation_count_once() {
        let protos = Rc::new(HostPrototypes::default());
        let slice = HostValue::slice([HostValue::Int(1), HostValue::Int(2)]);
        let first = wrap_host_value(&slice, &protos);
        let second = wrap_host_value(&slice, &protos);
        let both = Value::Object(core_types::Object::array(vec![first, second], None));
        let usage = estimate_memory_usage(&both, &MemUsageConfig::default(), &NoopChecker).unwrap();
        assert_eq!(
            usage,
            MemUsage::uniform(SIZE_EMPTY_STRUCT + 2 * SIZE_EMPTY_STRUCT + 2 * SIZE_INT)
        );
    }

    #[test]
    fn test_js_passthrough_and_scalars() {
        let values = HostValue::slice([
            HostValue::Nil,
            HostValue::Bool(true),
            HostValue::Float(1.0),
            HostValue::Error("bad".into()),
            HostValue::Js(Value::Smi(1)),
        ]);
        let usage = estimate_memory_usage(&values, &MemUsageConfig::default(), &NoopChecker).unwrap();
        assert_eq!(
            usage.legacy,
            SIZE_EMPTY_STRUCT + SIZE_EMPTY_STRUCT + 1 + 8 + 3 + SIZE_INT
        );
    }

    #[test]
    fn test_self_containing_host_slice_terminates() {
        let slice = HostValue::slice([]);
        if let HostValue::Slice(inner) = &slice {
            inner.borrow_mut().push(slice.clone());
        }
        let usage = estimate_memory_usage(&slice, &MemUsageConfig::default(), &NoopChecker).unwrap();
        assert_eq!(usage, MemUsage::uniform(SIZE_EMPTY_STRUCT));
    }
}
