//! Cost of each part of the value graph.
//!
//! Leaf costs (fixed sizes, string payloads, object headers) are charged to
//! the context as they are produced so the byte budget sees them in walk
//! order. Inner nodes only add up what their children report.
//!
//! Estimation only inspects: it never materializes lazy objects, never calls
//! getters, setters or `valueOf`, and never mutates anything.

use std::rc::Rc;

use core_types::{
    HostMap, HostSlice, HostValue, JsString, Object, ObjectKind, PropertyMap, PropertySlot,
    Scope, Symbol, Value,
};

use crate::sampling::walk_elements;
use crate::sizes::{SIZE_BOOL, SIZE_EMPTY_STRUCT, SIZE_INT, SIZE_INT32, SIZE_NUMBER};
use crate::{MemUsage, MemUsageContext, MemUsageError};

/// Anything whose memory footprint can be estimated.
pub trait MemUsageReporter {
    /// Estimated bytes held by `self`, not counting anything already
    /// visited in `ctx`.
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError>;
}

fn leaf(ctx: &mut MemUsageContext<'_>, bytes: u64) -> MemUsage {
    ctx.charge(MemUsage::uniform(bytes))
}

fn string_leaf(ctx: &mut MemUsageContext<'_>, payload: usize) -> MemUsage {
    ctx.charge(MemUsage::string(payload as u64))
}

impl MemUsageReporter for Value {
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        Ok(match self {
            Value::Undefined | Value::Null => leaf(ctx, SIZE_EMPTY_STRUCT),
            Value::Boolean(_) => leaf(ctx, SIZE_BOOL),
            Value::Smi(_) | Value::Int64(_) => leaf(ctx, SIZE_INT),
            Value::Int32(_) | Value::UInt32(_) => leaf(ctx, SIZE_INT32),
            Value::Double(_) => leaf(ctx, SIZE_NUMBER),
            Value::String(s) => return s.mem_usage(ctx),
            Value::Symbol(s) => return s.mem_usage(ctx),
            Value::Object(o) => return o.mem_usage(ctx),
        })
    }
}

impl MemUsageReporter for [Value] {
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        walk_elements(ctx, self, false, |value, ctx| value.mem_usage(ctx))
    }
}

impl MemUsageReporter for JsString {
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        Ok(string_leaf(ctx, self.payload_bytes()))
    }
}

impl MemUsageReporter for Symbol {
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        let payload = self.description().map_or(0, JsString::payload_bytes);
        Ok(string_leaf(ctx, payload))
    }
}

impl MemUsageReporter for PropertySlot {
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        match self {
            PropertySlot::Data { value, .. } => value.mem_usage(ctx),
            PropertySlot::Accessor { getter, setter, .. } => {
                let mut total = leaf(ctx, SIZE_EMPTY_STRUCT);
                for function in [getter, setter].into_iter().flatten() {
                    total += function.mem_usage(ctx)?;
                }
                Ok(total)
            }
        }
    }
}

impl MemUsageReporter for Object {
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        if !ctx.visits().visit_object(self.id()) || !self.is_initialized() {
            return Ok(MemUsage::ZERO);
        }
        ctx.nested(|ctx| {
            let data = self.data();
            let mut total = leaf(ctx, SIZE_EMPTY_STRUCT);
            if let Some(prototype) = data.prototype() {
                total += prototype.mem_usage(ctx)?;
            }
            total += properties_mem_usage(data.properties(), ctx)?;
            if ctx.limit_exceeded() {
                return Ok(total);
            }
            total += kind_mem_usage(data.kind(), ctx)?;
            Ok(total)
        })
    }
}

fn properties_mem_usage(
    properties: &PropertyMap,
    ctx: &mut MemUsageContext<'_>,
) -> Result<MemUsage, MemUsageError> {
    let entries: Vec<(&JsString, &PropertySlot)> = properties.iter().collect();
    let sampled = ctx.object_props_len_exceeds_threshold(entries.len());
    walk_elements(ctx, &entries, sampled, |(name, slot), ctx| {
        Ok(name.mem_usage(ctx)? + slot.mem_usage(ctx)?)
    })
}

fn kind_mem_usage(kind: &ObjectKind, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
    match kind {
        ObjectKind::Plain | ObjectKind::Lazy(_) => Ok(MemUsage::ZERO),
        ObjectKind::Array(elements) => {
            let sampled = ctx.array_len_exceeds_threshold(elements.len());
            walk_elements(ctx, elements, sampled, |value, ctx| value.mem_usage(ctx))
        }
        ObjectKind::Function(function) => {
            let mut total = function.name.mem_usage(ctx)?;
            if let Some(scope) = &function.scope {
                total += scope.mem_usage(ctx)?;
            }
            Ok(total)
        }
        ObjectKind::Map(entries) | ObjectKind::Set(entries) => {
            let entries: Vec<(&Value, Option<&Value>)> = entries.iter().collect();
            let sampled = ctx.object_props_len_exceeds_threshold(entries.len());
            walk_elements(ctx, &entries, sampled, |(key, value), ctx| {
                let mut total = key.mem_usage(ctx)?;
                if let Some(value) = value {
                    total += value.mem_usage(ctx)?;
                }
                Ok(total)
            })
        }
        ObjectKind::Proxy { target, handler } => {
            let mut total = MemUsage::ZERO;
            for object in [target, handler].into_iter().flatten() {
                total += object.mem_usage(ctx)?;
            }
            Ok(total)
        }
        ObjectKind::PrimitiveWrapper(value) => value.mem_usage(ctx),
        ObjectKind::Date(_) => Ok(leaf(ctx, SIZE_NUMBER)),
        ObjectKind::HostMap(map, _) => host_map_entries(map, ctx),
        ObjectKind::HostSlice(slice, _) => host_slice_elements(slice, ctx),
        ObjectKind::HostWrapped(value) => value.mem_usage(ctx),
    }
}

impl MemUsageReporter for Scope {
    /// Walks the whole chain. Frames already counted (shared by several
    /// closures) are skipped; the chain as a whole is one nesting level.
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        ctx.nested(|ctx| {
            let mut total = MemUsage::ZERO;
            let mut current = Some(self.clone());
            while let Some(scope) = current {
                let data = scope.data();
                if ctx.visits().visit_scope(scope.id()) {
                    let bindings: Vec<(&JsString, &Value)> =
                        data.names().iter().zip(data.values()).collect();
                    total += walk_elements(ctx, &bindings, false, |(name, value), ctx| {
                        Ok(name.mem_usage(ctx)? + value.mem_usage(ctx)?)
                    })?;
                    if let Some(object) = data.object() {
                        total += object.mem_usage(ctx)?;
                    }
                    if ctx.limit_exceeded() {
                        break;
                    }
                }
                current = data.outer().cloned();
            }
            Ok(total)
        })
    }
}

impl MemUsageReporter for HostValue {
    fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        match self {
            HostValue::Nil => Ok(leaf(ctx, SIZE_EMPTY_STRUCT)),
            HostValue::Bool(_) => Ok(leaf(ctx, SIZE_BOOL)),
            HostValue::Int(_) | HostValue::UInt(_) => Ok(leaf(ctx, SIZE_INT)),
            HostValue::Float(_) => Ok(leaf(ctx, SIZE_NUMBER)),
            HostValue::Str(s) | HostValue::Error(s) => Ok(string_leaf(ctx, s.len())),
            HostValue::Function(_) => Ok(leaf(ctx, SIZE_EMPTY_STRUCT)),
            HostValue::Map(map) => {
                if ctx.visits().is_object_visited(rc_id(map)) {
                    return Ok(MemUsage::ZERO);
                }
                let header = leaf(ctx, SIZE_EMPTY_STRUCT);
                Ok(header + host_map_entries(map, ctx)?)
            }
            HostValue::Slice(slice) => {
                if ctx.visits().is_object_visited(rc_id(slice)) {
                    return Ok(MemUsage::ZERO);
                }
                let header = leaf(ctx, SIZE_EMPTY_STRUCT);
                Ok(header + host_slice_elements(slice, ctx)?)
            }
            HostValue::Opaque(data) => {
                if !ctx.visits().visit_object(rc_id(data)) {
                    return Ok(MemUsage::ZERO);
                }
                let bytes = ctx.native_mem_usage(&**data).unwrap_or(0);
                Ok(leaf(ctx, bytes))
            }
            HostValue::Js(value) => value.mem_usage(ctx),
        }
    }
}

// Same identity as `HostValue::data_id`.
fn rc_id<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}

// Entries of a shared host map; zero if the allocation was already counted.
fn host_map_entries(map: &HostMap, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
    if !ctx.visits().visit_object(rc_id(map)) {
        return Ok(MemUsage::ZERO);
    }
    ctx.nested(|ctx| {
        let map = map.borrow();
        let entries: Vec<(&String, &HostValue)> = map.iter().collect();
        let sampled = ctx.object_props_len_exceeds_threshold(entries.len());
        walk_elements(ctx, &entries, sampled, |(key, value), ctx| {
            Ok(string_leaf(ctx, key.len()) + value.mem_usage(ctx)?)
        })
    })
}

fn host_slice_elements(
    slice: &HostSlice,
    ctx: &mut MemUsageContext<'_>,
) -> Result<MemUsage, MemUsageError> {
    if !ctx.visits().visit_object(rc_id(slice)) {
        return Ok(MemUsage::ZERO);
    }
    ctx.nested(|ctx| {
        let slice = slice.borrow();
        let sampled = ctx.array_len_exceeds_threshold(slice.len());
        walk_elements(ctx, slice.as_slice(), sampled, |value, ctx| value.mem_usage(ctx))
    })
}
