//! Heap objects: prototype-linked property containers.
//!
//! An [`Object`] is a cheap, reference-counted handle. Identity is the
//! address of the shared allocation, so two handles to the same object
//! compare equal and hash to the same key.
//!
//! The specialised behaviour of arrays, collections, proxies, host-backed
//! containers and lazily initialised objects lives in [`ObjectKind`]. Code
//! that only inspects an object (such as memory accounting) should read the
//! [`ObjectData`] through [`Object::data`], which never runs initialisers,
//! getters or setters.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::host::{self, HostMap, HostPrototypes, HostSlice, HostValue};
use crate::number::format_number;
use crate::ordered_map::MapCursor;
use crate::{JsError, JsString, OrderedMap, PropertyFlags, PropertyMap, PropertySlot, Scope, Value};

// Bound on nested array-to-string conversions during primitive coercion.
const MAX_PRIMITIVE_DEPTH: usize = 32;

/// Largest run of holes a single write may add to a dense array.
pub const MAX_ARRAY_GAP: usize = 1 << 16;

/// Body of a function implemented in Rust: `(this, arguments) -> result`.
pub type NativeFunction = Rc<dyn Fn(&Value, &[Value]) -> Result<Value, JsError>>;

/// Produces the real contents of a lazy object on first access.
pub type LazyInitializer = Box<dyn FnOnce() -> ObjectData>;

/// Preferred result type of a primitive conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveHint {
    /// No preference (numbers, except for dates)
    Default,
    /// Prefer `valueOf`
    Number,
    /// Prefer `toString`
    String,
}

/// Coarse classification of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    /// Ordinary object
    Plain,
    /// Array with dense elements
    Array,
    /// Callable
    Function,
    /// Map collection
    Map,
    /// Set collection
    Set,
    /// Proxy forwarding to a target
    Proxy,
    /// Backed by host data
    HostBacked,
    /// Not yet initialised
    Lazy,
    /// Boxed primitive (`new Number(1)`)
    PrimitiveWrapper,
    /// Date holding a time value
    Date,
}

/// Function payload.
pub struct FunctionData {
    /// Function name
    pub name: JsString,
    /// Native body; functions without one return `undefined` when called
    pub native: Option<NativeFunction>,
    /// Captured lexical scope chain
    pub scope: Option<Scope>,
}

/// Kind-specific payload of an object.
pub enum ObjectKind {
    /// Ordinary object
    Plain,
    /// Array elements; holes read as `undefined`
    Array(Vec<Value>),
    /// Function
    Function(FunctionData),
    /// Map entries
    Map(OrderedMap),
    /// Set entries (values are always `None`)
    Set(OrderedMap),
    /// Proxy; both references are cleared on revocation
    Proxy {
        /// Object operations are forwarded to
        target: Option<Object>,
        /// Trap holder
        handler: Option<Object>,
    },
    /// Boxed primitive
    PrimitiveWrapper(Value),
    /// Date time value in milliseconds since the epoch
    Date(f64),
    /// Host map exposed as an object
    HostMap(HostMap, Rc<HostPrototypes>),
    /// Host slice exposed as an array-like object
    HostSlice(HostSlice, Rc<HostPrototypes>),
    /// Any other host value (errors, opaque structs)
    HostWrapped(HostValue),
    /// Lazy object; `None` while the initializer is running
    Lazy(Option<LazyInitializer>),
}

impl ObjectKind {
    /// Classification of this payload.
    pub fn class(&self) -> ObjectClass {
        match self {
            ObjectKind::Plain => ObjectClass::Plain,
            ObjectKind::Array(_) => ObjectClass::Array,
            ObjectKind::Function(_) => ObjectClass::Function,
            ObjectKind::Map(_) => ObjectClass::Map,
            ObjectKind::Set(_) => ObjectClass::Set,
            ObjectKind::Proxy { .. } => ObjectClass::Proxy,
            ObjectKind::PrimitiveWrapper(_) => ObjectClass::PrimitiveWrapper,
            ObjectKind::Date(_) => ObjectClass::Date,
            ObjectKind::HostMap(..) | ObjectKind::HostSlice(..) | ObjectKind::HostWrapped(_) => {
                ObjectClass::HostBacked
            }
            ObjectKind::Lazy(_) => ObjectClass::Lazy,
        }
    }
}

/// The state behind an [`Object`] handle.
pub struct ObjectData {
    prototype: Option<Object>,
    properties: PropertyMap,
    extensible: bool,
    kind: ObjectKind,
}

impl ObjectData {
    /// Creates object state with no own properties.
    pub fn new(kind: ObjectKind, prototype: Option<Object>) -> Self {
        ObjectData {
            prototype,
            properties: PropertyMap::new(),
            extensible: true,
            kind,
        }
    }

    /// Adds a default data property; convenient for lazy initializers.
    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties
            .insert(JsString::from(name), PropertySlot::data(value));
        self
    }

    /// Prototype reference.
    pub fn prototype(&self) -> Option<&Object> {
        self.prototype.as_ref()
    }

    /// Own ordinary properties.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Kind-specific payload.
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Whether new properties may be added.
    pub fn is_extensible(&self) -> bool {
        self.extensible
    }
}

/// Handle to a heap object.
///
/// # Examples
///
/// ```
/// use core_types::{Object, Value};
///
/// let proto = Object::plain(None);
/// proto.set("greeting", Value::from("hi"));
/// let obj = Object::plain(Some(proto.clone()));
///
/// assert_eq!(obj.get("greeting"), Value::from("hi"));
/// assert!(obj.get_own_property(&"greeting".into()).is_none());
/// ```
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    /// Wraps prepared state in a new handle.
    pub fn new(data: ObjectData) -> Self {
        Object(Rc::new(RefCell::new(data)))
    }

    /// Ordinary empty object.
    pub fn plain(prototype: Option<Object>) -> Self {
        Self::new(ObjectData::new(ObjectKind::Plain, prototype))
    }

    /// Array holding `elements`.
    pub fn array(elements: Vec<Value>, prototype: Option<Object>) -> Self {
        Self::new(ObjectData::new(ObjectKind::Array(elements), prototype))
    }

    /// Empty Map.
    pub fn new_map(prototype: Option<Object>) -> Self {
        Self::new(ObjectData::new(ObjectKind::Map(OrderedMap::new()), prototype))
    }

    /// Empty Set.
    pub fn new_set(prototype: Option<Object>) -> Self {
        Self::new(ObjectData::new(ObjectKind::Set(OrderedMap::new()), prototype))
    }

    /// Function object.
    pub fn function(
        name: &str,
        native: Option<NativeFunction>,
        scope: Option<Scope>,
        prototype: Option<Object>,
    ) -> Self {
        Self::new(ObjectData::new(
            ObjectKind::Function(FunctionData {
                name: JsString::from(name),
                native,
                scope,
            }),
            prototype,
        ))
    }

    /// Function object with a native body.
    pub fn native_function<F>(name: &str, body: F, prototype: Option<Object>) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        Self::function(name, Some(Rc::new(body)), None, prototype)
    }

    /// Proxy for `target`.
    pub fn proxy(target: Object, handler: Object) -> Self {
        Self::new(ObjectData::new(
            ObjectKind::Proxy {
                target: Some(target),
                handler: Some(handler),
            },
            None,
        ))
    }

    /// Boxed primitive.
    pub fn primitive_wrapper(value: Value, prototype: Option<Object>) -> Self {
        Self::new(ObjectData::new(ObjectKind::PrimitiveWrapper(value), prototype))
    }

    /// Date with the given time value.
    pub fn date(time_value: f64, prototype: Option<Object>) -> Self {
        Self::new(ObjectData::new(ObjectKind::Date(time_value), prototype))
    }

    /// Object whose contents are produced by `init` on first access.
    pub fn lazy<F>(init: F) -> Self
    where
        F: FnOnce() -> ObjectData + 'static,
    {
        Self::new(ObjectData::new(ObjectKind::Lazy(Some(Box::new(init))), None))
    }

    /// Identity of this object.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// True if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity used by equality: the same object, or two wrappers around
    /// the same host allocation.
    pub fn same_identity(&self, other: &Object) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.host_data_id(), other.host_data_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn host_data_id(&self) -> Option<usize> {
        match &self.data().kind {
            ObjectKind::HostMap(map, _) => Some(Rc::as_ptr(map) as *const () as usize),
            ObjectKind::HostSlice(slice, _) => Some(Rc::as_ptr(slice) as *const () as usize),
            ObjectKind::HostWrapped(value) => value.data_id(),
            _ => None,
        }
    }

    /// Read access to the object state. Does not materialise lazy objects.
    pub fn data(&self) -> Ref<'_, ObjectData> {
        self.0.borrow()
    }

    fn data_mut(&self) -> RefMut<'_, ObjectData> {
        self.0.borrow_mut()
    }

    /// Classification of the object.
    pub fn class(&self) -> ObjectClass {
        self.data().kind.class()
    }

    /// False only for a lazy object that has not been touched yet.
    pub fn is_initialized(&self) -> bool {
        !matches!(self.data().kind, ObjectKind::Lazy(_))
    }

    /// Runs the lazy initializer if it has not run yet.
    pub fn materialize(&self) {
        if self.is_initialized() {
            return;
        }
        let init = match &mut self.data_mut().kind {
            ObjectKind::Lazy(init) => init.take(),
            _ => None,
        };
        if let Some(init) = init {
            let data = init();
            trace!(object = self.id(), "materialized lazy object");
            *self.data_mut() = data;
        }
    }

    /// Prototype of the object.
    pub fn prototype(&self) -> Option<Object> {
        self.materialize();
        self.data().prototype.clone()
    }

    /// Replaces the prototype. Fails if the object is not extensible or the
    /// new chain would contain the object itself.
    pub fn set_prototype(&self, prototype: Option<Object>) -> bool {
        self.materialize();
        if !self.data().extensible {
            return false;
        }
        let mut cursor = prototype.clone();
        while let Some(p) = cursor {
            if p.ptr_eq(self) {
                return false;
            }
            cursor = p.data().prototype.clone();
        }
        self.data_mut().prototype = prototype;
        true
    }

    /// Disallows adding new properties.
    pub fn prevent_extensions(&self) {
        self.materialize();
        self.data_mut().extensible = false;
    }

    /// Own property keys in enumeration order.
    pub fn own_property_names(&self) -> Vec<JsString> {
        self.materialize();
        let data = self.data();
        let mut names = Vec::with_capacity(data.properties.len());
        let index_names = |n: usize| (0..n).map(|i| JsString::from(i.to_string()));
        match &data.kind {
            ObjectKind::Array(elements) => {
                names.extend(index_names(elements.len()));
                names.push(JsString::from("length"));
            }
            ObjectKind::HostSlice(slice, _) => {
                names.extend(index_names(slice.borrow().len()));
                names.push(JsString::from("length"));
            }
            ObjectKind::HostMap(map, _) => {
                names.extend(map.borrow().keys().map(|k| JsString::from(k.as_str())));
            }
            ObjectKind::HostWrapped(HostValue::Error(_)) => names.push(JsString::from("message")),
            ObjectKind::PrimitiveWrapper(Value::String(s)) => {
                names.extend(index_names(s.len()));
                names.push(JsString::from("length"));
            }
            _ => {}
        }
        names.extend(data.properties.names().iter().cloned());
        names
    }

    /// Own property `key`, including the synthesized properties of arrays,
    /// host containers and string wrappers.
    pub fn get_own_property(&self, key: &JsString) -> Option<PropertySlot> {
        self.materialize();
        let data = self.data();
        let length_flags = PropertyFlags {
            writable: true,
            enumerable: false,
            configurable: false,
        };
        let synthesized = match &data.kind {
            ObjectKind::Array(elements) => match key.as_array_index() {
                Some(i) => elements.get(i).cloned(),
                None if *key == "length" => Some(Value::from_i64(elements.len() as i64)),
                None => None,
            },
            ObjectKind::HostSlice(slice, protos) => match key.as_array_index() {
                Some(i) => slice
                    .borrow()
                    .get(i)
                    .map(|v| host::wrap_host_value(v, protos)),
                None if *key == "length" => Some(Value::from_i64(slice.borrow().len() as i64)),
                None => None,
            },
            ObjectKind::HostMap(map, protos) => map
                .borrow()
                .get(key.to_string().as_str())
                .map(|v| host::wrap_host_value(v, protos)),
            ObjectKind::HostWrapped(HostValue::Error(message)) if *key == "message" => {
                Some(Value::String(JsString::imported(message.clone())))
            }
            ObjectKind::PrimitiveWrapper(Value::String(s)) => match key.as_array_index() {
                Some(i) => s.code_unit_at(i).map(|_| Value::String(s.substring(i, i + 1))),
                None if *key == "length" => Some(Value::from_i64(s.len() as i64)),
                None => None,
            },
            _ => None,
        };
        if let Some(value) = synthesized {
            let flags = if *key == "length" {
                length_flags
            } else {
                PropertyFlags::DEFAULT
            };
            return Some(PropertySlot::Data { value, flags });
        }
        data.properties.get(key).cloned()
    }

    /// True if `key` is an own or inherited property.
    pub fn has_property(&self, key: &str) -> bool {
        let key = JsString::from(key);
        let mut current = Some(self.clone());
        while let Some(obj) = current {
            if let Some(target) = obj.proxy_target() {
                current = target;
                continue;
            }
            if obj.get_own_property(&key).is_some() {
                return true;
            }
            current = obj.prototype();
        }
        false
    }

    // `Some(target)` for proxies (inner `None` once revoked).
    fn proxy_target(&self) -> Option<Option<Object>> {
        match &self.data().kind {
            ObjectKind::Proxy { target, .. } => Some(target.clone()),
            _ => None,
        }
    }

    /// Reads a property, walking the prototype chain and invoking getters.
    /// A getter that throws reads as `undefined`; see [`Object::try_get`].
    pub fn get(&self, key: &str) -> Value {
        self.try_get(key).unwrap_or(Value::Undefined)
    }

    /// Reads a property, propagating errors thrown by getters.
    pub fn try_get(&self, key: &str) -> Result<Value, JsError> {
        self.get_key(&JsString::from(key))
    }

    /// [`Object::try_get`] with an already converted key.
    pub fn get_key(&self, key: &JsString) -> Result<Value, JsError> {
        let receiver = Value::Object(self.clone());
        let mut current = self.clone();
        loop {
            if let Some(target) = current.proxy_target() {
                match target {
                    Some(target) => {
                        current = target;
                        continue;
                    }
                    None => return Err(JsError::type_error("proxy has been revoked")),
                }
            }
            match current.get_own_property(key) {
                Some(PropertySlot::Data { value, .. }) => return Ok(value),
                Some(PropertySlot::Accessor { getter, .. }) => {
                    return match getter {
                        Some(getter) => getter.call(&receiver, &[]),
                        None => Ok(Value::Undefined),
                    };
                }
                None => {}
            }
            match current.prototype() {
                Some(proto) => current = proto,
                None => return Ok(Value::Undefined),
            }
        }
    }

    /// Writes a property; returns false when the write was rejected.
    pub fn set(&self, key: &str, value: Value) -> bool {
        self.try_set(key, value).unwrap_or(false)
    }

    /// Writes a property, propagating errors thrown by setters.
    pub fn try_set(&self, key: &str, value: Value) -> Result<bool, JsError> {
        self.set_key(JsString::from(key), value)
    }

    /// [`Object::try_set`] with an already converted key.
    pub fn set_key(&self, key: JsString, value: Value) -> Result<bool, JsError> {
        self.materialize();
        if let Some(target) = self.proxy_target() {
            return match target {
                Some(target) => target.set_key(key, value),
                None => Err(JsError::type_error("proxy has been revoked")),
            };
        }

        // Conversions may read this very object, so they run before any
        // borrow of its data is taken.
        let (is_array, host_target) = {
            let data = self.data();
            let target = match &data.kind {
                ObjectKind::HostMap(map, _) => Some(HostValue::Map(Rc::clone(map))),
                ObjectKind::HostSlice(slice, _) => Some(HostValue::Slice(Rc::clone(slice))),
                _ => None,
            };
            (matches!(data.kind, ObjectKind::Array(_)), target)
        };
        match host_target {
            Some(HostValue::Map(map)) => {
                let value = host::to_host_value(&value);
                map.borrow_mut().insert(key.to_string(), value);
                return Ok(true);
            }
            Some(HostValue::Slice(slice)) => {
                if let Some(i) = key.as_array_index() {
                    let value = host::to_host_value(&value);
                    let mut slice = slice.borrow_mut();
                    if i < slice.len() {
                        slice[i] = value;
                    } else if i == slice.len() {
                        slice.push(value);
                    } else {
                        return Ok(false);
                    }
                    return Ok(true);
                }
            }
            _ => {}
        }

        if is_array {
            if let Some(i) = key.as_array_index() {
                let mut data = self.data_mut();
                let extensible = data.extensible;
                if let ObjectKind::Array(elements) = &mut data.kind {
                    if i < elements.len() {
                        elements[i] = value;
                        return Ok(true);
                    }
                    if !extensible || i - elements.len() > MAX_ARRAY_GAP {
                        trace!(index = i, len = elements.len(), "array write rejected");
                        return Ok(false);
                    }
                    elements.resize(i, Value::Undefined);
                    elements.push(value);
                    return Ok(true);
                }
            } else if key == "length" {
                let new_len = value.to_uint32() as usize;
                if let ObjectKind::Array(elements) = &mut self.data_mut().kind {
                    if new_len > elements.len() + MAX_ARRAY_GAP {
                        return Err(JsError::range_error("Invalid array length"));
                    }
                    elements.resize(new_len, Value::Undefined);
                    return Ok(true);
                }
            }
        }

        let own = self.data().properties.get(&key).cloned();
        match own {
            Some(PropertySlot::Data { flags, .. }) => {
                if !flags.writable {
                    return Ok(false);
                }
                if let Some(PropertySlot::Data { value: slot, .. }) =
                    self.data_mut().properties.get_mut(&key)
                {
                    *slot = value;
                }
                return Ok(true);
            }
            Some(PropertySlot::Accessor { setter, .. }) => return self.call_setter(setter, value),
            None => {}
        }

        let mut proto = self.prototype();
        while let Some(p) = proto {
            match p.get_own_property(&key) {
                Some(PropertySlot::Accessor { setter, .. }) => return self.call_setter(setter, value),
                Some(PropertySlot::Data { flags, .. }) if !flags.writable => return Ok(false),
                Some(PropertySlot::Data { .. }) => break,
                None => {}
            }
            proto = p.prototype();
        }

        if !self.data().extensible {
            return Ok(false);
        }
        self.data_mut()
            .properties
            .insert(key, PropertySlot::data(value));
        Ok(true)
    }

    fn call_setter(&self, setter: Option<Object>, value: Value) -> Result<bool, JsError> {
        match setter {
            Some(setter) => {
                setter.call(&Value::Object(self.clone()), &[value])?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Defines (or redefines) an own data property.
    pub fn define_data_property(&self, key: &str, value: Value, flags: PropertyFlags) {
        self.materialize();
        self.data_mut()
            .properties
            .insert(JsString::from(key), PropertySlot::Data { value, flags });
    }

    /// Defines (or redefines) an own accessor property.
    pub fn define_accessor_property(
        &self,
        key: &str,
        getter: Option<Object>,
        setter: Option<Object>,
        flags: PropertyFlags,
    ) {
        self.materialize();
        self.data_mut().properties.insert(
            JsString::from(key),
            PropertySlot::Accessor {
                getter,
                setter,
                flags,
            },
        );
    }

    /// Deletes an own property. Returns false for non-configurable ones.
    pub fn delete(&self, key: &str) -> bool {
        self.materialize();
        let key = JsString::from(key);
        let mut data = self.data_mut();
        match &mut data.kind {
            ObjectKind::Array(elements) => {
                if let Some(slot) = key.as_array_index().and_then(|i| elements.get_mut(i)) {
                    *slot = Value::Undefined;
                    return true;
                }
            }
            ObjectKind::HostMap(map, _) => {
                if map.borrow_mut().remove(key.to_string().as_str()).is_some() {
                    return true;
                }
            }
            _ => {}
        }
        let configurable = data.properties.get(&key).map(|slot| slot.flags().configurable);
        match configurable {
            Some(false) => false,
            Some(true) => {
                data.properties.remove(&key);
                true
            }
            None => true,
        }
    }

    /// Appends to an array and returns the new length; `None` for non-arrays.
    pub fn push(&self, value: Value) -> Option<usize> {
        self.materialize();
        match &mut self.data_mut().kind {
            ObjectKind::Array(elements) => {
                elements.push(value);
                Some(elements.len())
            }
            _ => None,
        }
    }

    /// Element count of an array or host slice.
    pub fn array_len(&self) -> Option<usize> {
        match &self.data().kind {
            ObjectKind::Array(elements) => Some(elements.len()),
            ObjectKind::HostSlice(slice, _) => Some(slice.borrow().len()),
            _ => None,
        }
    }

    /// Inserts into a Map. Returns false if this is not a Map.
    pub fn map_set(&self, key: Value, value: Value) -> bool {
        match &mut self.data_mut().kind {
            ObjectKind::Map(map) => {
                map.set(key, Some(value));
                true
            }
            _ => false,
        }
    }

    /// Looks up a Map entry.
    pub fn map_get(&self, key: &Value) -> Option<Value> {
        match &self.data().kind {
            ObjectKind::Map(map) => map.get(key).cloned(),
            _ => None,
        }
    }

    /// Adds to a Set. Returns false if this is not a Set.
    pub fn set_add(&self, value: Value) -> bool {
        match &mut self.data_mut().kind {
            ObjectKind::Set(set) => {
                set.set(value, None);
                true
            }
            _ => false,
        }
    }

    /// Membership test for Maps and Sets.
    pub fn collection_has(&self, key: &Value) -> bool {
        match &self.data().kind {
            ObjectKind::Map(map) | ObjectKind::Set(map) => map.has(key),
            _ => false,
        }
    }

    /// Removes a Map or Set entry.
    pub fn collection_delete(&self, key: &Value) -> bool {
        match &mut self.data_mut().kind {
            ObjectKind::Map(map) | ObjectKind::Set(map) => map.remove(key),
            _ => false,
        }
    }

    /// Entry count of a Map or Set.
    pub fn collection_size(&self) -> Option<usize> {
        match &self.data().kind {
            ObjectKind::Map(map) | ObjectKind::Set(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Starts an iteration over a Map or Set that tolerates mutation.
    pub fn collection_cursor(&self) -> Option<MapCursor> {
        match &self.data().kind {
            ObjectKind::Map(map) | ObjectKind::Set(map) => Some(map.cursor()),
            _ => None,
        }
    }

    /// Advances a cursor from [`Object::collection_cursor`].
    pub fn collection_next(&self, cursor: &mut MapCursor) -> Option<(Value, Option<Value>)> {
        match &self.data().kind {
            ObjectKind::Map(map) | ObjectKind::Set(map) => cursor.next(map),
            _ => None,
        }
    }

    /// Detaches a proxy from its target and handler.
    pub fn revoke_proxy(&self) {
        if let ObjectKind::Proxy { target, handler } = &mut self.data_mut().kind {
            *target = None;
            *handler = None;
        }
    }

    /// True for functions and proxies of functions.
    pub fn is_callable(&self) -> bool {
        match self.proxy_target() {
            Some(Some(target)) => target.is_callable(),
            Some(None) => false,
            None => matches!(self.data().kind, ObjectKind::Function(_)),
        }
    }

    /// Calls the object as a function.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, JsError> {
        if let Some(target) = self.proxy_target() {
            return match target {
                Some(target) => target.call(this, args),
                None => Err(JsError::type_error("proxy has been revoked")),
            };
        }
        let native = match &self.data().kind {
            ObjectKind::Function(f) => Ok(f.native.clone()),
            _ => Err(JsError::type_error("object is not a function")),
        }?;
        match native {
            Some(body) => body(this, args),
            None => Ok(Value::Undefined),
        }
    }

    /// Converts the object to a primitive value.
    ///
    /// Boxed primitives unwrap directly. Otherwise `valueOf` and `toString`
    /// are tried (in hint order) when they resolve to callable functions;
    /// the first primitive result wins. When neither produces one the
    /// object's default string form is used. Never fails.
    pub fn to_primitive(&self, hint: PrimitiveHint) -> Value {
        self.to_primitive_bounded(hint, 0)
    }

    fn to_primitive_bounded(&self, hint: PrimitiveHint, depth: usize) -> Value {
        self.materialize();
        if let ObjectKind::PrimitiveWrapper(value) = &self.data().kind {
            return value.clone();
        }
        let hint = match hint {
            PrimitiveHint::Default if self.class() == ObjectClass::Date => PrimitiveHint::String,
            PrimitiveHint::Default => PrimitiveHint::Number,
            other => other,
        };
        let order = match hint {
            PrimitiveHint::String => ["toString", "valueOf"],
            _ => ["valueOf", "toString"],
        };
        let this = Value::Object(self.clone());
        for name in order {
            if let Ok(Value::Object(method)) = self.try_get(name) {
                if method.is_callable() {
                    if let Ok(result) = method.call(&this, &[]) {
                        if !matches!(result, Value::Object(_)) {
                            return result;
                        }
                    }
                }
            }
        }
        self.default_primitive(hint, depth)
    }

    fn default_primitive(&self, hint: PrimitiveHint, depth: usize) -> Value {
        enum Snapshot {
            Elements(Vec<Value>),
            Date(f64),
            Function(JsString),
            Forward(Option<Object>),
            Error(String),
            Other,
        }
        let snapshot = match &self.data().kind {
            ObjectKind::Array(elements) => Snapshot::Elements(elements.clone()),
            ObjectKind::HostSlice(slice, protos) => Snapshot::Elements(
                slice
                    .borrow()
                    .iter()
                    .map(|v| host::wrap_host_value(v, protos))
                    .collect(),
            ),
            ObjectKind::Date(t) => Snapshot::Date(*t),
            ObjectKind::Function(f) => Snapshot::Function(f.name.clone()),
            ObjectKind::Proxy { target, .. } => Snapshot::Forward(target.clone()),
            ObjectKind::HostWrapped(HostValue::Error(message)) => Snapshot::Error(message.clone()),
            _ => Snapshot::Other,
        };
        match snapshot {
            Snapshot::Elements(elements) => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|element| match element {
                        Value::Undefined | Value::Null => String::new(),
                        Value::Object(o) if depth < MAX_PRIMITIVE_DEPTH && !o.ptr_eq(self) => o
                            .to_primitive_bounded(PrimitiveHint::String, depth + 1)
                            .to_js_string()
                            .to_string(),
                        Value::Object(_) => String::new(),
                        other => other.to_js_string().to_string(),
                    })
                    .collect();
                Value::from(parts.join(",").as_str())
            }
            Snapshot::Date(t) => match hint {
                PrimitiveHint::Number => Value::Double(t),
                _ => Value::from(format_number(t).as_str()),
            },
            Snapshot::Function(name) => {
                Value::from(format!("function {}() {{ [native code] }}", name).as_str())
            }
            Snapshot::Forward(Some(target)) if depth < MAX_PRIMITIVE_DEPTH => {
                target.to_primitive_bounded(hint, depth + 1)
            }
            Snapshot::Error(message) => Value::from(format!("Error: {}", message).as_str()),
            Snapshot::Forward(_) | Snapshot::Other => Value::from("[object Object]"),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => write!(f, "Object({:?}@{:#x})", data.kind.class(), self.id()),
            Err(_) => write!(f, "Object(<borrowed>@{:#x})", self.id()),
        }
    }
}
