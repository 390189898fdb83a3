//! Host values and the adapters between them and language values.
//!
//! Host maps and slices are shared, not copied: wrapping a [`HostMap`] as an
//! object and exporting it again yields the same allocation, and writes made
//! through the object are visible to the host.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::object::{FunctionData, ObjectClass, ObjectData, ObjectKind};
use crate::{ExportError, JsError, JsString, Object, Value};

/// Shared host map. Ordered so enumeration and sampling are deterministic.
pub type HostMap = Rc<RefCell<BTreeMap<String, HostValue>>>;

/// Shared host slice.
pub type HostSlice = Rc<RefCell<Vec<HostValue>>>;

/// Host callable.
pub type HostFunction = Rc<dyn Fn(&[HostValue]) -> Result<HostValue, String>>;

/// A value owned by the embedding application.
#[derive(Clone)]
pub enum HostValue {
    /// Absent value
    Nil,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Float
    Float(f64),
    /// Text
    Str(String),
    /// String-keyed map
    Map(HostMap),
    /// Sequence
    Slice(HostSlice),
    /// Callable
    Function(HostFunction),
    /// Error message
    Error(String),
    /// Opaque host data such as a struct
    Opaque(Rc<dyn Any>),
    /// A language value passed through untouched
    Js(Value),
}

impl HostValue {
    /// Builds a shared map.
    pub fn map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, HostValue)>,
    {
        HostValue::Map(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    /// Builds a shared slice.
    pub fn slice<I>(items: I) -> Self
    where
        I: IntoIterator<Item = HostValue>,
    {
        HostValue::Slice(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Wraps a closure.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[HostValue]) -> Result<HostValue, String> + 'static,
    {
        HostValue::Function(Rc::new(f))
    }

    /// Wraps arbitrary host data.
    pub fn opaque<T: Any>(value: T) -> Self {
        HostValue::Opaque(Rc::new(value))
    }

    /// Short name of the host type.
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Nil => "nil",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::UInt(_) => "uint",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "string",
            HostValue::Map(_) => "map",
            HostValue::Slice(_) => "slice",
            HostValue::Function(_) => "function",
            HostValue::Error(_) => "error",
            HostValue::Opaque(_) => "opaque",
            HostValue::Js(_) => "value",
        }
    }

    /// Address of the shared allocation for reference-like host values.
    pub fn data_id(&self) -> Option<usize> {
        match self {
            HostValue::Map(m) => Some(Rc::as_ptr(m) as *const () as usize),
            HostValue::Slice(s) => Some(Rc::as_ptr(s) as *const () as usize),
            HostValue::Function(f) => Some(Rc::as_ptr(f) as *const () as usize),
            HostValue::Opaque(o) => Some(Rc::as_ptr(o) as *const () as usize),
            _ => None,
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Nil => write!(f, "Nil"),
            HostValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            HostValue::Int(n) => f.debug_tuple("Int").field(n).finish(),
            HostValue::UInt(n) => f.debug_tuple("UInt").field(n).finish(),
            HostValue::Float(n) => f.debug_tuple("Float").field(n).finish(),
            HostValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            HostValue::Map(m) => f.debug_tuple("Map").field(&*m.borrow()).finish(),
            HostValue::Slice(s) => f.debug_tuple("Slice").field(&*s.borrow()).finish(),
            HostValue::Function(_) => write!(f, "Function(..)"),
            HostValue::Error(e) => f.debug_tuple("Error").field(e).finish(),
            HostValue::Opaque(_) => write!(f, "Opaque(..)"),
            HostValue::Js(v) => f.debug_tuple("Js").field(v).finish(),
        }
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Int(n)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Float(n)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s)
    }
}

/// Prototypes given to objects created while wrapping host values.
#[derive(Debug, Clone, Default)]
pub struct HostPrototypes {
    /// For wrapped maps, errors and opaque values
    pub object: Option<Object>,
    /// For wrapped slices
    pub array: Option<Object>,
    /// For wrapped functions
    pub function: Option<Object>,
}

/// Target shape for [`export_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Whatever host shape fits best
    Any,
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// String
    String,
    /// String-keyed map
    Map,
    /// Sequence
    Slice,
}

impl ExportKind {
    fn name(self) -> &'static str {
        match self {
            ExportKind::Any => "any",
            ExportKind::Bool => "bool",
            ExportKind::Int => "int",
            ExportKind::Float => "float",
            ExportKind::String => "string",
            ExportKind::Map => "map",
            ExportKind::Slice => "slice",
        }
    }
}

/// Wraps a host value as a language value.
///
/// Numbers, strings and booleans become primitives; maps, slices, functions,
/// errors and opaque data become objects that share the host allocation.
pub fn wrap_host_value(value: &HostValue, protos: &Rc<HostPrototypes>) -> Value {
    let wrapped = |kind: ObjectKind, proto: &Option<Object>| {
        Value::Object(Object::new(ObjectData::new(kind, proto.clone())))
    };
    match value {
        HostValue::Nil => Value::Null,
        HostValue::Bool(b) => Value::Boolean(*b),
        HostValue::Int(n) => Value::from_i64(*n),
        HostValue::UInt(n) => match i64::try_from(*n) {
            Ok(n) => Value::from_i64(n),
            Err(_) => Value::Double(*n as f64),
        },
        HostValue::Float(f) => Value::from_f64(*f),
        HostValue::Str(s) => Value::String(JsString::imported(s.clone())),
        HostValue::Map(m) => wrapped(ObjectKind::HostMap(Rc::clone(m), Rc::clone(protos)), &protos.object),
        HostValue::Slice(s) => {
            wrapped(ObjectKind::HostSlice(Rc::clone(s), Rc::clone(protos)), &protos.array)
        }
        HostValue::Function(f) => {
            let f = Rc::clone(f);
            let inner_protos = Rc::clone(protos);
            let body = move |_this: &Value, args: &[Value]| {
                let host_args: Vec<HostValue> = args.iter().map(to_host_value).collect();
                f(&host_args)
                    .map(|result| wrap_host_value(&result, &inner_protos))
                    .map_err(JsError::host_error)
            };
            wrapped(
                ObjectKind::Function(FunctionData {
                    name: JsString::empty(),
                    native: Some(Rc::new(body)),
                    scope: None,
                }),
                &protos.function,
            )
        }
        HostValue::Error(_) | HostValue::Opaque(_) => {
            wrapped(ObjectKind::HostWrapped(value.clone()), &protos.object)
        }
        HostValue::Js(v) => v.clone(),
    }
}

/// Shallow conversion used when language values are written into host
/// containers or passed to host functions. Objects that wrap host data give
/// back that data; other objects pass through as [`HostValue::Js`].
pub fn to_host_value(value: &Value) -> HostValue {
    match value {
        Value::Undefined | Value::Null => HostValue::Nil,
        Value::Boolean(b) => HostValue::Bool(*b),
        Value::Smi(n) | Value::Int64(n) => HostValue::Int(*n),
        Value::Int32(n) => HostValue::Int(*n as i64),
        Value::UInt32(n) => HostValue::Int(*n as i64),
        Value::Double(f) => HostValue::Float(*f),
        Value::String(s) => HostValue::Str(s.to_string()),
        Value::Symbol(_) => HostValue::Js(value.clone()),
        Value::Object(o) => match o.data().kind() {
            ObjectKind::HostMap(m, _) => HostValue::Map(Rc::clone(m)),
            ObjectKind::HostSlice(s, _) => HostValue::Slice(Rc::clone(s)),
            ObjectKind::HostWrapped(inner) => inner.clone(),
            _ => HostValue::Js(value.clone()),
        },
    }
}

/// Converts a language value to the requested host shape.
///
/// # Errors
///
/// [`ExportError::Incompatible`] when the value cannot take that shape
/// (a string as a map, a symbol as a number, ...), and
/// [`ExportError::Circular`] when a deep export meets a cycle, and
/// [`ExportError::TooDeep`] past [`MAX_EXPORT_DEPTH`] nested objects.
///
/// # Examples
///
/// ```
/// use core_types::{export_value, ExportKind, HostValue, Object, Value};
///
/// let arr = Object::array(vec![Value::Smi(1), Value::from("a")], None);
/// let exported = export_value(&Value::Object(arr), ExportKind::Slice).unwrap();
/// assert!(matches!(exported, HostValue::Slice(_)));
///
/// assert!(export_value(&Value::from("x"), ExportKind::Map).is_err());
/// ```
pub fn export_value(value: &Value, kind: ExportKind) -> Result<HostValue, ExportError> {
    let incompatible = || ExportError::Incompatible {
        from: value.type_of(),
        to: kind.name(),
    };
    match kind {
        ExportKind::Any => Exporter::default().export(value),
        ExportKind::Bool => Ok(HostValue::Bool(value.to_boolean())),
        ExportKind::Int => match value.to_number() {
            Value::Double(f) if f.is_nan() => Err(incompatible()),
            n => Ok(HostValue::Int(n.to_int64())),
        },
        ExportKind::Float => match value {
            Value::Symbol(_) => Err(incompatible()),
            _ => Ok(HostValue::Float(value.to_float())),
        },
        ExportKind::String => Ok(HostValue::Str(value.to_js_string().to_string())),
        ExportKind::Map => {
            let Value::Object(o) = value else {
                return Err(incompatible());
            };
            o.materialize();
            match o.class() {
                ObjectClass::Array | ObjectClass::Set => Err(incompatible()),
                ObjectClass::HostBacked if !matches!(o.data().kind(), ObjectKind::HostMap(..)) => {
                    Err(incompatible())
                }
                _ => match Exporter::default().export(value)? {
                    HostValue::Map(m) => Ok(HostValue::Map(m)),
                    HostValue::Slice(pairs) if o.class() == ObjectClass::Map => {
                        let entries = pairs
                            .borrow()
                            .iter()
                            .filter_map(|pair| match pair {
                                HostValue::Slice(kv) => {
                                    let kv = kv.borrow();
                                    Some((host_key(kv.first()?), kv.get(1)?.clone()))
                                }
                                _ => None,
                            })
                            .collect::<Vec<_>>();
                        Ok(HostValue::map(entries))
                    }
                    _ => Err(incompatible()),
                },
            }
        }
        ExportKind::Slice => {
            let Value::Object(o) = value else {
                return Err(incompatible());
            };
            o.materialize();
            let sequence = match o.data().kind() {
                ObjectKind::Array(_)
                | ObjectKind::Map(_)
                | ObjectKind::Set(_)
                | ObjectKind::HostSlice(..)
                | ObjectKind::Proxy { .. } => true,
                _ => false,
            };
            if !sequence {
                return Err(incompatible());
            }
            match Exporter::default().export(value)? {
                HostValue::Slice(s) => Ok(HostValue::Slice(s)),
                _ => Err(incompatible()),
            }
        }
    }
}

fn host_key(value: &HostValue) -> String {
    match value {
        HostValue::Str(s) => s.clone(),
        HostValue::Int(n) => n.to_string(),
        HostValue::UInt(n) => n.to_string(),
        HostValue::Float(f) => Value::Double(*f).to_js_string().to_string(),
        HostValue::Bool(b) => b.to_string(),
        HostValue::Nil => "null".to_string(),
        other => format!("{:?}", other),
    }
}

/// Deepest object nesting a deep export follows.
pub const MAX_EXPORT_DEPTH: usize = 128;

// Deep export with cycle detection over the objects currently being exported.
#[derive(Default)]
struct Exporter {
    in_progress: Vec<usize>,
}

impl Exporter {
    fn export(&mut self, value: &Value) -> Result<HostValue, ExportError> {
        let Value::Object(o) = value else {
            return Ok(to_host_value(value));
        };
        if let HostValue::Map(_) | HostValue::Slice(_) = to_host_value(value) {
            return Ok(to_host_value(value));
        }
        if let ObjectKind::HostWrapped(inner) = o.data().kind() {
            return Ok(inner.clone());
        }
        let id = o.id();
        if self.in_progress.contains(&id) {
            return Err(ExportError::Circular);
        }
        if self.in_progress.len() >= MAX_EXPORT_DEPTH {
            return Err(ExportError::TooDeep {
                max_depth: MAX_EXPORT_DEPTH,
            });
        }
        self.in_progress.push(id);
        let result = self.export_object(o);
        self.in_progress.pop();
        result
    }

    fn export_object(&mut self, o: &Object) -> Result<HostValue, ExportError> {
        o.materialize();
        enum Shape {
            Elements(Vec<Value>),
            Entries(Vec<(Value, Option<Value>)>, bool),
            Primitive(Value),
            Date(f64),
            Forward(Option<Object>),
            Function,
            Properties,
        }
        let shape = match o.data().kind() {
            ObjectKind::Array(elements) => Shape::Elements(elements.clone()),
            ObjectKind::Map(map) => Shape::Entries(
                map.iter().map(|(k, v)| (k.clone(), v.cloned())).collect(),
                true,
            ),
            ObjectKind::Set(set) => Shape::Entries(
                set.iter().map(|(k, _)| (k.clone(), None)).collect(),
                false,
            ),
            ObjectKind::PrimitiveWrapper(v) => Shape::Primitive(v.clone()),
            ObjectKind::Date(t) => Shape::Date(*t),
            ObjectKind::Proxy { target, .. } => Shape::Forward(target.clone()),
            ObjectKind::Function(_) => Shape::Function,
            _ => Shape::Properties,
        };
        match shape {
            Shape::Elements(elements) => {
                let items = elements
                    .iter()
                    .map(|e| self.export(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(HostValue::slice(items))
            }
            Shape::Entries(entries, is_map) => {
                let mut items = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.export(&key)?;
                    items.push(match (is_map, value) {
                        (true, Some(value)) => HostValue::slice([key, self.export(&value)?]),
                        (true, None) => HostValue::slice([key, HostValue::Nil]),
                        (false, _) => key,
                    });
                }
                Ok(HostValue::slice(items))
            }
            Shape::Primitive(v) => self.export(&v),
            Shape::Date(t) => Ok(HostValue::Float(t)),
            Shape::Forward(Some(target)) => self.export(&Value::Object(target)),
            Shape::Forward(None) => Ok(HostValue::Nil),
            Shape::Function => {
                let function = o.clone();
                Ok(HostValue::function(move |args| {
                    let protos = Rc::new(HostPrototypes::default());
                    let args: Vec<Value> = args.iter().map(|a| wrap_host_value(a, &protos)).collect();
                    function
                        .call(&Value::Undefined, &args)
                        .map(|result| to_host_value(&result))
                        .map_err(|err| err.to_string())
                }))
            }
            Shape::Properties => {
                let mut entries = BTreeMap::new();
                for name in o.own_property_names() {
                    let enumerable = o
                        .get_own_property(&name)
                        .map(|slot| slot.flags().enumerable)
                        .unwrap_or(false);
                    if !enumerable {
                        continue;
                    }
                    let value = o.get_key(&name).unwrap_or(Value::Undefined);
                    entries.insert(name.to_string(), self.export(&value)?);
                }
                Ok(HostValue::Map(Rc::new(RefCell::new(entries))))
            }
        }
    }
}
