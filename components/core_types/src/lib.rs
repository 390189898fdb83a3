//! Core JavaScript value types, object model and host adapters.
//!
//! This crate provides the data the rest of the runtime works on: values and
//! their conversions, strings, symbols, objects with their properties,
//! ordered collections, scope frames and the bridge to host data.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`JsString`] - ASCII, UTF-16 and host-imported string storage
//! - [`Object`] - Shared handle to a prototype-linked property container
//! - [`OrderedMap`] - Insertion-ordered entries behind Map and Set
//! - [`Scope`] - Lexical scope frames captured by closures
//! - [`HostValue`] - Values owned by the embedding application
//! - [`JsError`] - JavaScript errors raised by native code
//!
//! # Examples
//!
//! ```
//! use core_types::{Object, Value};
//!
//! // Create JavaScript values
//! let num = Value::Smi(42);
//! assert!(num.is_truthy());
//! assert_eq!(num.type_of(), "number");
//!
//! // Loose equality coerces, strict equality does not
//! assert!(Value::from("42").equals(&num));
//! assert!(!Value::from("42").strict_equals(&num));
//!
//! // Objects are shared handles
//! let obj = Object::plain(None);
//! obj.set("answer", num.clone());
//! assert_eq!(obj.get("answer"), num);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod host;
mod number;
mod object;
mod ordered_map;
mod property;
mod scope;
mod string;
mod symbol;
mod value;

pub use error::{ErrorKind, ExportError, JsError};
pub use host::{
    export_value, to_host_value, wrap_host_value, ExportKind, HostFunction, HostMap,
    HostPrototypes, HostSlice, HostValue, MAX_EXPORT_DEPTH,
};
pub use number::{format_number, is_js_whitespace, string_to_number};
pub use object::{
    FunctionData, LazyInitializer, NativeFunction, Object, ObjectClass, ObjectData, ObjectKind,
    PrimitiveHint, MAX_ARRAY_GAP,
};
pub use ordered_map::{MapCursor, MapKey, OrderedMap};
pub use property::{PropertyFlags, PropertyMap, PropertySlot};
pub use scope::{Scope, ScopeData};
pub use string::{CodeUnits, JsString};
pub use symbol::Symbol;
pub use value::Value;
