//! JavaScript value representation.
//!
//! This module provides the [`Value`] enum together with the conversions and
//! the three equality relations the rest of the runtime builds on:
//! [`Value::equals`] (`==`), [`Value::strict_equals`] (`===`) and
//! [`Value::same_as`] (`Object.is`).
//!
//! Numbers come in several widths. They are interchangeable everywhere a
//! number is expected: every relation compares them by mathematical value.

use std::fmt;

use crate::number::format_number;
use crate::{JsString, Object, PrimitiveHint, Symbol};

// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Represents any JavaScript value.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::Smi(42);
/// let float = Value::Double(3.5);
///
/// assert!(!undefined.is_truthy());
/// assert!(number.is_truthy());
/// assert_eq!(float.type_of(), "number");
/// assert!(Value::Int32(42).strict_equals(&Value::Double(42.0)));
/// ```
#[derive(Clone)]
pub enum Value {
    /// JavaScript undefined value
    Undefined,
    /// JavaScript null value
    Null,
    /// JavaScript boolean (true or false)
    Boolean(bool),
    /// Small integer, the default integral representation
    Smi(i64),
    /// 32-bit signed integer
    Int32(i32),
    /// 32-bit unsigned integer
    UInt32(u32),
    /// 64-bit signed integer
    Int64(i64),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// JavaScript string value
    String(JsString),
    /// Unique symbol
    Symbol(Symbol),
    /// Reference to a heap object
    Object(Object),
}

// Numbers of any width, reduced to the two shapes comparisons care about.
#[derive(Clone, Copy)]
enum Numeric {
    Int(i64),
    Float(f64),
}

fn int_float_eq(i: i64, f: f64) -> bool {
    let bound = 2f64.powi(63);
    f.fract() == 0.0 && f >= -bound && f < bound && f as i64 == i
}

fn numeric_eq(a: Numeric, b: Numeric) -> bool {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => x == y,
        (Numeric::Float(x), Numeric::Float(y)) => x == y,
        (Numeric::Int(i), Numeric::Float(f)) | (Numeric::Float(f), Numeric::Int(i)) => {
            int_float_eq(i, f)
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Smi(n) => f.debug_tuple("Smi").field(n).finish(),
            Value::Int32(n) => f.debug_tuple("Int32").field(n).finish(),
            Value::UInt32(n) => f.debug_tuple("UInt32").field(n).finish(),
            Value::Int64(n) => f.debug_tuple("Int64").field(n).finish(),
            Value::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Symbol(s) => f.debug_tuple("Symbol").field(s).finish(),
            Value::Object(o) => f.debug_tuple("Object").field(o).finish(),
        }
    }
}

/// Structural equality on the representation: same variant and same payload.
/// Objects compare by identity. Use the language relations for anything a
/// script could observe.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Smi(a), Value::Smi(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::UInt32(a), Value::UInt32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Value {
    /// Integer value. Always `Smi`, whatever the magnitude.
    pub fn from_i64(n: i64) -> Self {
        Value::Smi(n)
    }

    /// Canonical number: integral floats (other than `-0`) within the safe
    /// integer range become `Smi`, everything else stays `Double`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::from_f64(2.0), Value::Smi(2));
    /// assert_eq!(Value::from_f64(2.5), Value::Double(2.5));
    /// assert!(matches!(Value::from_f64(-0.0), Value::Double(_)));
    /// ```
    pub fn from_f64(f: f64) -> Self {
        let negative_zero = f == 0.0 && f.is_sign_negative();
        if f.fract() == 0.0 && !negative_zero && f.abs() <= MAX_SAFE_FLOAT_INT {
            Value::Smi(f as i64)
        } else {
            Value::Double(f)
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Smi(n) | Value::Int64(n) => Some(Numeric::Int(*n)),
            Value::Int32(n) => Some(Numeric::Int(*n as i64)),
            Value::UInt32(n) => Some(Numeric::Int(*n as i64)),
            Value::Double(f) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }

    /// True for every numeric variant.
    pub fn is_number(&self) -> bool {
        self.numeric().is_some()
    }

    /// True for `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// The referenced object, if this is one.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns whether this value is truthy in JavaScript semantics.
    ///
    /// `undefined`, `null`, `false`, zero of any width, `NaN` and the empty
    /// string are falsy. Everything else, every object included, is truthy.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(!Value::Undefined.is_truthy());
    /// assert!(!Value::UInt32(0).is_truthy());
    /// assert!(!Value::Double(f64::NAN).is_truthy());
    /// assert!(!Value::from("").is_truthy());
    /// assert!(Value::from("0").is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        self.to_boolean()
    }

    /// ToBoolean.
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Smi(n) | Value::Int64(n) => *n != 0,
            Value::Int32(n) => *n != 0,
            Value::UInt32(n) => *n != 0,
            Value::Double(f) => !f.is_nan() && *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Symbol(_) | Value::Object(_) => true,
        }
    }

    /// Returns the JavaScript `typeof` result for this value.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::{Object, Value};
    ///
    /// assert_eq!(Value::Null.type_of(), "object");
    /// assert_eq!(Value::Int64(1).type_of(), "number");
    /// let f = Object::native_function("f", |_, _| Ok(Value::Undefined), None);
    /// assert_eq!(Value::Object(f).type_of(), "function");
    /// ```
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Smi(_) | Value::Int32(_) | Value::UInt32(_) | Value::Int64(_) | Value::Double(_) => {
                "number"
            }
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(o) if o.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }

    /// Converts to a primitive. Primitives are returned unchanged.
    pub fn to_primitive(&self, hint: PrimitiveHint) -> Value {
        match self {
            Value::Object(o) => o.to_primitive(hint),
            other => other.clone(),
        }
    }

    /// ToNumber, keeping integer widths where the value already is one.
    ///
    /// The result is always one of the numeric variants. Strings are parsed
    /// with [`crate::string_to_number`]; symbols and unparsable input give
    /// `NaN`.
    pub fn to_number(&self) -> Value {
        match self {
            Value::Smi(_) | Value::Int32(_) | Value::UInt32(_) | Value::Int64(_) | Value::Double(_) => {
                self.clone()
            }
            Value::Boolean(b) => Value::Smi(*b as i64),
            Value::Null => Value::Smi(0),
            Value::Undefined | Value::Symbol(_) => Value::Double(f64::NAN),
            Value::String(s) => Value::from_f64(s.to_number()),
            Value::Object(o) => match o.to_primitive(PrimitiveHint::Number) {
                Value::Object(_) => Value::Double(f64::NAN),
                primitive => primitive.to_number(),
            },
        }
    }

    /// Converts to `f64`.
    pub fn to_float(&self) -> f64 {
        match self.to_number().numeric() {
            Some(Numeric::Int(n)) => n as f64,
            Some(Numeric::Float(f)) => f,
            None => f64::NAN,
        }
    }

    /// Converts to `i64`. Floats truncate toward zero and saturate; `NaN`
    /// gives 0.
    pub fn to_int64(&self) -> i64 {
        match self.to_number().numeric() {
            Some(Numeric::Int(n)) => n,
            Some(Numeric::Float(f)) => f as i64,
            None => 0,
        }
    }

    /// Converts to a platform integer, as [`Value::to_int64`].
    pub fn to_int(&self) -> isize {
        self.to_int64() as isize
    }

    /// Converts to `i32`. Wider integers wrap; floats saturate.
    pub fn to_int32(&self) -> i32 {
        match self.to_number().numeric() {
            Some(Numeric::Int(n)) => n as i32,
            Some(Numeric::Float(f)) => f as i32,
            None => 0,
        }
    }

    /// Converts to `u32`. Wider and negative integers wrap; floats saturate.
    pub fn to_uint32(&self) -> u32 {
        match self.to_number().numeric() {
            Some(Numeric::Int(n)) => n as u32,
            Some(Numeric::Float(f)) => f as u32,
            None => 0,
        }
    }

    /// ToString. Never fails: symbols render as `Symbol(description)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::Double(1e21).to_js_string(), "1e+21");
    /// assert_eq!(Value::Double(-0.0).to_js_string(), "0");
    /// assert_eq!(Value::UInt32(u32::MAX).to_js_string(), "4294967295");
    /// ```
    pub fn to_js_string(&self) -> JsString {
        match self {
            Value::Undefined => JsString::from("undefined"),
            Value::Null => JsString::from("null"),
            Value::Boolean(b) => JsString::from(if *b { "true" } else { "false" }),
            Value::Smi(n) | Value::Int64(n) => JsString::from(n.to_string()),
            Value::Int32(n) => JsString::from(n.to_string()),
            Value::UInt32(n) => JsString::from(n.to_string()),
            Value::Double(f) => JsString::from(format_number(*f)),
            Value::String(s) => s.clone(),
            Value::Symbol(s) => JsString::from(s.to_string()),
            Value::Object(o) => match o.to_primitive(PrimitiveHint::String) {
                Value::Object(_) => JsString::from("[object Object]"),
                primitive => primitive.to_js_string(),
            },
        }
    }

    /// Abstract equality (`==`).
    ///
    /// Symmetric for every pair of values. Objects are coerced with
    /// [`PrimitiveHint::Default`], which may call `valueOf`/`toString`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(Value::Null.equals(&Value::Undefined));
    /// assert!(!Value::Null.equals(&Value::Smi(0)));
    /// assert!(Value::from("1").equals(&Value::Boolean(true)));
    /// assert!(Value::from(" 42 ").equals(&Value::Int32(42)));
    /// assert!(!Value::Double(f64::NAN).equals(&Value::Double(f64::NAN)));
    /// ```
    pub fn equals(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.numeric(), other.numeric()) {
            return numeric_eq(a, b);
        }
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Boolean(b), _) => Value::Smi(*b as i64).equals(other),
            (_, Value::Boolean(b)) => self.equals(&Value::Smi(*b as i64)),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::String(s), n) | (n, Value::String(s)) if n.is_number() => {
                Value::Double(s.to_number()).equals(n)
            }
            (Value::Object(a), Value::Object(b)) => a.same_identity(b),
            (Value::Object(o), primitive) | (primitive, Value::Object(o)) => {
                match o.to_primitive(PrimitiveHint::Default) {
                    Value::Object(_) => false,
                    coerced => coerced.equals(primitive),
                }
            }
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            _ => false,
        }
    }

    /// Strict equality (`===`): no coercion between categories, but numbers
    /// of different widths compare by value. `NaN` is unequal to itself and
    /// `+0 === -0`.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => numeric_eq(a, b),
            (None, None) => self.identical(other),
            _ => false,
        }
    }

    /// SameValue (`Object.is`).
    ///
    /// `NaN` is the same as `NaN`, `+0` and `-0` differ, and an integer zero
    /// is the same as `+0` only.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(Value::Double(f64::NAN).same_as(&Value::Double(f64::NAN)));
    /// assert!(!Value::Double(0.0).same_as(&Value::Double(-0.0)));
    /// assert!(Value::Smi(0).same_as(&Value::Double(0.0)));
    /// assert!(!Value::Smi(0).same_as(&Value::Double(-0.0)));
    /// ```
    pub fn same_as(&self, other: &Value) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(Numeric::Float(a)), Some(Numeric::Float(b))) => {
                (a.is_nan() && b.is_nan()) || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            (Some(Numeric::Int(a)), Some(Numeric::Int(b))) => a == b,
            (Some(Numeric::Int(i)), Some(Numeric::Float(f)))
            | (Some(Numeric::Float(f)), Some(Numeric::Int(i))) => {
                int_float_eq(i, f) && !(i == 0 && f.is_sign_negative())
            }
            (None, None) => self.identical(other),
            _ => false,
        }
    }

    // Identity of non-numeric values, shared by `===` and SameValue.
    fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.same_identity(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Smi(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Smi(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<JsString> for Value {
    fn from(s: JsString) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}
