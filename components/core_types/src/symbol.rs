//! Symbol values.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};

use crate::JsString;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

// Registry for Symbol.for(); holds ids so symbols themselves stay thread-local.
static SYMBOL_REGISTRY: LazyLock<Mutex<HashMap<String, u64>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A unique symbol. Two symbols are equal only if they are the same symbol.
///
/// # Examples
///
/// ```
/// use core_types::Symbol;
///
/// let a = Symbol::new(Some("tag"));
/// let b = Symbol::new(Some("tag"));
/// assert_ne!(a, b);
/// assert_eq!(Symbol::for_key("shared"), Symbol::for_key("shared"));
/// ```
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Option<JsString>,
}

impl Symbol {
    /// Creates a fresh symbol.
    pub fn new(description: Option<&str>) -> Self {
        Symbol {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: description.map(JsString::from),
        }
    }

    /// Returns the registered symbol for `key`, creating it on first use.
    pub fn for_key(key: &str) -> Self {
        let mut registry = SYMBOL_REGISTRY
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = *registry
            .entry(key.to_string())
            .or_insert_with(|| NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed));
        Symbol {
            id,
            description: Some(JsString::from(key)),
        }
    }

    /// Identity of this symbol.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The description given at creation.
    pub fn description(&self) -> Option<&JsString> {
        self.description.as_ref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(d) => write!(f, "Symbol({})", d),
            None => write!(f, "Symbol()"),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self, self.id)
    }
}
