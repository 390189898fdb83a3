//! Property slots and the insertion-ordered own-property table.

use std::collections::HashMap;

use crate::{JsString, Object, Value};

/// Attribute flags of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyFlags {
    /// Value may be changed by assignment
    pub writable: bool,
    /// Shows up in enumeration
    pub enumerable: bool,
    /// May be deleted or redefined
    pub configurable: bool,
}

impl PropertyFlags {
    /// Writable, enumerable and configurable; what plain assignment creates.
    pub const DEFAULT: PropertyFlags = PropertyFlags {
        writable: true,
        enumerable: true,
        configurable: true,
    };

    /// Writable and configurable but skipped by enumeration; used for
    /// built-in methods.
    pub const HIDDEN: PropertyFlags = PropertyFlags {
        writable: true,
        enumerable: false,
        configurable: true,
    };

    /// Nothing allowed.
    pub const FROZEN: PropertyFlags = PropertyFlags {
        writable: false,
        enumerable: false,
        configurable: false,
    };
}

impl Default for PropertyFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A single own property: either a stored value or a getter/setter pair.
///
/// Accessor functions are only invoked by property reads and writes on the
/// owning object, never by code that merely inspects the slot.
#[derive(Debug, Clone)]
pub enum PropertySlot {
    /// Plain data property
    Data {
        /// Stored value
        value: Value,
        /// Attributes
        flags: PropertyFlags,
    },
    /// Accessor property
    Accessor {
        /// Function called on read
        getter: Option<Object>,
        /// Function called on write
        setter: Option<Object>,
        /// Attributes (`writable` is ignored)
        flags: PropertyFlags,
    },
}

impl PropertySlot {
    /// Data slot with default flags.
    pub fn data(value: Value) -> Self {
        PropertySlot::Data {
            value,
            flags: PropertyFlags::DEFAULT,
        }
    }

    /// Attributes of the slot.
    pub fn flags(&self) -> PropertyFlags {
        match self {
            PropertySlot::Data { flags, .. } | PropertySlot::Accessor { flags, .. } => *flags,
        }
    }

    /// Stored value of a data slot.
    pub fn value(&self) -> Option<&Value> {
        match self {
            PropertySlot::Data { value, .. } => Some(value),
            PropertySlot::Accessor { .. } => None,
        }
    }

    /// True for getter/setter slots.
    pub fn is_accessor(&self) -> bool {
        matches!(self, PropertySlot::Accessor { .. })
    }
}

/// Own properties of an object, enumerated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    names: Vec<JsString>,
    slots: HashMap<JsString, PropertySlot>,
}

impl PropertyMap {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of own properties.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when there are no own properties.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Looks up a slot by name.
    pub fn get(&self, name: &JsString) -> Option<&PropertySlot> {
        self.slots.get(name)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, name: &JsString) -> Option<&mut PropertySlot> {
        self.slots.get_mut(name)
    }

    /// Inserts or replaces a slot. A replaced slot keeps its position.
    pub fn insert(&mut self, name: JsString, slot: PropertySlot) {
        if self.slots.insert(name.clone(), slot).is_none() {
            self.names.push(name);
        }
    }

    /// Removes a slot, returning it.
    pub fn remove(&mut self, name: &JsString) -> Option<PropertySlot> {
        let slot = self.slots.remove(name)?;
        self.names.retain(|n| n != name);
        Some(slot)
    }

    /// Property names in insertion order.
    pub fn names(&self) -> &[JsString] {
        &self.names
    }

    /// `(name, slot)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&JsString, &PropertySlot)> {
        self.names
            .iter()
            .filter_map(move |name| self.slots.get(name).map(|slot| (name, slot)))
    }
}
