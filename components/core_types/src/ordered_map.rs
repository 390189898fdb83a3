//! Insertion-ordered hash table backing Map and Set objects.
//!
//! Entries live in an arena and are addressed by stable indices. Iteration
//! order is a doubly-linked list threaded through the arena; a hash index maps
//! normalized keys to arena slots.
//!
//! Removing an entry unlinks it but leaves a tombstone in place that still
//! remembers its predecessor. A [`MapCursor`] parked on a tombstone walks back
//! to the nearest live predecessor and continues from there, so entries not
//! yet visited are never skipped and entries appended mid-iteration are seen.
//! The map keeps weak handles to its cursors so that compaction can move every
//! live cursor onto the renumbered slots.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{JsString, Value};

const COMPACT_MIN_TOMBSTONES: usize = 16;

/// Hashable key with SameValueZero identity.
///
/// All numeric widths with the same mathematical value collapse to one key,
/// `-0` and `+0` are the same key, and every NaN is the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Integral number
    Int(i64),
    /// Non-integral finite or infinite number, by bit pattern
    Float(u64),
    /// Any NaN
    NaN,
    /// String content
    String(JsString),
    /// Symbol identity
    Symbol(u64),
    /// Object identity
    Object(usize),
}

impl MapKey {
    /// Normalizes a value into its key.
    pub fn from_value(value: &Value) -> MapKey {
        match value {
            Value::Undefined => MapKey::Undefined,
            Value::Null => MapKey::Null,
            Value::Boolean(b) => MapKey::Bool(*b),
            Value::Smi(n) | Value::Int64(n) => MapKey::Int(*n),
            Value::Int32(n) => MapKey::Int(*n as i64),
            Value::UInt32(n) => MapKey::Int(*n as i64),
            Value::Double(f) => {
                if f.is_nan() {
                    MapKey::NaN
                } else if f.fract() == 0.0 && *f >= -(2f64.powi(63)) && *f < 2f64.powi(63) {
                    MapKey::Int(*f as i64)
                } else {
                    MapKey::Float(f.to_bits())
                }
            }
            Value::String(s) => MapKey::String(s.clone()),
            Value::Symbol(s) => MapKey::Symbol(s.id()),
            Value::Object(o) => MapKey::Object(o.id()),
        }
    }
}

struct Entry {
    key: Value,
    value: Option<Value>,
    prev: Option<usize>,
    next: Option<usize>,
    removed: bool,
}

/// Insertion-ordered map from [`Value`] keys to optional values.
///
/// Sets store `None` as the value of each entry.
///
/// # Examples
///
/// ```
/// use core_types::{OrderedMap, Value};
///
/// let mut map = OrderedMap::new();
/// map.set(Value::from("a"), Some(Value::Smi(1)));
/// map.set(Value::Double(2.0), Some(Value::Smi(2)));
/// assert_eq!(map.get(&Value::Smi(2)), Some(&Value::Smi(2)));
///
/// let mut cursor = map.cursor();
/// assert!(cursor.next(&map).is_some());
/// map.remove(&Value::Smi(2));
/// assert!(cursor.next(&map).is_none());
/// ```
pub struct OrderedMap {
    entries: Vec<Entry>,
    index: HashMap<MapKey, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    tombstones: usize,
    cursors: RefCell<Vec<Weak<Cell<CursorPosition>>>>,
}

impl OrderedMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        OrderedMap {
            entries: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            len: 0,
            tombstones: 0,
            cursors: RefCell::new(Vec::new()),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value stored under `key`. Set entries have no value.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        let slot = *self.index.get(&MapKey::from_value(key))?;
        self.entries[slot].value.as_ref()
    }

    /// True if `key` is present.
    pub fn has(&self, key: &Value) -> bool {
        self.index.contains_key(&MapKey::from_value(key))
    }

    /// Inserts or updates an entry. Updating keeps the original position.
    pub fn set(&mut self, key: Value, value: Option<Value>) {
        let map_key = MapKey::from_value(&key);
        if let Some(&slot) = self.index.get(&map_key) {
            self.entries[slot].value = value;
            return;
        }
        let key = match key {
            Value::Double(f) if f == 0.0 => Value::Smi(0),
            other => other,
        };
        let slot = self.entries.len();
        self.entries.push(Entry {
            key,
            value,
            prev: self.tail,
            next: None,
            removed: false,
        });
        match self.tail {
            Some(tail) => self.entries[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.index.insert(map_key, slot);
        self.len += 1;
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &Value) -> bool {
        let Some(slot) = self.index.remove(&MapKey::from_value(key)) else {
            return false;
        };
        self.unlink(slot);
        self.len -= 1;
        self.tombstones += 1;
        if self.tombstones >= COMPACT_MIN_TOMBSTONES && self.tombstones > self.len {
            self.compact();
        }
        true
    }

    /// Removes every entry. Live cursors continue with entries added later.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.tombstones = 0;
        self.cursors.borrow_mut().retain(|weak| match weak.upgrade() {
            Some(position) => {
                if let CursorPosition::At(_) = position.get() {
                    position.set(CursorPosition::Start);
                }
                true
            }
            None => false,
        });
    }

    /// Iterates live entries in insertion order. The map cannot be mutated
    /// while this iterator is alive; use [`OrderedMap::cursor`] for that.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            map: self,
            next: self.head,
        }
    }

    /// Creates a cursor positioned before the first entry.
    pub fn cursor(&self) -> MapCursor {
        let position = Rc::new(Cell::new(CursorPosition::Start));
        let mut cursors = self.cursors.borrow_mut();
        cursors.retain(|weak| weak.strong_count() > 0);
        cursors.push(Rc::downgrade(&position));
        MapCursor { position }
    }

    /// Number of arena slots, live or not.
    #[cfg(test)]
    fn slots(&self) -> usize {
        self.entries.len()
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.entries[slot].prev, self.entries[slot].next);
        match prev {
            Some(p) => self.entries[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.entries[n].prev = prev,
            None => self.tail = prev,
        }
        let entry = &mut self.entries[slot];
        entry.removed = true;
        entry.key = Value::Undefined;
        entry.value = None;
        entry.next = None;
    }

    // Successor of `slot` in the current live order, resolving tombstones
    // through their remembered predecessors.
    fn successor(&self, slot: usize) -> Option<usize> {
        let mut cur = slot;
        loop {
            let entry = self.entries.get(cur)?;
            if !entry.removed {
                return entry.next;
            }
            match entry.prev {
                Some(prev) => cur = prev,
                None => return self.head,
            }
        }
    }

    fn compact(&mut self) {
        let mut renumbered = vec![None; self.entries.len()];
        let mut cur = self.head;
        let mut live: usize = 0;
        while let Some(slot) = cur {
            renumbered[slot] = Some(live);
            live += 1;
            cur = self.entries[slot].next;
        }
        // A cursor resumes after the live predecessor of the entry it would
        // visit next.
        self.cursors.borrow_mut().retain(|weak| {
            let Some(position) = weak.upgrade() else {
                return false;
            };
            if let CursorPosition::At(slot) = position.get() {
                let resumed = match self.successor(slot) {
                    Some(next) => renumbered[next].and_then(|n| n.checked_sub(1)),
                    None => self.tail.and_then(|tail| renumbered[tail]),
                };
                position.set(resumed.map_or(CursorPosition::Start, CursorPosition::At));
            }
            true
        });

        let mut entries = Vec::with_capacity(self.len);
        let mut cur = self.head;
        while let Some(slot) = cur {
            let entry = &mut self.entries[slot];
            cur = entry.next;
            let idx = entries.len();
            entries.push(Entry {
                key: std::mem::replace(&mut entry.key, Value::Undefined),
                value: entry.value.take(),
                prev: idx.checked_sub(1),
                next: None,
                removed: false,
            });
            if idx > 0 {
                entries[idx - 1].next = Some(idx);
            }
        }
        self.index = entries
            .iter()
            .enumerate()
            .map(|(slot, e)| (MapKey::from_value(&e.key), slot))
            .collect();
        self.head = if entries.is_empty() { None } else { Some(0) };
        self.tail = entries.len().checked_sub(1);
        self.entries = entries;
        self.tombstones = 0;
    }
}

impl Default for OrderedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowing iterator over live entries.
pub struct Iter<'a> {
    map: &'a OrderedMap,
    next: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Value, Option<&'a Value>);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = &self.map.entries[self.next?];
        self.next = entry.next;
        Some((&entry.key, entry.value.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.map.len))
    }
}

#[derive(Debug, Clone, Copy)]
enum CursorPosition {
    Start,
    At(usize),
    Done,
}

/// A detached iteration position that tolerates mutation of the map
/// between steps. Must only be advanced against the map that created it.
pub struct MapCursor {
    position: Rc<Cell<CursorPosition>>,
}

impl MapCursor {
    /// Advances to the next live entry, returning its key and value.
    pub fn next(&mut self, map: &OrderedMap) -> Option<(Value, Option<Value>)> {
        let candidate = match self.position.get() {
            CursorPosition::Start => map.head,
            CursorPosition::At(slot) => map.successor(slot),
            CursorPosition::Done => return None,
        };
        match candidate.and_then(|slot| map.entries.get(slot).map(|e| (slot, e))) {
            Some((slot, entry)) => {
                self.position.set(CursorPosition::At(slot));
                Some((entry.key.clone(), entry.value.clone()))
            }
            None => {
                self.position.set(CursorPosition::Done);
                None
            }
        }
    }
}
