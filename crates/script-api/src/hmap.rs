//! Heterogeneous configuration container
//!
//! A [`HeterogeneousMap`] stores values of arbitrary types, each addressed by
//! a [`Key<T>`] that fixes the value type at compile time. Keys are compared
//! by identity: two keys created with the same name are still distinct
//! entries.
//!
//! # Example
//!
//! ```
//! use script_api::{HeterogeneousMap, Key};
//!
//! let imports: Key<Vec<String>> = Key::new("imports");
//! let verbose: Key<bool> = Key::new("verbose");
//!
//! let map = HeterogeneousMap::new()
//!     .with(&imports, vec!["kotlin.*".to_string()])
//!     .with(&verbose, true);
//!
//! assert_eq!(map.get(&verbose), Some(&true));
//! assert_eq!(map.get(&imports).map(Vec::len), Some(1));
//! ```
//!
//! # Merge semantics
//!
//! [`HeterogeneousMap::merge`] is last-writer-wins per key: every key present
//! in the right-hand map replaces the left-hand value, keys only present on
//! the left are kept. Merging a fixed sequence of maps left to right is
//! therefore deterministic, but regrouping a sequence in which the same key
//! is written by three different maps can change which value survives when
//! the grouping also changes the call order.
//!
//! # Equality
//!
//! Maps compare and hash by content so they can key caches. Values stored
//! with [`HeterogeneousMap::set`] must be `PartialEq + Hash` for that.
//! Anything else (`f64`, `HashMap`, provider types) goes through
//! [`HeterogeneousMap::set_opaque`] and is compared by identity.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Key`], unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(u64);

/// Values that can be stored in a [`HeterogeneousMap`]
///
/// Implemented for every `'static` type that is `Debug + Send + Sync`, so
/// providers never implement it by hand.
pub trait ConfigValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T> ConfigValue for T
where
    T: Any + fmt::Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Values that take part in map equality and hashing by content
///
/// Implemented for every [`ConfigValue`] that is also `PartialEq + Hash`.
pub trait ComparableValue: ConfigValue {
    fn dyn_eq(&self, other: &dyn Any) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T> ComparableValue for T
where
    T: ConfigValue + PartialEq + Hash,
{
    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

/// A typed key into a [`HeterogeneousMap`]
///
/// Every call to [`Key::new`] yields a fresh identity. Well-known keys are
/// declared once as statics (see [`crate::keys`]) and shared by reference.
pub struct Key<T> {
    id: KeyId,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ConfigValue> Key<T> {
    /// Create a new key with a display name
    pub fn new(name: &'static str) -> Self {
        Self {
            id: KeyId(NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed)),
            name,
            _marker: PhantomData,
        }
    }
}

impl<T> Key<T> {
    /// Identity of this key
    pub fn id(&self) -> KeyId {
        self.id
    }

    /// Display name, used for debugging only
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}#{})", self.name, self.id.0)
    }
}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Key<T> {}

/// A key present in a map, as reported by [`HeterogeneousMap::keys`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    pub id: KeyId,
    pub name: &'static str,
}

#[derive(Clone)]
enum Stored {
    /// Compared and hashed by content
    Comparable(Arc<dyn ComparableValue>),
    /// Equal only to itself (the same allocation), hashed by key alone
    Opaque(Arc<dyn ConfigValue>),
}

impl Stored {
    fn as_any(&self) -> &dyn Any {
        match self {
            Self::Comparable(value) => ConfigValue::as_any(value.as_ref()),
            Self::Opaque(value) => ConfigValue::as_any(value.as_ref()),
        }
    }

    fn same(&self, other: &Stored) -> bool {
        match (self, other) {
            (Self::Comparable(a), Self::Comparable(b)) => {
                a.as_ref().dyn_eq(ConfigValue::as_any(b.as_ref()))
            }
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Stored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparable(value) => fmt::Debug::fmt(value.as_ref(), f),
            Self::Opaque(value) => fmt::Debug::fmt(value.as_ref(), f),
        }
    }
}

#[derive(Clone)]
struct Entry {
    name: &'static str,
    value: Stored,
}

/// Mapping from typed keys to values
///
/// Values are shared behind `Arc`, so cloning a map is cheap and a clone is
/// fully independent: setting a key on one copy never affects another.
#[derive(Clone, Default)]
pub struct HeterogeneousMap {
    entries: BTreeMap<KeyId, Entry>,
}

impl HeterogeneousMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys present
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no key is present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the value stored for `key`
    ///
    /// Returns `None` when the key is absent. The stored value always has
    /// the key's type, a mismatch is impossible by construction and would
    /// also surface as `None`.
    pub fn get<T: ConfigValue>(&self, key: &Key<T>) -> Option<&T> {
        self.entries
            .get(&key.id)
            .and_then(|entry| entry.value.as_any().downcast_ref::<T>())
    }

    /// Look up a value and clone it out of the map
    pub fn get_cloned<T: ConfigValue + Clone>(&self, key: &Key<T>) -> Option<T> {
        self.get(key).cloned()
    }

    /// Look up a value, falling back to `T::default()`
    pub fn get_or_default<T: ConfigValue + Clone + Default>(&self, key: &Key<T>) -> T {
        self.get_cloned(key).unwrap_or_default()
    }

    /// Check if `key` has a value
    pub fn contains<T>(&self, key: &Key<T>) -> bool {
        self.entries.contains_key(&key.id)
    }

    /// Store `value` for `key`, replacing any previous value
    ///
    /// The value takes part in map equality and hashing by content. Use
    /// [`HeterogeneousMap::set_opaque`] for types that are not `PartialEq + Hash`.
    pub fn set<T: ComparableValue>(&mut self, key: &Key<T>, value: T) {
        self.insert(key, Stored::Comparable(Arc::new(value)));
    }

    /// Builder form of [`HeterogeneousMap::set`]
    pub fn with<T: ComparableValue>(mut self, key: &Key<T>, value: T) -> Self {
        self.set(key, value);
        self
    }

    /// Store a value that cannot be compared by content, e.g. an `f64`
    ///
    /// Two maps holding opaque values are only equal when they share the
    /// same stored value, which is the case for clones and merges of one map.
    pub fn set_opaque<T: ConfigValue>(&mut self, key: &Key<T>, value: T) {
        self.insert(key, Stored::Opaque(Arc::new(value)));
    }

    /// Builder form of [`HeterogeneousMap::set_opaque`]
    pub fn with_opaque<T: ConfigValue>(mut self, key: &Key<T>, value: T) -> Self {
        self.set_opaque(key, value);
        self
    }

    fn insert<T>(&mut self, key: &Key<T>, value: Stored) {
        self.entries.insert(
            key.id,
            Entry {
                name: key.name,
                value,
            },
        );
    }

    /// Remove the value stored for `key`, returning whether one was present
    pub fn remove<T>(&mut self, key: &Key<T>) -> bool {
        self.entries.remove(&key.id).is_some()
    }

    /// Merge `other` into this map; values from `other` win on conflict
    pub fn merge(&mut self, other: &HeterogeneousMap) {
        for (id, entry) in &other.entries {
            self.entries.insert(*id, entry.clone());
        }
    }

    /// Builder form of [`HeterogeneousMap::merge`]
    pub fn merged(mut self, other: &HeterogeneousMap) -> Self {
        self.merge(other);
        self
    }

    /// Enumerate the keys present, in key creation order
    pub fn keys(&self) -> impl Iterator<Item = KeyInfo> + '_ {
        self.entries.iter().map(|(id, entry)| KeyInfo {
            id: *id,
            name: entry.name,
        })
    }
}

impl PartialEq for HeterogeneousMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((id_a, a), (id_b, b))| id_a == id_b && a.value.same(&b.value))
    }
}

impl Eq for HeterogeneousMap {}

impl Hash for HeterogeneousMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.len().hash(state);
        for (id, entry) in &self.entries {
            id.hash(state);
            if let Stored::Comparable(value) = &entry.value {
                value.as_ref().dyn_hash(state);
            }
        }
    }
}

impl fmt::Debug for HeterogeneousMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.values().map(|entry| (entry.name, &entry.value)))
            .finish()
    }
}
