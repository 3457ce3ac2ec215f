//! Per-agent key/value memory.
//!
//! Values are tagged ([`BbValue`]) and addressed by string keys. Typed access
//! goes through const [`BbKey`]s so callers never juggle the tag by hand:
//!
//! ```
//! use ai_core::{BbKey, Blackboard};
//!
//! const HEALTH: BbKey<f32> = BbKey::new("self.health");
//!
//! let mut bb = Blackboard::new();
//! bb.set(HEALTH, 0.75);
//! assert_eq!(bb.require(HEALTH), Ok(0.75));
//! ```
//!
//! Every write is stamped with the blackboard clock ([`Blackboard::begin_tick`]),
//! which is what freshness checks ([`Blackboard::require_fresh`]) compare against.
//!
//! Host objects that are not tagged values (trace sinks, encounter layers) live
//! in a separate typed attachment store addressed by [`SlotKey`].

use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Opaque identifier stored on the blackboard (agent ids, state ids, targets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Handle(pub u64);

/// Tick number at which something happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Ticks elapsed since this timestamp (saturating).
    pub fn age(self, now: u64) -> u64 {
        now.saturating_sub(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BbValue {
    Number(f32),
    Bool(bool),
    Handle(Handle),
    Position(Vec2),
    Timestamp(Timestamp),
}

impl BbValue {
    pub fn kind(&self) -> BbKind {
        match self {
            BbValue::Number(_) => BbKind::Number,
            BbValue::Bool(_) => BbKind::Bool,
            BbValue::Handle(_) => BbKind::Handle,
            BbValue::Position(_) => BbKind::Position,
            BbValue::Timestamp(_) => BbKind::Timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BbKind {
    Number,
    Bool,
    Handle,
    Position,
    Timestamp,
}

impl fmt::Display for BbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BbKind::Number => "number",
            BbKind::Bool => "bool",
            BbKind::Handle => "handle",
            BbKind::Position => "position",
            BbKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Rust types that map onto exactly one [`BbValue`] tag.
pub trait BbType: Copy + 'static {
    const KIND: BbKind;

    fn into_value(self) -> BbValue;

    fn from_value(value: BbValue) -> Option<Self>;
}

macro_rules! bb_type {
    ($ty:ty, $variant:ident) => {
        impl BbType for $ty {
            const KIND: BbKind = BbKind::$variant;

            fn into_value(self) -> BbValue {
                BbValue::$variant(self)
            }

            fn from_value(value: BbValue) -> Option<Self> {
                match value {
                    BbValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

bb_type!(f32, Number);
bb_type!(bool, Bool);
bb_type!(Handle, Handle);
bb_type!(Vec2, Position);
bb_type!(Timestamp, Timestamp);

/// Typed, const-constructible blackboard key.
pub struct BbKey<T: BbType> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: BbType> Copy for BbKey<T> {}

impl<T: BbType> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: BbType> fmt::Debug for BbKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BbKey<{}>({:?})", T::KIND, self.name)
    }
}

impl<T: BbType> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlackboardError {
    #[error("blackboard key `{key}` is missing")]
    Missing { key: Cow<'static, str> },

    #[error("blackboard key `{key}` holds a {found}, expected a {expected}")]
    TypeMismatch {
        key: Cow<'static, str>,
        expected: BbKind,
        found: BbKind,
    },

    #[error("blackboard key `{key}` is stale (written at tick {written_at}, now {now})")]
    Stale {
        key: Cow<'static, str>,
        written_at: u64,
        now: u64,
    },

    #[error("`{writer}` has no write access to blackboard key `{key}`")]
    NotGranted {
        writer: &'static str,
        key: Cow<'static, str>,
    },
}

impl BlackboardError {
    /// Key the error is about.
    pub fn key(&self) -> &str {
        match self {
            BlackboardError::Missing { key }
            | BlackboardError::TypeMismatch { key, .. }
            | BlackboardError::Stale { key, .. }
            | BlackboardError::NotGranted { key, .. } => &**key,
        }
    }
}

/// A stored value plus the tick it was written at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub value: BbValue,
    pub written_at: u64,
}

/// Key for a typed host attachment (see [`Blackboard::attach`]).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey<T: 'static> {
    id: u64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for SlotKey<T> {}

impl<T: 'static> Clone for SlotKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> SlotKey<T> {
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }
}

#[derive(Default)]
pub struct Blackboard {
    now: u64,
    values: BTreeMap<Cow<'static, str>, Entry>,
    slots: BTreeMap<u64, Box<dyn Any>>,
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blackboard")
            .field("now", &self.now)
            .field("values", &self.values)
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the blackboard clock. Subsequent writes are stamped with `tick`.
    pub fn begin_tick(&mut self, tick: u64) {
        self.now = tick;
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Drop all values (attachments are kept).
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn set<T: BbType>(&mut self, key: BbKey<T>, value: T) {
        self.write(Cow::Borrowed(key.name), value.into_value());
    }

    /// Untyped write, for hosts that build keys at runtime.
    pub fn set_value(&mut self, name: impl Into<Cow<'static, str>>, value: BbValue) {
        self.write(name.into(), value);
    }

    fn write(&mut self, name: Cow<'static, str>, value: BbValue) {
        let entry = Entry {
            value,
            written_at: self.now,
        };
        // Overwrites reuse the existing node instead of re-inserting the key.
        if let Some(slot) = self.values.get_mut(&*name) {
            *slot = entry;
        } else {
            self.values.insert(name, entry);
        }
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.values.get(name)
    }

    pub fn written_at(&self, name: &str) -> Option<u64> {
        self.values.get(name).map(|e| e.written_at)
    }

    /// Typed read; `None` when missing or holding another type.
    pub fn get<T: BbType>(&self, key: BbKey<T>) -> Option<T> {
        self.values
            .get(key.name)
            .and_then(|e| T::from_value(e.value))
    }

    /// Typed read that explains why the value is unavailable.
    pub fn require<T: BbType>(&self, key: BbKey<T>) -> Result<T, BlackboardError> {
        let entry = self.values.get(key.name).ok_or(BlackboardError::Missing {
            key: Cow::Borrowed(key.name),
        })?;
        T::from_value(entry.value).ok_or(BlackboardError::TypeMismatch {
            key: Cow::Borrowed(key.name),
            expected: T::KIND,
            found: entry.value.kind(),
        })
    }

    /// Like [`require`](Self::require) but rejects entries written more than
    /// `max_age_ticks` ticks ago.
    pub fn require_fresh<T: BbType>(
        &self,
        key: BbKey<T>,
        max_age_ticks: u64,
    ) -> Result<T, BlackboardError> {
        let value = self.require(key)?;
        let written_at = self.written_at(key.name).unwrap_or(self.now);
        if self.now.saturating_sub(written_at) > max_age_ticks {
            return Err(BlackboardError::Stale {
                key: Cow::Borrowed(key.name),
                written_at,
                now: self.now,
            });
        }
        Ok(value)
    }

    /// Typed read by runtime key name (keys loaded from config).
    pub fn require_named<T: BbType>(&self, name: &str) -> Result<T, BlackboardError> {
        let entry = self.values.get(name).ok_or_else(|| BlackboardError::Missing {
            key: Cow::Owned(name.to_owned()),
        })?;
        T::from_value(entry.value).ok_or_else(|| BlackboardError::TypeMismatch {
            key: Cow::Owned(name.to_owned()),
            expected: T::KIND,
            found: entry.value.kind(),
        })
    }

    pub fn remove<T: BbType>(&mut self, key: BbKey<T>) -> Option<T> {
        self.values
            .remove(key.name)
            .and_then(|e| T::from_value(e.value))
    }

    pub fn remove_value(&mut self, name: &str) -> Option<BbValue> {
        self.values.remove(name).map(|e| e.value)
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.values.iter().map(|(k, v)| (&**k, v))
    }

    /// Hand out write access restricted to `keys`.
    pub fn grant(&mut self, writer: &'static str, keys: &'static [&'static str]) -> ScopedWriter<'_> {
        ScopedWriter {
            blackboard: self,
            writer,
            keys,
        }
    }

    pub fn attach<T: 'static>(&mut self, key: SlotKey<T>, value: T) {
        self.slots.insert(key.id, Box::new(value));
    }

    pub fn has_attachment<T: 'static>(&self, key: SlotKey<T>) -> bool {
        self.slots.contains_key(&key.id)
    }

    pub fn attachment<T: 'static>(&self, key: SlotKey<T>) -> Option<&T> {
        let value = self.slots.get(&key.id)?;
        value.downcast_ref::<T>().or_else(|| {
            panic!(
                "blackboard attachment type mismatch for slot id={} (stored type differs from requested)",
                key.id
            )
        })
    }

    pub fn attachment_mut<T: 'static>(&mut self, key: SlotKey<T>) -> Option<&mut T> {
        let value = self.slots.get_mut(&key.id)?;
        value.downcast_mut::<T>().or_else(|| {
            panic!(
                "blackboard attachment type mismatch for slot id={} (stored type differs from requested)",
                key.id
            )
        })
    }

    pub fn detach<T: 'static>(&mut self, key: SlotKey<T>) -> Option<T> {
        let value = self.slots.remove(&key.id)?;
        value.downcast::<T>().map(|b| *b).ok().or_else(|| {
            panic!(
                "blackboard attachment type mismatch for slot id={} (stored type differs from requested)",
                key.id
            )
        })
    }
}

/// Write access to an explicit subset of keys.
///
/// External services (perception, difficulty) receive one of these instead of
/// the blackboard itself.
pub struct ScopedWriter<'a> {
    blackboard: &'a mut Blackboard,
    writer: &'static str,
    keys: &'static [&'static str],
}

impl ScopedWriter<'_> {
    pub fn writer(&self) -> &'static str {
        self.writer
    }

    pub fn may_write(&self, name: &str) -> bool {
        self.keys.contains(&name)
    }

    fn check(&self, name: &'static str) -> Result<(), BlackboardError> {
        if self.may_write(name) {
            Ok(())
        } else {
            Err(BlackboardError::NotGranted {
                writer: self.writer,
                key: Cow::Borrowed(name),
            })
        }
    }

    pub fn set<T: BbType>(&mut self, key: BbKey<T>, value: T) -> Result<(), BlackboardError> {
        self.check(key.name)?;
        self.blackboard.set(key, value);
        Ok(())
    }

    pub fn remove<T: BbType>(&mut self, key: BbKey<T>) -> Result<Option<T>, BlackboardError> {
        self.check(key.name)?;
        Ok(self.blackboard.remove(key))
    }

    /// Reads are unrestricted.
    pub fn get<T: BbType>(&self, key: BbKey<T>) -> Option<T> {
        self.blackboard.get(key)
    }

    pub fn now(&self) -> u64 {
        self.blackboard.now
    }
}
