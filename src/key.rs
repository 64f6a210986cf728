//! Key resolution: which slot in the shared mapping a consumer instance
//! reads and writes.
//!
//! A [`KeySpec`] belongs to one binder configuration and says how each
//! instance gets its key: minted fresh per instance (isolation, the
//! default), a fixed constant, or derived from the instance's own
//! properties (coinciding outputs share a slice). Resolution itself is
//! pure; the binder owns the reference-count transition when a derived
//! key moves between renders.

use core::borrow::Borrow;
use core::cell::Cell;
use core::fmt;
use std::rc::Rc;

/// A key in the shared slice mapping. Cheap to clone and to compare;
/// lookups accept plain `&str` via `Borrow`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SliceKey(Rc<str>);

impl SliceKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SliceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SliceKey {
    fn from(s: &str) -> Self {
        SliceKey(Rc::from(s))
    }
}

impl From<String> for SliceKey {
    fn from(s: String) -> Self {
        SliceKey(Rc::from(s))
    }
}

impl From<Rc<str>> for SliceKey {
    fn from(s: Rc<str>) -> Self {
        SliceKey(s)
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-binder key configuration.
pub enum KeySpec<P> {
    /// Mint a unique key per consumer instance at first resolution,
    /// stable for that instance's lifetime.
    Auto,
    /// One caller-supplied key, shared by every instance of the binder.
    Fixed(SliceKey),
    /// Pure function of the instance's own properties, recomputed on
    /// every property change.
    Derived(Rc<dyn Fn(&P) -> SliceKey>),
}

impl<P> KeySpec<P> {
    pub fn fixed(key: impl Into<SliceKey>) -> Self {
        KeySpec::Fixed(key.into())
    }

    pub fn derived(f: impl Fn(&P) -> SliceKey + 'static) -> Self {
        KeySpec::Derived(Rc::new(f))
    }
}

impl<P> Clone for KeySpec<P> {
    fn clone(&self) -> Self {
        match self {
            KeySpec::Auto => KeySpec::Auto,
            KeySpec::Fixed(k) => KeySpec::Fixed(k.clone()),
            KeySpec::Derived(f) => KeySpec::Derived(f.clone()),
        }
    }
}

impl<P> Default for KeySpec<P> {
    fn default() -> Self {
        KeySpec::Auto
    }
}

impl<P> fmt::Debug for KeySpec<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Auto => f.write_str("Auto"),
            KeySpec::Fixed(k) => f.debug_tuple("Fixed").field(k).finish(),
            KeySpec::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Monotonic source of auto-generated keys, owned by one binder
/// configuration. Single-threaded by design (`Cell`, no atomics).
pub struct KeyAllocator {
    prefix: Rc<str>,
    next: Cell<u64>,
}

impl KeyAllocator {
    pub fn new(prefix: impl Into<Rc<str>>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(0),
        }
    }

    /// Mint the next key: `<prefix><n>`.
    pub fn mint(&self) -> SliceKey {
        let n = self.next.get();
        self.next.set(n + 1);
        SliceKey::from(format!("{}{}", self.prefix, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_mints_distinct_prefixed_keys() {
        let keys = KeyAllocator::new("k-");
        assert_eq!(keys.mint().as_str(), "k-0");
        assert_eq!(keys.mint().as_str(), "k-1");
        assert_eq!(keys.mint().as_str(), "k-2");
    }

    #[test]
    fn two_allocators_are_independent() {
        let a = KeyAllocator::new("a-");
        let b = KeyAllocator::new("a-");
        // Same prefix, separate counters: both start at zero.
        assert_eq!(a.mint(), b.mint());
    }

    #[test]
    fn derived_spec_recomputes_from_props() {
        let spec: KeySpec<String> = KeySpec::derived(|p: &String| p.as_str().into());
        match spec {
            KeySpec::Derived(f) => {
                assert_eq!(f(&"blue".to_string()).as_str(), "blue");
                assert_eq!(f(&"red".to_string()).as_str(), "red");
            }
            _ => panic!("expected derived spec"),
        }
    }

    #[test]
    fn key_lookup_by_str() {
        use hashbrown::HashMap;
        let mut m: HashMap<SliceKey, u32> = HashMap::new();
        m.insert(SliceKey::from("blue"), 1);
        assert_eq!(m.get("blue"), Some(&1));
        assert_eq!(m.get("red"), None);
    }
}
