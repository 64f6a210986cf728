//! The keyed-slice lifecycle manager.
//!
//! A [`Binder`] is one configuration: it owns the reference-count table
//! shared by every consumer instance it produces, the allocator for
//! auto-generated keys, the partition it reads and writes, and the
//! default diagnostic labels. A [`Binding`] is one attached consumer
//! instance walking the lifecycle:
//!
//! ```text
//! Unattached -> Attached(k) -> Detached
//!                  |  ^
//!                  v  |          in-place re-key when the derived
//!               Attached(k')     key moves between renders
//! ```
//!
//! Attach increments the key's reference; a re-key increments the new
//! key before running the cleanup policy against the old one; dropping
//! the binding runs the cleanup policy against the current key. The
//! cleanup policy dispatches the clearing mutation exactly when the last
//! reference detaches and persistence was not requested.

use crate::action::{slice_value, Action, SliceMutation, SliceValue};
use crate::config;
use crate::key::{KeyAllocator, KeySpec, SliceKey};
use crate::ref_counter::RefCounter;
use crate::store::Store;
use core::any::Any;
use core::cell::RefCell;
use core::marker::PhantomData;
use std::rc::Rc;

/// Everything a binder recognizes. One structure, stated defaults; there
/// is no other configuration path.
pub struct BindOptions<P> {
    /// How instances resolve their key. Default: a unique auto key per
    /// instance.
    pub key: KeySpec<P>,
    /// Keep a key's slice in the store after its last reference
    /// detaches. Default: false, the slice is cleared.
    pub persist: bool,
    /// Label for slice-replacement dispatches from this binder's
    /// setters. Default: [`config::UPDATE_ACTION_LABEL`].
    pub update_label: Option<Rc<str>>,
    /// Label for the clearing dispatch at detach time.
    /// Default: [`config::UNMOUNT_ACTION_LABEL`].
    pub unmount_label: Option<Rc<str>>,
}

impl<P> Default for BindOptions<P> {
    fn default() -> Self {
        Self {
            key: KeySpec::Auto,
            persist: false,
            update_label: None,
            unmount_label: None,
        }
    }
}

struct BinderShared<P> {
    store: Store,
    partition: Rc<str>,
    refs: RefCell<RefCounter>,
    keys: KeyAllocator,
    key_spec: KeySpec<P>,
    persist: bool,
    update_label: Rc<str>,
    unmount_label: Rc<str>,
}

impl<P> BinderShared<P> {
    /// Cleanup policy: drop one reference from `key` and clear its slice
    /// if that was the last one and persistence was not requested.
    fn release(&self, key: &SliceKey) {
        let remaining = self.refs.borrow_mut().decr(key);
        log::trace!("detached key {} (refs {})", key, remaining);
        if remaining == 0 && !self.persist {
            self.store.dispatch(Action::Set(SliceMutation {
                partition: self.partition.clone(),
                key: key.clone(),
                value: None,
                label: self.unmount_label.clone(),
            }));
        }
    }
}

/// One lifecycle configuration over a store partition. Cheap to clone;
/// clones share the reference-count table and the key allocator.
pub struct Binder<P, S> {
    shared: Rc<BinderShared<P>>,
    _slice: PhantomData<fn() -> S>,
}

impl<P, S> Clone for Binder<P, S> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            _slice: PhantomData,
        }
    }
}

impl<P, S: Any> Binder<P, S> {
    /// Binder over the default partition.
    pub fn new(store: &Store, opts: BindOptions<P>) -> Self {
        Self::with_partition(store, config::DEFAULT_PARTITION, opts)
    }

    /// Binder over a named partition. Binders over different partitions
    /// are fully independent, auto-key collisions included.
    pub fn with_partition(
        store: &Store,
        partition: impl Into<Rc<str>>,
        opts: BindOptions<P>,
    ) -> Self {
        let partition = partition.into();
        store.mount(partition.clone());
        Self {
            shared: Rc::new(BinderShared {
                store: store.clone(),
                partition,
                refs: RefCell::new(RefCounter::new()),
                keys: KeyAllocator::new(config::KEY_PREFIX),
                key_spec: opts.key,
                persist: opts.persist,
                update_label: opts
                    .update_label
                    .unwrap_or_else(|| Rc::from(config::UPDATE_ACTION_LABEL)),
                unmount_label: opts
                    .unmount_label
                    .unwrap_or_else(|| Rc::from(config::UNMOUNT_ACTION_LABEL)),
            }),
            _slice: PhantomData,
        }
    }

    pub fn partition(&self) -> &str {
        &self.shared.partition
    }

    /// Current reference count for a key, for diagnostics and tests.
    pub fn ref_count(&self, key: &str) -> usize {
        self.shared.refs.borrow().count(key)
    }

    /// Attach one consumer instance: resolve its initial key and take a
    /// reference on it.
    pub fn attach(&self, props: &P) -> Binding<P, S> {
        let resolver = match &self.shared.key_spec {
            KeySpec::Auto => InstanceKey::Pinned(self.shared.keys.mint()),
            KeySpec::Fixed(k) => InstanceKey::Pinned(k.clone()),
            KeySpec::Derived(f) => InstanceKey::Derived(f.clone()),
        };
        let key = resolver.resolve(props);
        let count = self.shared.refs.borrow_mut().incr(&key);
        log::trace!("attached key {} (refs {})", key, count);
        Binding {
            shared: self.shared.clone(),
            resolver,
            key,
            _slice: PhantomData,
        }
    }
}

/// Key resolution pinned to one consumer instance. `Auto` and `Fixed`
/// specs pin at attach time; `Derived` keeps the pure function around
/// and re-runs it at every property change.
enum InstanceKey<P> {
    Pinned(SliceKey),
    Derived(Rc<dyn Fn(&P) -> SliceKey>),
}

impl<P> InstanceKey<P> {
    fn resolve(&self, props: &P) -> SliceKey {
        match self {
            InstanceKey::Pinned(k) => k.clone(),
            InstanceKey::Derived(f) => f(props),
        }
    }
}

/// One attached consumer instance. Dropping it is the detach transition.
pub struct Binding<P, S> {
    shared: Rc<BinderShared<P>>,
    resolver: InstanceKey<P>,
    key: SliceKey,
    _slice: PhantomData<fn() -> S>,
}

impl<P, S> Binding<P, S> {
    /// The key this instance currently reads and writes.
    pub fn key(&self) -> &SliceKey {
        &self.key
    }

    /// Re-evaluate the resolved key against the current properties and
    /// shift the reference when it moved: the new key gains its
    /// reference before the cleanup policy runs against the old one.
    pub fn sync(&mut self, props: &P) {
        let next = self.resolver.resolve(props);
        if next != self.key {
            let count = self.shared.refs.borrow_mut().incr(&next);
            log::trace!("re-keyed {} -> {} (refs {})", self.key, next, count);
            let old = core::mem::replace(&mut self.key, next);
            self.shared.release(&old);
        }
    }

    /// Setter bound to the key as resolved *now*, for this render. It
    /// never re-resolves at call time: the caller always mutates the
    /// slice it was shown, even if the binding re-keys afterwards.
    pub fn setter(&self) -> SetLocal<S> {
        SetLocal {
            store: self.shared.store.clone(),
            partition: self.shared.partition.clone(),
            key: self.key.clone(),
            label: self.shared.update_label.clone(),
            _slice: PhantomData,
        }
    }
}

impl<P, S: Any> Binding<P, S> {
    /// Current slice value. An unmounted partition, a never-written key,
    /// and the absent sentinel all read as `None`; none of them is a
    /// fault.
    pub fn read(&self) -> Option<Rc<S>> {
        let map = self.shared.store.partition(&self.shared.partition)?;
        map.slice_as::<S>(self.key.as_str())
    }
}

impl<P, S> Drop for Binding<P, S> {
    fn drop(&mut self) {
        self.shared.release(&self.key);
    }
}

/// Writer handle for one resolved key: wholesale replacement only, no
/// merging. Replacing a value is trivial for the consumer to do itself,
/// and merging would leave stray entries behind on shape changes.
pub struct SetLocal<S> {
    store: Store,
    partition: Rc<str>,
    key: SliceKey,
    label: Rc<str>,
    _slice: PhantomData<fn(S)>,
}

impl<S> Clone for SetLocal<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            partition: self.partition.clone(),
            key: self.key.clone(),
            label: self.label.clone(),
            _slice: PhantomData,
        }
    }
}

impl<S: Any> SetLocal<S> {
    /// The key this setter writes.
    pub fn key(&self) -> &SliceKey {
        &self.key
    }

    /// Replace the slice with `value`, labeled with the binder's update
    /// label.
    pub fn set(&self, value: S) {
        self.dispatch(slice_value(value), self.label.clone());
    }

    /// Replace the slice with `value` under a caller-supplied label.
    pub fn set_labeled(&self, value: S, label: &str) {
        self.dispatch(slice_value(value), Rc::from(label));
    }

    /// Write the absent sentinel.
    pub fn clear(&self) {
        self.dispatch(None, self.label.clone());
    }

    /// Write the absent sentinel under a caller-supplied label.
    pub fn clear_labeled(&self, label: &str) {
        self.dispatch(None, Rc::from(label));
    }

    fn dispatch(&self, value: SliceValue, label: Rc<str>) {
        self.store.dispatch(Action::Set(SliceMutation {
            partition: self.partition.clone(),
            key: self.key.clone(),
            value,
            label,
        }));
    }
}
