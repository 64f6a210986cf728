//! Reference synchronous shared store.
//!
//! The core of the crate only needs the two collaborator primitives the
//! binder composes over: `dispatch` routing actions through the reducer,
//! and partition reads. This store supplies them for embeddings (and the
//! test suites) that do not bring their own: named partitions, each one
//! generation of [`SliceMap`], with subscriber notification when a fold
//! actually changed something.
//!
//! Single-threaded by construction: the handle is an `Rc` over interior
//! `RefCell` state, so it is `!Send`/`!Sync` like everything else here.
//! Subscribers run after all internal borrows are released and may
//! dispatch again; re-entering dispatch *during* a fold is a misuse
//! caught by a debug-only depth guard.

use crate::action::Action;
use crate::config;
use crate::reducer::{reduce, SliceMap};
#[cfg(debug_assertions)]
use core::cell::Cell;
use core::cell::RefCell;
use hashbrown::HashMap;
use slotmap::{DefaultKey, SlotMap};
use std::rc::Rc;

type Subscriber = Rc<dyn Fn(&Store)>;

/// Stable handle for one subscriber registration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubscriberId(DefaultKey);

struct StoreInner {
    partitions: RefCell<HashMap<Rc<str>, SliceMap>>,
    subscribers: RefCell<SlotMap<DefaultKey, Subscriber>>,
    #[cfg(debug_assertions)]
    fold_depth: Cell<u32>,
}

/// Cheap-clone handle to one shared store.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                partitions: RefCell::new(HashMap::new()),
                subscribers: RefCell::new(SlotMap::new()),
                #[cfg(debug_assertions)]
                fold_depth: Cell::new(0),
            }),
        }
    }

    /// Bootstrap a partition through the reducer's absent-state path.
    /// Mounting an existing partition leaves it untouched.
    pub fn mount(&self, partition: impl Into<Rc<str>>) {
        let name = partition.into();
        self.inner
            .partitions
            .borrow_mut()
            .entry(name.clone())
            .or_insert_with(|| reduce(None, &Action::other(config::INIT_ACTION_LABEL)));
        log::trace!("mounted partition {}", name);
    }

    /// Synchronously fold `action` through the reducer and notify
    /// subscribers if any partition's mapping changed generation.
    ///
    /// A `Set` targets its own partition, bootstrapping it first if the
    /// partition was never mounted, so the mapping always exists by the
    /// time a mutation lands. `Other` actions fold through every
    /// partition as reference-identical no-ops.
    pub fn dispatch(&self, action: Action) {
        log::trace!("dispatch {} {:?}", action.label(), action);
        let changed = self.fold(&action);
        if changed {
            self.notify();
        }
    }

    fn fold(&self, action: &Action) -> bool {
        #[cfg(debug_assertions)]
        let _depth = {
            let d = self.inner.fold_depth.get();
            assert!(d == 0, "dispatch re-entered while a fold is in flight");
            self.inner.fold_depth.set(d + 1);
            FoldGuard(&self.inner.fold_depth)
        };

        let mut partitions = self.inner.partitions.borrow_mut();
        match action {
            Action::Set(m) => {
                let (next, changed) = match partitions.get(m.partition.as_ref()) {
                    Some(current) => {
                        let next = reduce(Some(current), action);
                        let changed = !current.same(&next);
                        (next, changed)
                    }
                    None => {
                        let booted = reduce(None, action);
                        (reduce(Some(&booted), action), true)
                    }
                };
                partitions.insert(m.partition.clone(), next);
                changed
            }
            Action::Other { .. } => {
                let mut changed = false;
                for (_, map) in partitions.iter_mut() {
                    let next = reduce(Some(&*map), action);
                    if !map.same(&next) {
                        *map = next;
                        changed = true;
                    }
                }
                changed
            }
        }
    }

    fn notify(&self) {
        // Snapshot the subscriber list so callbacks are free to
        // subscribe, unsubscribe, or dispatch.
        let subscribers: Vec<Subscriber> =
            self.inner.subscribers.borrow().values().cloned().collect();
        for subscriber in subscribers {
            subscriber(self);
        }
    }

    /// Snapshot handle of the partition's current mapping generation.
    /// `None` when the partition was never mounted or written.
    pub fn partition(&self, name: &str) -> Option<SliceMap> {
        self.inner.partitions.borrow().get(name).cloned()
    }

    pub fn subscribe(&self, f: impl Fn(&Store) + 'static) -> SubscriberId {
        SubscriberId(self.inner.subscribers.borrow_mut().insert(Rc::new(f)))
    }

    /// Returns false when the id was already removed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.subscribers.borrow_mut().remove(id.0).is_some()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(debug_assertions)]
struct FoldGuard<'a>(&'a Cell<u32>);

#[cfg(debug_assertions)]
impl Drop for FoldGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}
