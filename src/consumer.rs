//! Explicit decorator composition over the composition framework's
//! lifecycle.
//!
//! The framework drives the outer [`Lifecycle`] contract with the
//! consumer's own properties at each evaluation point. [`Connected`]
//! wraps an inner [`Consumer`] definition into that outer contract:
//! mount attaches a binding, update re-syncs the key and re-renders,
//! unmount detaches. On every render the user transform turns
//! `(slice, setter, own-properties)` into the inner consumer's
//! view-model, so the inner definition never sees the store at all.

use crate::binder::{Binder, Binding, SetLocal};
use crate::key::SliceKey;
use core::any::Any;
use std::rc::Rc;

/// The inner, wrapped consumer definition: all it declares is the
/// view-model it renders from.
pub trait Consumer {
    type ViewModel;
    fn render(&mut self, vm: Self::ViewModel);
}

/// The outer contract the composition framework drives. Own properties
/// are supplied at every evaluation point; delivery order per instance
/// is mount, any number of updates, unmount.
pub trait Lifecycle {
    type Props;
    fn mount(&mut self, props: &Self::Props);
    fn update(&mut self, props: &Self::Props);
    fn unmount(&mut self);
}

/// A consumer definition produced by [`Binder::connect`]: the inner
/// consumer plus the binding state machine, exposed to the framework
/// under the narrower own-properties contract.
pub struct Connected<P, S, C, F> {
    binder: Binder<P, S>,
    map: F,
    inner: C,
    binding: Option<Binding<P, S>>,
}

impl<P, S: Any> Binder<P, S> {
    /// Wrap `inner` into a new consumer definition. `map` runs on every
    /// render with the current slice, a setter bound to the key resolved
    /// for that render, and the instance's own properties.
    pub fn connect<C, F>(&self, map: F, inner: C) -> Connected<P, S, C, F>
    where
        C: Consumer,
        F: Fn(Option<Rc<S>>, SetLocal<S>, &P) -> C::ViewModel,
    {
        Connected {
            binder: self.clone(),
            map,
            inner,
            binding: None,
        }
    }
}

impl<P, S, C, F> Connected<P, S, C, F> {
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_some()
    }

    /// The currently resolved key, while attached.
    pub fn key(&self) -> Option<&SliceKey> {
        self.binding.as_ref().map(Binding::key)
    }
}

impl<P, S, C, F> Connected<P, S, C, F>
where
    S: Any,
    C: Consumer,
    F: Fn(Option<Rc<S>>, SetLocal<S>, &P) -> C::ViewModel,
{
    fn render_current(&mut self, props: &P) {
        if let Some(binding) = &self.binding {
            let vm = (self.map)(binding.read(), binding.setter(), props);
            self.inner.render(vm);
        }
    }
}

impl<P, S, C, F> Lifecycle for Connected<P, S, C, F>
where
    S: Any,
    C: Consumer,
    F: Fn(Option<Rc<S>>, SetLocal<S>, &P) -> C::ViewModel,
{
    type Props = P;

    fn mount(&mut self, props: &P) {
        debug_assert!(self.binding.is_none(), "mount on an attached consumer");
        self.binding = Some(self.binder.attach(props));
        self.render_current(props);
    }

    fn update(&mut self, props: &P) {
        debug_assert!(self.binding.is_some(), "update on a detached consumer");
        if let Some(binding) = self.binding.as_mut() {
            binding.sync(props);
        }
        self.render_current(props);
    }

    fn unmount(&mut self) {
        // Dropping the binding is the detach transition. Taking it out
        // makes a repeated unmount a no-op at this layer.
        self.binding = None;
    }
}
