//! The action vocabulary the reducer folds over.
//!
//! Mutations are a tagged variant, never a structural probe: the store
//! and reducer dispatch on the enum tag alone. `Other` stands in for
//! every unrelated action flowing through the same store; the reducer
//! passes those through untouched.

use crate::key::SliceKey;
use core::any::Any;
use core::fmt;
use std::rc::Rc;

/// Value stored under one key. `None` is the explicit absent sentinel
/// written by cleanup; it is stored at the key, not a physical deletion.
///
/// Values are shared dynamically-typed pointers because one partition
/// holds slices owned by binders of different concrete types; a binding
/// downcasts on read.
pub type SliceValue = Option<Rc<dyn Any>>;

/// Wrap a concrete value for storage.
pub fn slice_value<T: Any>(value: T) -> SliceValue {
    Some(Rc::new(value))
}

/// A slice-replacement mutation. The replacement is wholesale, never a
/// merge. `partition` is routing metadata for the store; the reducer
/// itself ignores it. `label` is diagnostics only.
#[derive(Clone)]
pub struct SliceMutation {
    pub partition: Rc<str>,
    pub key: SliceKey,
    pub value: SliceValue,
    pub label: Rc<str>,
}

/// An action flowing through the shared store.
#[derive(Clone)]
pub enum Action {
    /// Anything that is not a slice mutation. A no-op for the reducer.
    Other { label: Rc<str> },
    /// Replace (or clear) one key's slice.
    Set(SliceMutation),
}

impl Action {
    pub fn other(label: impl Into<Rc<str>>) -> Self {
        Action::Other {
            label: label.into(),
        }
    }

    pub fn set(
        partition: impl Into<Rc<str>>,
        key: impl Into<SliceKey>,
        value: SliceValue,
        label: impl Into<Rc<str>>,
    ) -> Self {
        Action::Set(SliceMutation {
            partition: partition.into(),
            key: key.into(),
            value,
            label: label.into(),
        })
    }

    /// Diagnostic label of either variant.
    pub fn label(&self) -> &str {
        match self {
            Action::Other { label } => label,
            Action::Set(m) => &m.label,
        }
    }
}

impl fmt::Debug for SliceMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceMutation")
            .field("partition", &self.partition)
            .field("key", &self.key)
            .field(
                "value",
                &if self.value.is_some() { "<value>" } else { "<absent>" },
            )
            .field("label", &self.label)
            .finish()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Other { label } => f.debug_struct("Other").field("label", label).finish(),
            Action::Set(m) => f.debug_tuple("Set").field(m).finish(),
        }
    }
}
