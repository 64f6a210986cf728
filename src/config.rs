//! Crate-wide defaults. Every one of these can be overridden per binder
//! (partition via [`Binder::with_partition`](crate::Binder::with_partition),
//! labels and key spec via [`BindOptions`](crate::BindOptions)); the
//! constants only decide what happens when the caller says nothing.

/// Partition of the outer store that holds local slices when no other
/// partition name is configured.
pub const DEFAULT_PARTITION: &str = "local";

/// Prefix for auto-generated per-instance keys.
pub const KEY_PREFIX: &str = "local-key-";

/// Diagnostic label for slice-replacement mutations.
pub const UPDATE_ACTION_LABEL: &str = "SET_LOCAL";

/// Diagnostic label for the clearing mutation dispatched when a key's
/// last reference detaches.
pub const UNMOUNT_ACTION_LABEL: &str = "CLEAR_LOCAL";

/// Label of the bootstrap action a partition is folded over when mounted.
pub const INIT_ACTION_LABEL: &str = "@@local/INIT";
