use std::any::Any;

use crate::{CommandSnapshot, Updater};

/// A manual-only side effect, dispatched explicitly via
/// [`StateCtx::dispatch`](crate::StateCtx::dispatch).
///
/// Commands receive a [`CommandSnapshot`] of the states and computes that
/// opted into snapshotting, so their completion callbacks can outlive the
/// dispatch without borrowing the context. Results are published through the
/// [`Updater`], to be applied by the next
/// [`sync_computes`](crate::StateCtx::sync_computes).
pub trait Command: Any {
    fn run(&self, snap: CommandSnapshot, updater: Updater);
}
