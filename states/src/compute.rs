use std::any::{Any, TypeId};

use crate::{Dep, Updater};

/// Declared dependencies of a compute: `(state ids, compute ids)`.
/// Queried once, when the compute is recorded.
pub type ComputeDeps = (Vec<TypeId>, Vec<TypeId>);

/// A derived reactive cell.
///
/// A compute re-runs when any of its declared dependencies changes. Its
/// `compute` body reads dependencies through [`Dep`] and publishes its new
/// value through the [`Updater`]; it must not perform side effects such as
/// network IO, because computes can run implicitly (startup, dirty
/// propagation). Side effects belong in [`Command`](crate::Command)s.
///
/// Some computes are command-updated caches: their `compute` body is a
/// deliberate no-op and new values arrive only via `Updater::set` from a
/// command or its completion callback.
pub trait Compute: Any {
    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>, updater: Updater);

    fn as_any(&self) -> &dyn Any;

    /// Send-safe clone used to build a [`CommandSnapshot`](crate::CommandSnapshot).
    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    /// Apply a new value delivered through the updater channel.
    ///
    /// Implementations may reject the value (e.g. a stale generation) by
    /// leaving `self` untouched.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Default `assign_box` body for computes: downcast and replace wholesale.
pub fn assign_impl<T: Compute>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(new_value) => *target = *new_value,
        Err(_) => log::error!(
            "compute assign: type mismatch, expected {}",
            std::any::type_name::<T>()
        ),
    }
}
