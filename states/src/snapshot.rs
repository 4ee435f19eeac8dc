use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;

use crate::{Compute, State};

/// Send-safe clones of the snapshottable states and computes, taken at
/// dispatch time for a [`Command`](crate::Command).
///
/// `TypeId` is unique across states and computes, so one map holds both.
#[derive(Default)]
pub struct CommandSnapshot {
    inner: BTreeMap<TypeId, Box<dyn Any + Send>>,
}

impl CommandSnapshot {
    pub(crate) fn insert(&mut self, id: TypeId, value: Box<dyn Any + Send>) {
        self.inner.insert(id, value);
    }

    fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.inner
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .cloned()
    }

    /// # Panics
    /// Panics if the state did not opt into snapshotting.
    pub fn state<T: State + Clone>(&self) -> T {
        self.get::<T>()
            .unwrap_or_else(|| panic!("state snapshot for {} is missing", type_name::<T>()))
    }

    /// # Panics
    /// Panics if the compute did not opt into snapshotting.
    pub fn compute<T: Compute + Clone>(&self) -> T {
        self.get::<T>()
            .unwrap_or_else(|| panic!("compute snapshot for {} is missing", type_name::<T>()))
    }
}
