use std::any::TypeId;
use std::collections::BTreeMap;

use crate::{Compute, Error, State};

/// Read access to the registered states and computes, handed to a compute
/// while it runs.
///
/// A compute should only read the cells it declared in
/// [`Compute::deps`](crate::Compute::deps); the dependency graph guarantees
/// declared dependencies are up to date when the compute runs.
pub struct Dep<'a> {
    states: &'a BTreeMap<TypeId, Box<dyn State>>,
    computes: &'a BTreeMap<TypeId, Box<dyn Compute>>,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(
        states: &'a BTreeMap<TypeId, Box<dyn State>>,
        computes: &'a BTreeMap<TypeId, Box<dyn Compute>>,
    ) -> Self {
        Self { states, computes }
    }

    pub fn try_state<T: State>(&self) -> Result<&'a T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found::<T>("Dep::try_state"))
    }

    /// # Panics
    /// Panics if the state type was never registered.
    pub fn get_state_ref<T: State>(&self) -> &'a T {
        match self.try_state::<T>() {
            Ok(state) => state,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_compute<T: Compute>(&self) -> Result<&'a T, Error> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|compute| compute.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::compute_not_found::<T>("Dep::try_compute"))
    }

    /// # Panics
    /// Panics if the compute type was never registered.
    pub fn get_compute_ref<T: Compute>(&self) -> &'a T {
        match self.try_compute::<T>() {
            Ok(compute) => compute,
            Err(err) => panic!("{err}"),
        }
    }
}
