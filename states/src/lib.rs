//! Explicit-dependency reactive state runtime.
//!
//! Cells come in two kinds: [`State`] (externally-set inputs) and
//! [`Compute`] (derived values). Computes declare their dependencies by
//! `TypeId`; the [`StateCtx`] keeps them in a [`Graph`], re-evaluating dirty
//! computes in topological order. Side effects live in [`Command`]s, which
//! publish results through an [`Updater`] channel so completion callbacks
//! can run on any thread.

mod command;
mod compute;
mod ctx;
mod dep;
mod error;
mod graph;
mod snapshot;
mod state;
mod updater;

pub use command::Command;
pub use compute::{Compute, ComputeDeps, assign_impl};
pub use ctx::StateCtx;
pub use dep::Dep;
pub use error::Error;
pub use graph::{DepRoute, Graph, TopologyError};
pub use snapshot::CommandSnapshot;
pub use state::{State, state_assign_impl};
pub use updater::Updater;
