use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    Command, Compute, Dep, Error, Graph, State, TopologyError, Updater,
};

type Update = (TypeId, Box<dyn Any + Send>);

/// Owner of every reactive cell and of the dependency graph between them.
///
/// Mutations funnel through three entry points:
/// - [`set_state`](Self::set_state) replaces an input cell wholesale and
///   marks its dependents dirty;
/// - [`dispatch`](Self::dispatch) runs a recorded command, whose results
///   arrive through the updater channel;
/// - [`run_computed`](Self::run_computed) drains pending updates and
///   re-evaluates dirty computes in topological order.
///
/// Single-threaded by design: callbacks on other threads only ever touch the
/// channel via a cloned [`Updater`].
pub struct StateCtx {
    states: BTreeMap<TypeId, Box<dyn State>>,
    computes: BTreeMap<TypeId, Box<dyn Compute>>,
    commands: BTreeMap<TypeId, Box<dyn Command>>,

    graph: Graph<TypeId>,
    /// Compute ids in dependency order, rebuilt on every `record_compute`.
    order: Vec<TypeId>,
    dirty: BTreeSet<TypeId>,

    send: flume::Sender<Update>,
    recv: flume::Receiver<Update>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            computes: BTreeMap::new(),
            commands: BTreeMap::new(),
            graph: Graph::new(),
            order: Vec::new(),
            dirty: BTreeSet::new(),
            send,
            recv,
        }
    }

    /// Register an input state. Replaces any previous value of the same type.
    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(TypeId::of::<T>(), Box::new(state));
        self.mark_dependents_dirty(TypeId::of::<T>());
    }

    /// Full replacement of an input state, never a merge.
    pub fn set_state<T: State>(&mut self, state: T) {
        self.add_state(state);
    }

    pub fn state<T: State>(&self) -> Option<&T> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
    }

    /// Register a derived cell and wire its declared dependencies into the
    /// graph. Errors if the graph becomes cyclic.
    pub fn record_compute<T: Compute>(
        &mut self,
        compute: T,
    ) -> Result<(), TopologyError<TypeId>> {
        let id = TypeId::of::<T>();
        let (state_deps, compute_deps) = compute.deps();
        for dep in state_deps.into_iter().chain(compute_deps) {
            self.graph.add_edge(dep, id);
        }
        self.computes.insert(id, Box::new(compute));
        self.dirty.insert(id);

        let sorted = self.graph.topology_sort()?;
        let mut order: Vec<TypeId> = sorted
            .into_iter()
            .filter(|node| self.computes.contains_key(node))
            .collect();
        // Computes with no edges never show up in the sort output; keep
        // them runnable by appending them.
        for known in self.computes.keys() {
            if !order.contains(known) {
                order.push(*known);
            }
        }
        self.order = order;
        Ok(())
    }

    /// Read the cached value of a derived cell.
    pub fn cached<T: Compute>(&self) -> Option<&T> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|compute| compute.as_any().downcast_ref::<T>())
    }

    pub fn record_command<C: Command>(&mut self, command: C) {
        self.commands.insert(TypeId::of::<C>(), Box::new(command));
    }

    /// Run a recorded command against a snapshot of the current cells.
    ///
    /// The command runs synchronously; any IO it starts reports back through
    /// the updater channel.
    pub fn dispatch<C: Command>(&self) -> Result<(), Error> {
        let command = self
            .commands
            .get(&TypeId::of::<C>())
            .ok_or_else(|| Error::command_not_found::<C>("StateCtx::dispatch"))?;
        command.run(self.take_snapshot(), self.updater());
        Ok(())
    }

    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    fn take_snapshot(&self) -> crate::CommandSnapshot {
        let mut snap = crate::CommandSnapshot::default();
        for (id, state) in &self.states {
            if let Some(cloned) = state.snapshot() {
                snap.insert(*id, cloned);
            }
        }
        for (id, compute) in &self.computes {
            if let Some(cloned) = compute.snapshot() {
                snap.insert(*id, cloned);
            }
        }
        snap
    }

    /// Drain the updater channel, applying each value to its cell and
    /// marking the cell's dependents dirty.
    pub fn sync_computes(&mut self) {
        while let Ok((id, value)) = self.recv.try_recv() {
            if let Some(compute) = self.computes.get_mut(&id) {
                compute.assign_box(value);
            } else if let Some(state) = self.states.get_mut(&id) {
                state.assign_box(value);
            } else {
                log::warn!("sync_computes: update for unregistered cell {id:?}");
                continue;
            }
            self.mark_dependents_dirty(id);
        }
    }

    /// Apply pending updates and re-evaluate every dirty compute, in
    /// topological order so a compute always sees fresh dependencies.
    pub fn run_computed(&mut self) {
        self.sync_computes();
        let order = self.order.clone();
        for id in order {
            if !self.dirty.remove(&id) {
                continue;
            }
            if let Some(compute) = self.computes.get(&id) {
                let dep = Dep::new(&self.states, &self.computes);
                compute.compute(dep, Updater::new(self.send.clone()));
            }
            // Apply this compute's own publication before its dependents run.
            self.sync_computes();
        }
    }

    fn mark_dependents_dirty(&mut self, id: TypeId) {
        for dependent in self.graph.descendants(id) {
            self.dirty.insert(dependent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComputeDeps, assign_impl, state_assign_impl};

    #[derive(Debug, Default, Clone)]
    struct Count {
        value: i64,
    }

    impl State for Count {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            state_assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Default)]
    struct Doubled {
        value: i64,
    }

    impl Compute for Doubled {
        fn deps(&self) -> ComputeDeps {
            (vec![TypeId::of::<Count>()], Vec::new())
        }

        fn compute(&self, deps: Dep<'_>, updater: Updater) {
            let count = deps.get_state_ref::<Count>();
            updater.set(Doubled {
                value: count.value * 2,
            });
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Default)]
    struct DoubledPlusOne {
        value: i64,
    }

    impl Compute for DoubledPlusOne {
        fn deps(&self) -> ComputeDeps {
            (Vec::new(), vec![TypeId::of::<Doubled>()])
        }

        fn compute(&self, deps: Dep<'_>, updater: Updater) {
            let doubled = deps.get_compute_ref::<Doubled>();
            updater.set(DoubledPlusOne {
                value: doubled.value + 1,
            });
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    fn chained_ctx() -> StateCtx {
        let mut ctx = StateCtx::new();
        ctx.add_state(Count { value: 3 });
        ctx.record_compute(Doubled::default())
            .expect("acyclic graph");
        ctx.record_compute(DoubledPlusOne::default())
            .expect("acyclic graph");
        ctx
    }

    #[test]
    fn computes_run_in_dependency_order() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut ctx = chained_ctx();
        ctx.run_computed();

        assert_eq!(ctx.cached::<Doubled>().map(|c| c.value), Some(6));
        assert_eq!(ctx.cached::<DoubledPlusOne>().map(|c| c.value), Some(7));
    }

    #[test]
    fn set_state_marks_transitive_dependents_dirty() {
        let mut ctx = chained_ctx();
        ctx.run_computed();

        ctx.set_state(Count { value: 10 });
        ctx.run_computed();

        assert_eq!(ctx.cached::<Doubled>().map(|c| c.value), Some(20));
        assert_eq!(ctx.cached::<DoubledPlusOne>().map(|c| c.value), Some(21));
    }

    #[test]
    fn clean_computes_do_not_rerun() {
        let mut ctx = chained_ctx();
        ctx.run_computed();
        // Nothing changed, a second pass must leave values untouched and
        // must not panic on an empty dirty set.
        ctx.run_computed();

        assert_eq!(ctx.cached::<DoubledPlusOne>().map(|c| c.value), Some(7));
    }

    #[test]
    fn updater_applies_on_sync() {
        let mut ctx = chained_ctx();
        ctx.run_computed();

        let updater = ctx.updater();
        updater.set(Count { value: 5 });
        assert_eq!(ctx.state::<Count>().map(|c| c.value), Some(3));

        ctx.run_computed();
        assert_eq!(ctx.state::<Count>().map(|c| c.value), Some(5));
        assert_eq!(ctx.cached::<Doubled>().map(|c| c.value), Some(10));
    }

    struct SetCount(i64);

    impl Command for SetCount {
        fn run(&self, snap: crate::CommandSnapshot, updater: Updater) {
            let previous = snap.state::<Count>();
            updater.set(Count {
                value: previous.value + self.0,
            });
        }
    }

    #[test]
    fn dispatch_runs_recorded_command_with_snapshot() {
        let mut ctx = chained_ctx();
        ctx.run_computed();
        ctx.record_command(SetCount(4));

        ctx.dispatch::<SetCount>().expect("command is recorded");
        ctx.run_computed();

        assert_eq!(ctx.state::<Count>().map(|c| c.value), Some(7));
        assert_eq!(ctx.cached::<Doubled>().map(|c| c.value), Some(14));
    }

    #[test]
    fn dispatch_unrecorded_command_errors() {
        let ctx = StateCtx::new();
        assert!(ctx.dispatch::<SetCount>().is_err());
    }
}
