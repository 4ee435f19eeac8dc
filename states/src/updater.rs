use std::any::{Any, TypeId};

/// Write handle for publishing new state/compute values into a
/// [`StateCtx`](crate::StateCtx).
///
/// The updater is cheap to clone and `Send`, so fetch callbacks running on
/// another thread can hold one. Values are applied when the owning context
/// next runs [`sync_computes`](crate::StateCtx::sync_computes).
#[derive(Debug, Clone)]
pub struct Updater {
    send: flume::Sender<(TypeId, Box<dyn Any + Send>)>,
}

impl Updater {
    pub(crate) fn new(send: flume::Sender<(TypeId, Box<dyn Any + Send>)>) -> Self {
        Self { send }
    }

    /// Publish a full replacement value for the state or compute of type `T`.
    pub fn set<T: Any + Send>(&self, value: T) {
        if self.send.send((TypeId::of::<T>(), Box::new(value))).is_err() {
            log::warn!(
                "updater: context dropped, discarding update for {}",
                std::any::type_name::<T>()
            );
        }
    }
}
