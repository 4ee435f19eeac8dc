use std::any::Any;

/// A plain reactive cell owned by the [`StateCtx`](crate::StateCtx).
///
/// States hold externally-set inputs (config, filter selections, service
/// handles). Setting a state marks every compute that declared it as a
/// dependency dirty.
pub trait State: Any {
    fn as_any(&self) -> &dyn Any;

    /// Send-safe clone used to build a [`CommandSnapshot`](crate::CommandSnapshot).
    ///
    /// Return `None` for states that commands never need to read.
    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    /// Replace this state with a new value delivered through the updater
    /// channel.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Default `assign_box` body for states: downcast and replace wholesale.
pub fn state_assign_impl<T: State>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(new_value) => *target = *new_value,
        Err(_) => log::error!(
            "state assign: type mismatch, expected {}",
            std::any::type_name::<T>()
        ),
    }
}
