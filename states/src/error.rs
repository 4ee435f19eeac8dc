use std::any::type_name;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("state {name} not found, context: {context}")]
    StateNotFound {
        name: &'static str,
        context: &'static str,
    },
    #[error("compute {name} not found, context: {context}")]
    ComputeNotFound {
        name: &'static str,
        context: &'static str,
    },
    #[error("command {name} not recorded, context: {context}")]
    CommandNotFound {
        name: &'static str,
        context: &'static str,
    },
}

impl Error {
    pub fn state_not_found<T>(context: &'static str) -> Self {
        Self::StateNotFound {
            name: type_name::<T>(),
            context,
        }
    }

    pub fn compute_not_found<T>(context: &'static str) -> Self {
        Self::ComputeNotFound {
            name: type_name::<T>(),
            context,
        }
    }

    pub fn command_not_found<T>(context: &'static str) -> Self {
        Self::CommandNotFound {
            name: type_name::<T>(),
            context,
        }
    }
}
