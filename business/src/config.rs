use std::any::Any;

use roster_states::{State, state_assign_impl};

/// Where to fetch users from.
///
/// Replacing the config and re-dispatching
/// [`FetchUsersCommand`](crate::FetchUsersCommand) re-runs the fetch against
/// the new endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterConfig {
    pub api_base_url: String,
}

impl RosterConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
        }
    }

    /// The users endpoint; relative when no base is configured (the served
    /// front end fetches same-origin).
    pub fn users_url(&self) -> String {
        if self.api_base_url.is_empty() {
            "/api/users".to_owned()
        } else {
            format!("{}/api/users", self.api_base_url)
        }
    }
}

impl State for RosterConfig {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_url_joins_base() {
        let config = RosterConfig::new("https://example.com");
        assert_eq!(config.users_url(), "https://example.com/api/users");
    }

    #[test]
    fn users_url_relative_without_base() {
        let config = RosterConfig::default();
        assert_eq!(config.users_url(), "/api/users");
    }
}
