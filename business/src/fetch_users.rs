//! Fetch-users command + compute cache.
//!
//! Fetching is a side effect, so it must not live in a derived compute
//! (computes can run implicitly on dirty propagation). Instead:
//! - `FetchUsersCompute` is a compute-shaped cache holding the latest fetch
//!   status;
//! - `FetchUsersCommand` is a manual-only command that performs the GET and
//!   updates the cache via the `Updater`.
//!
//! Each request reserves a generation from [`FetchState`]; the cache rejects
//! any completion older than what it already holds, so a slow response for a
//! previous URL never overwrites the state of a newer request.

use std::any::Any;

use chrono::{DateTime, Utc};
use log::{error, info};
use roster_states::{Command, CommandSnapshot, Compute, ComputeDeps, Dep, Updater};

use crate::{ApiUser, FetchState, RosterConfig, User};

/// Observable fetch status: the original's `{data, err, isLoading}` triple
/// folded into one enum.
#[derive(Debug, Clone, Default)]
pub enum FetchStatus {
    /// No fetch attempted yet.
    #[default]
    Idle,
    /// Request in flight; previous data and error are cleared.
    Pending,
    /// Parsed user list.
    Success(Vec<User>),
    /// Opaque fetch failure: transport error, non-2xx status, or body that
    /// did not parse as a user array.
    Error(String),
}

/// Compute-shaped cache for the fetched user list.
///
/// Its `compute()` is a deliberate no-op; updates arrive from
/// [`FetchUsersCommand`] through the updater channel.
#[derive(Debug, Clone, Default)]
pub struct FetchUsersCompute {
    pub status: FetchStatus,
    generation: u64,
    last_fetch: Option<DateTime<Utc>>,
}

impl FetchUsersCompute {
    fn pending(generation: u64) -> Self {
        Self {
            status: FetchStatus::Pending,
            generation,
            last_fetch: None,
        }
    }

    fn success(users: Vec<User>, generation: u64) -> Self {
        Self {
            status: FetchStatus::Success(users),
            generation,
            last_fetch: Some(Utc::now()),
        }
    }

    fn failure(message: String, generation: u64) -> Self {
        Self {
            status: FetchStatus::Error(message),
            generation,
            last_fetch: None,
        }
    }

    /// The fetched list, if the last completed fetch succeeded.
    pub fn users(&self) -> Option<&[User]> {
        if let FetchStatus::Success(ref users) = self.status {
            Some(users)
        } else {
            None
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        if let FetchStatus::Error(ref message) = self.status {
            Some(message)
        } else {
            None
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Pending)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.status, FetchStatus::Idle)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the currently held list was fetched.
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }
}

impl Compute for FetchUsersCompute {
    fn deps(&self) -> ComputeDeps {
        // Command-updated cache; no derived dependencies.
        (Vec::new(), Vec::new())
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; network IO must not run inside a compute.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    /// Stale-response guard: drop any update carrying an older request
    /// generation than the one already stored.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        match new_self.downcast::<Self>() {
            Ok(new_value) => {
                if new_value.generation < self.generation {
                    info!(
                        "FetchUsersCompute: dropping stale update (generation {} < {})",
                        new_value.generation, self.generation
                    );
                    return;
                }
                *self = *new_value;
            }
            Err(_) => error!("FetchUsersCompute: assign type mismatch"),
        }
    }
}

/// Manual-only command: GET the configured users endpoint, parse the body as
/// a JSON array of wire records, and publish the adapted list.
///
/// Dispatch explicitly via `ctx.dispatch::<FetchUsersCommand>()`; re-dispatch
/// after changing [`RosterConfig`] to fetch from the new URL.
#[derive(Debug, Default)]
pub struct FetchUsersCommand;

impl Command for FetchUsersCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater) {
        let config = snap.state::<RosterConfig>();
        let fetch = snap.state::<FetchState>();

        let generation = fetch.next_generation();
        let url = config.users_url();
        info!("FetchUsersCommand: GET {url} (generation {generation})");

        // Clear previous data and error, raise the loading flag.
        updater.set(FetchUsersCompute::pending(generation));

        let request = ehttp::Request::get(&url);
        fetch.fetch(
            request,
            Box::new(move |result| match result {
                Ok(response) => {
                    if (200..300).contains(&response.status) {
                        match serde_json::from_slice::<Vec<ApiUser>>(&response.bytes) {
                            Ok(records) => {
                                info!("FetchUsersCommand: fetched {} users", records.len());
                                let users = records.into_iter().map(User::from).collect();
                                updater.set(FetchUsersCompute::success(users, generation));
                            }
                            Err(e) => {
                                error!("FetchUsersCommand: failed to parse body: {e}");
                                updater.set(FetchUsersCompute::failure(
                                    format!("Parse error: {e}"),
                                    generation,
                                ));
                            }
                        }
                    } else {
                        let message = format!("API returned status: {}", response.status);
                        error!("FetchUsersCommand: {message}");
                        updater.set(FetchUsersCompute::failure(message, generation));
                    }
                }
                Err(err) => {
                    error!("FetchUsersCommand: request failed: {err}");
                    updater.set(FetchUsersCompute::failure(err, generation));
                }
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_users(count: usize) -> Vec<User> {
        (0..count)
            .map(|i| User {
                id: format!("id-{i}"),
                first_name: format!("First{i}"),
                last_name: format!("Last{i}"),
                age: 20 + i as u32,
                eye_color: "brown".to_owned(),
                location: "0, 0".to_owned(),
                gender: "female".to_owned(),
                pet_preference: "cat".to_owned(),
                fruit_preference: "apple".to_owned(),
            })
            .collect()
    }

    #[test]
    fn default_cache_is_idle() {
        let cache = FetchUsersCompute::default();
        assert!(cache.is_idle());
        assert!(!cache.is_loading());
        assert!(cache.users().is_none());
        assert!(cache.error_message().is_none());
    }

    #[test]
    fn newer_generation_replaces_cache() {
        let mut cache = FetchUsersCompute::pending(1);
        cache.assign_box(Box::new(FetchUsersCompute::success(sample_users(2), 1)));

        assert_eq!(cache.users().map(<[User]>::len), Some(2));
        assert_eq!(cache.generation(), 1);
        assert!(cache.last_fetch().is_some());
    }

    #[test]
    fn stale_generation_is_dropped() {
        // Request 2 is already pending when the response for request 1
        // finally arrives; it must not overwrite the newer state.
        let mut cache = FetchUsersCompute::pending(2);
        cache.assign_box(Box::new(FetchUsersCompute::success(sample_users(3), 1)));

        assert!(cache.is_loading());
        assert!(cache.users().is_none());
        assert_eq!(cache.generation(), 2);
    }

    #[test]
    fn error_keeps_no_data() {
        let mut cache = FetchUsersCompute::pending(1);
        cache.assign_box(Box::new(FetchUsersCompute::failure(
            "boom".to_owned(),
            1,
        )));

        assert!(!cache.is_loading());
        assert!(cache.users().is_none());
        assert_eq!(cache.error_message(), Some("boom"));
    }
}
