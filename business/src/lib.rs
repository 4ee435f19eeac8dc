//! Domain layer of the roster app: the user record model, the fetch
//! pipeline, and the filter/sort transform producing the derived view.

mod config;
mod derived_users;
mod directory;
mod fetch_service;
mod fetch_users;
mod user;

pub use config::RosterConfig;
pub use derived_users::{DerivedUsersCompute, FilterSet, SortSpec};
pub use directory::UserDirectory;
pub use fetch_service::{EhttpFetcher, FetchResult, FetchService, FetchState, MockFetcher};
pub use fetch_users::{FetchStatus, FetchUsersCommand, FetchUsersCompute};
pub use user::{ApiLocation, ApiPreferences, ApiUser, FieldValue, User, UserField};
