//! Facade owning the state context and wiring the fetch pipeline to the
//! derived view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use roster_states::StateCtx;

use crate::{
    DerivedUsersCompute, EhttpFetcher, FetchService, FetchState, FetchUsersCommand,
    FetchUsersCompute, FilterSet, RosterConfig, SortSpec, User,
};

/// The user directory: fetches records from the configured endpoint and
/// exposes the filtered, sorted view.
///
/// All mutating calls run the recompute pass before returning, so reads
/// always observe a view consistent with the inputs. Fetch completions land
/// asynchronously; call [`poll`](Self::poll) (e.g. once per frame) to apply
/// them.
pub struct UserDirectory {
    ctx: StateCtx,
}

impl UserDirectory {
    pub fn new(config: RosterConfig) -> Self {
        Self::with_service(config, Arc::new(EhttpFetcher))
    }

    /// Build with a custom fetch backend (tests inject a mock here).
    pub fn with_service(config: RosterConfig, service: Arc<dyn FetchService>) -> Self {
        let mut ctx = StateCtx::new();
        ctx.add_state(config);
        ctx.add_state(FetchState::new(service));
        ctx.add_state(FilterSet::default());
        ctx.add_state(SortSpec::default());
        ctx.record_compute(FetchUsersCompute::default())
            .expect("fetch cache has no dependencies");
        ctx.record_compute(DerivedUsersCompute::default())
            .expect("derived view graph is acyclic");
        ctx.record_command(FetchUsersCommand);
        ctx.run_computed();
        Self { ctx }
    }

    /// Issue (or re-issue) the GET against the configured endpoint.
    pub fn fetch(&mut self) {
        self.ctx
            .dispatch::<FetchUsersCommand>()
            .expect("FetchUsersCommand is recorded at construction");
        self.ctx.run_computed();
    }

    /// Apply pending fetch completions and recompute the view.
    pub fn poll(&mut self) {
        self.ctx.run_computed();
    }

    /// Full replacement of the active sort criterion.
    pub fn set_sort(&mut self, sort: SortSpec) {
        self.ctx.set_state(sort);
        self.ctx.run_computed();
    }

    /// Full replacement of the active filters.
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.ctx.set_state(filters);
        self.ctx.run_computed();
    }

    /// Point at a different endpoint; takes effect on the next [`fetch`](Self::fetch).
    pub fn set_config(&mut self, config: RosterConfig) {
        self.ctx.set_state(config);
    }

    /// The derived view: filtered, sorted, never the raw fetched list.
    pub fn users(&self) -> &[User] {
        self.ctx
            .cached::<DerivedUsersCompute>()
            .map(DerivedUsersCompute::rows)
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_cache().is_some_and(FetchUsersCompute::is_loading)
    }

    pub fn error(&self) -> Option<&str> {
        self.fetch_cache().and_then(FetchUsersCompute::error_message)
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.fetch_cache().and_then(FetchUsersCompute::last_fetch)
    }

    fn fetch_cache(&self) -> Option<&FetchUsersCompute> {
        self.ctx.cached::<FetchUsersCompute>()
    }
}
