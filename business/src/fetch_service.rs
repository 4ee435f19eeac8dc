//! Pluggable fetch backend behind the fetch command.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ehttp::{Request, Response};
use roster_states::{State, state_assign_impl};

pub type FetchResult = ehttp::Result<Response>;

/// Callback-style fetch so completions can land on any thread (or the JS
/// microtask queue on wasm) and report back through the updater channel.
pub trait FetchService: Send + Sync + Debug {
    fn fetch(&self, request: Request, on_done: Box<dyn FnOnce(FetchResult) + Send + 'static>);
}

#[derive(Debug, Default)]
pub struct EhttpFetcher;

impl FetchService for EhttpFetcher {
    fn fetch(&self, request: Request, on_done: Box<dyn FnOnce(FetchResult) + Send + 'static>) {
        ehttp::fetch(request, on_done);
    }
}

/// Test double: replays a canned response synchronously.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pub response: Option<FetchResult>,
}

impl MockFetcher {
    pub fn replying(response: FetchResult) -> Self {
        Self {
            response: Some(response),
        }
    }
}

impl FetchService for MockFetcher {
    fn fetch(&self, _request: Request, on_done: Box<dyn FnOnce(FetchResult) + Send + 'static>) {
        match &self.response {
            Some(response) => on_done(response.clone()),
            None => on_done(Err("MockFetcher: no response set".to_owned())),
        }
    }
}

/// Service handle plus the monotonic request-generation counter that lets
/// [`FetchUsersCompute`](crate::FetchUsersCompute) discard stale
/// completions.
#[derive(Debug, Clone)]
pub struct FetchState {
    service: Arc<dyn FetchService>,
    generation: Arc<AtomicU64>,
}

impl FetchState {
    pub fn new(service: Arc<dyn FetchService>) -> Self {
        Self {
            service,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn fetch(&self, request: Request, on_done: Box<dyn FnOnce(FetchResult) + Send + 'static>) {
        self.service.fetch(request, on_done);
    }

    /// Reserve the generation for the next request. Strictly increasing
    /// across clones of this state.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for FetchState {
    fn default() -> Self {
        Self::new(Arc::new(EhttpFetcher))
    }
}

impl State for FetchState {
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
