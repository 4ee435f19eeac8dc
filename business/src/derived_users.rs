//! The filter + sort transform: FilterSet and SortSpec input states and the
//! derived view computed from them plus the fetch cache.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use roster_states::{
    Compute, ComputeDeps, Dep, State, Updater, assign_impl, state_assign_impl,
};

use crate::{FetchUsersCompute, FieldValue, User, UserField};

/// Per-attribute allow-lists constraining which records pass through.
///
/// An empty set for a key, or an absent key, imposes no constraint. Setting
/// replaces the whole set, never merges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    allowed: BTreeMap<UserField, BTreeSet<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: replace the allow-list for one attribute.
    pub fn allow<I, S>(mut self, key: UserField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .insert(key, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.allowed.values().all(BTreeSet::is_empty)
    }

    /// A record passes iff, for every key with a non-empty allow-list, its
    /// value at that key is permitted.
    pub fn matches(&self, user: &User) -> bool {
        self.allowed
            .iter()
            .all(|(key, permitted)| permitted.is_empty() || user.field(*key).matches_any(permitted))
    }
}

impl State for FilterSet {
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

/// The single active sort criterion. `criterion: None` leaves the filtered
/// list in its source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub criterion: Option<UserField>,
    pub ascending: bool,
}

impl SortSpec {
    pub fn by(criterion: UserField, ascending: bool) -> Self {
        Self {
            criterion: Some(criterion),
            ascending,
        }
    }

    pub fn unsorted() -> Self {
        Self {
            criterion: None,
            ascending: true,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::unsorted()
    }
}

impl State for SortSpec {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(*self))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

/// The derived view: the fetched list filtered by the active [`FilterSet`]
/// and ordered by the active [`SortSpec`].
///
/// Always a fresh copy; the fetch cache is never mutated. While no fetched
/// list is available (idle, loading, or failed) the view is empty.
#[derive(Debug, Clone, Default)]
pub struct DerivedUsersCompute {
    rows: Vec<User>,
}

impl DerivedUsersCompute {
    pub fn rows(&self) -> &[User] {
        &self.rows
    }
}

impl Compute for DerivedUsersCompute {
    fn deps(&self) -> ComputeDeps {
        (
            vec![TypeId::of::<FilterSet>(), TypeId::of::<SortSpec>()],
            vec![TypeId::of::<FetchUsersCompute>()],
        )
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) {
        let fetched = deps.get_compute_ref::<FetchUsersCompute>();
        let filters = deps.get_state_ref::<FilterSet>();
        let sort = deps.get_state_ref::<SortSpec>();

        let mut rows: Vec<User> = fetched.users().unwrap_or_default().to_vec();
        // Filtering with retain keeps the source order (stable).
        rows.retain(|user| filters.matches(user));

        if let Some(criterion) = sort.criterion {
            // Stable sort with an explicit total ordering, so records with
            // equal keys keep their relative order.
            rows.sort_by(|a, b| {
                let ordering = compare_field(a, b, criterion);
                if sort.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        updater.set(Self { rows });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

fn compare_field(a: &User, b: &User, criterion: UserField) -> Ordering {
    match (a.field(criterion), b.field(criterion)) {
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (FieldValue::Number(x), FieldValue::Number(y)) => {
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        // One key always yields one runtime type; mixed pairs cannot happen.
        _ => Ordering::Equal,
    }
}
