use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub returned: u64,
}

impl PageMetadata {
    pub const fn next_offset(&self) -> u64 {
        self.offset.saturating_add(self.returned)
    }

    pub const fn has_next_page(&self) -> bool {
        self.returned > 0 && self.offset.saturating_add(self.returned) < self.total
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub metadata: PageMetadata,
}

/// Identity of a result sequence: view plus the full server-side parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub view: ViewMode,
    pub params: BTreeMap<String, String>,
}

impl QueryKey {
    pub const fn new(view: ViewMode, params: BTreeMap<String, String>) -> Self {
        Self { view, params }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching,
    HasMore,
    Exhausted,
    Error(String),
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Fetching => write!(f, "Fetching"),
            Self::HasMore => write!(f, "HasMore"),
            Self::Exhausted => write!(f, "Exhausted"),
            Self::Error(_) => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Request,
    Loaded { has_more: bool },
    Failed(String),
    Reset,
}

impl fmt::Display for FetchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => write!(f, "Request"),
            Self::Loaded { has_more } => write!(f, "Loaded(has_more={has_more})"),
            Self::Failed(msg) => write!(f, "Failed({msg})"),
            Self::Reset => write!(f, "Reset"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid transition from {from} with event {event}")]
pub struct TransitionError {
    pub from: FetchState,
    pub event: FetchEvent,
}

struct NextState(FetchState);

impl TryFrom<(&FetchState, &FetchEvent)> for NextState {
    type Error = TransitionError;

    fn try_from(value: (&FetchState, &FetchEvent)) -> Result<Self, Self::Error> {
        let (current, event) = value;

        match (current, event) {
            (FetchState::Idle | FetchState::HasMore, FetchEvent::Request) => {
                Ok(Self(FetchState::Fetching))
            }
            (FetchState::Fetching, FetchEvent::Loaded { has_more: true }) => {
                Ok(Self(FetchState::HasMore))
            }
            (FetchState::Fetching, FetchEvent::Loaded { has_more: false }) => {
                Ok(Self(FetchState::Exhausted))
            }
            (FetchState::Fetching, FetchEvent::Failed(msg)) => {
                Ok(Self(FetchState::Error(msg.clone())))
            }
            (_, FetchEvent::Reset) => Ok(Self(FetchState::Idle)),
            _ => Err(TransitionError {
                from: current.clone(),
                event: event.clone(),
            }),
        }
    }
}

/// A request handed to the caller to perform. Carry it back into `resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub key: QueryKey,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Failed(String),
    Empty,
    Ready,
}

/// Sans-IO infinite query: owns pages and the fetch state, never performs I/O.
#[derive(Debug, Clone)]
pub struct PagedQuery<T> {
    key: QueryKey,
    generation: u64,
    page_size: u64,
    pages: Vec<Page<T>>,
    state: FetchState,
}

impl<T: Clone> PagedQuery<T> {
    pub fn new(key: QueryKey, page_size: u64) -> Self {
        Self {
            key,
            generation: 0,
            page_size: page_size.max(1),
            pages: Vec::new(),
            state: FetchState::Idle,
        }
    }

    pub const fn key(&self) -> &QueryKey {
        &self.key
    }

    pub const fn state(&self) -> &FetchState {
        &self.state
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    fn transition(&mut self, event: &FetchEvent) -> Result<(), TransitionError> {
        let next = NextState::try_from((&self.state, event))?;
        self.state = next.0;
        Ok(())
    }

    /// Starts the next page, or `None` while fetching, exhausted or failed.
    pub fn fetch_next_page(&mut self) -> Option<PageRequest> {
        if self.transition(&FetchEvent::Request).is_err() {
            return None;
        }
        let offset = self.pages.last().map_or(0, |page| page.metadata.next_offset());
        Some(PageRequest {
            generation: self.generation,
            key: self.key.clone(),
            offset,
            limit: self.page_size,
        })
    }

    /// Applies a completed request. Returns false when the result was stale.
    pub fn resolve<E: fmt::Display>(&mut self, request: &PageRequest, result: Result<Page<T>, E>) -> bool {
        if request.generation != self.generation || self.state != FetchState::Fetching {
            tracing::debug!(
                generation = request.generation,
                current = self.generation,
                "discarding stale page result"
            );
            return false;
        }

        let event = match result {
            Ok(page) => {
                let has_more = page.metadata.has_next_page();
                self.pages.push(page);
                FetchEvent::Loaded { has_more }
            }
            Err(err) => FetchEvent::Failed(err.to_string()),
        };

        if let Err(err) = self.transition(&event) {
            tracing::warn!(%err, "unexpected paging transition");
            return false;
        }
        true
    }

    pub fn has_next_page(&self) -> bool {
        self.pages
            .last()
            .is_some_and(|page| page.metadata.has_next_page())
    }

    pub fn is_fetching(&self) -> bool {
        self.state == FetchState::Fetching
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.is_fetching() && !self.pages.is_empty()
    }

    pub fn flatten(&self) -> Vec<T> {
        self.pages
            .iter()
            .flat_map(|page| page.data.iter().cloned())
            .collect()
    }

    pub fn loaded_len(&self) -> usize {
        self.pages.iter().map(|page| page.data.len()).sum()
    }

    pub fn total(&self) -> Option<u64> {
        self.pages.last().map(|page| page.metadata.total)
    }

    /// Switching to a different key drops every page and abandons in-flight work.
    pub fn set_key(&mut self, key: QueryKey) -> bool {
        if key == self.key {
            return false;
        }
        self.key = key;
        self.restart();
        true
    }

    /// Same key, fresh sequence. This is the only retry path.
    pub fn refresh(&mut self) {
        self.restart();
    }

    fn restart(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pages.clear();
        // Reset is valid from every state.
        self.state = FetchState::Idle;
    }

    pub fn status(&self) -> LoadStatus {
        match &self.state {
            FetchState::Error(msg) => LoadStatus::Failed(msg.clone()),
            FetchState::Idle | FetchState::Fetching if self.pages.is_empty() => LoadStatus::Loading,
            _ if self.loaded_len() == 0 => LoadStatus::Empty,
            _ => LoadStatus::Ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(view: ViewMode, search: Option<&str>) -> QueryKey {
        let mut params = BTreeMap::new();
        if let Some(search) = search {
            params.insert("search".to_string(), search.to_string());
        }
        QueryKey::new(view, params)
    }

    fn page(offset: u64, rows: u64, total: u64) -> Page<u64> {
        Page {
            data: (offset..offset + rows).collect(),
            metadata: PageMetadata {
                total,
                limit: 2,
                offset,
                returned: rows,
            },
        }
    }

    type Outcome = Result<Page<u64>, String>;

    fn request(query: &mut PagedQuery<u64>) -> PageRequest {
        match query.fetch_next_page() {
            Some(request) => request,
            None => panic!("expected a page request in state {}", query.state()),
        }
    }

    #[test]
    fn pages_accumulate_until_exhausted() {
        let mut query = PagedQuery::<u64>::new(key(ViewMode::AccessPoints, None), 2);
        assert_eq!(query.status(), LoadStatus::Loading);

        let first = request(&mut query);
        assert_eq!(first.offset, 0);
        assert!(query.fetch_next_page().is_none(), "one request in flight");

        assert!(query.resolve(&first, Outcome::Ok(page(0, 2, 3))));
        assert!(query.has_next_page());
        assert_eq!(query.state(), &FetchState::HasMore);

        let second = request(&mut query);
        assert_eq!(second.offset, 2);
        assert!(query.is_fetching_next_page());
        assert!(query.resolve(&second, Outcome::Ok(page(2, 1, 3))));

        assert!(!query.has_next_page());
        assert_eq!(query.state(), &FetchState::Exhausted);
        assert!(query.fetch_next_page().is_none());
        assert_eq!(query.flatten(), vec![0, 1, 2]);
        assert_eq!(query.status(), LoadStatus::Ready);
    }

    #[test]
    fn stale_results_are_discarded_after_key_change() {
        let mut query = PagedQuery::<u64>::new(key(ViewMode::AccessPoints, None), 2);
        let old = request(&mut query);

        assert!(query.set_key(key(ViewMode::AccessPoints, Some("cafe"))));
        let fresh = request(&mut query);

        assert!(!query.resolve(&old, Outcome::Ok(page(0, 2, 10))));
        assert!(query.pages().is_empty());
        assert!(query.is_fetching());

        assert!(query.resolve(&fresh, Outcome::Ok(page(0, 1, 1))));
        assert_eq!(query.flatten(), vec![0]);
    }

    #[test]
    fn identical_key_keeps_pages() {
        let mut query = PagedQuery::<u64>::new(key(ViewMode::Observations, None), 2);
        let req = request(&mut query);
        query.resolve(&req, Outcome::Ok(page(0, 2, 4)));

        assert!(!query.set_key(key(ViewMode::Observations, None)));
        assert_eq!(query.loaded_len(), 2);
    }

    #[test]
    fn errors_stop_fetching_until_refresh() {
        let mut query = PagedQuery::<u64>::new(key(ViewMode::AccessPoints, None), 2);
        let req = request(&mut query);
        assert!(query.resolve(&req, Outcome::Err("backend down".to_string())));

        assert_eq!(query.status(), LoadStatus::Failed("backend down".to_string()));
        assert!(query.fetch_next_page().is_none());

        query.refresh();
        assert_eq!(query.status(), LoadStatus::Loading);
        assert!(query.fetch_next_page().is_some());
    }

    #[test]
    fn empty_only_after_successful_zero_row_fetch() {
        let mut query = PagedQuery::<u64>::new(key(ViewMode::AccessPoints, None), 2);
        assert_eq!(query.status(), LoadStatus::Loading);
        let req = request(&mut query);
        assert_eq!(query.status(), LoadStatus::Loading);
        query.resolve(&req, Outcome::Ok(page(0, 0, 0)));
        assert_eq!(query.status(), LoadStatus::Empty);
        assert!(!query.has_next_page());
    }

    #[test]
    fn zero_returned_never_reports_more() {
        let meta = PageMetadata {
            total: 50,
            limit: 10,
            offset: 40,
            returned: 0,
        };
        assert!(!meta.has_next_page());
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let err = NextState::try_from((&FetchState::Exhausted, &FetchEvent::Request));
        assert!(matches!(
            err,
            Err(TransitionError {
                from: FetchState::Exhausted,
                event: FetchEvent::Request
            })
        ));
    }
}
