//! Sequential page-by-page collection of a paginated endpoint.

use std::future::Future;

use tracing::{debug, warn};

use crate::error::PlStatsError;
use crate::model::Paging;

/// One page of results plus the upstream pagination counters, if any.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub paging: Option<Paging>,
}

/// Where a [`Pager`] run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Idle,
    Fetching(u32),
    Done,
    Failed,
}

/// Result of a pager run. On failure `items` keeps whatever was collected
/// before the failing request.
#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    /// Number of page requests issued, including a failed one.
    pub requests: u32,
    pub state: PagerState,
    pub error: Option<PlStatsError>,
}

impl<T> Paged<T> {
    pub fn is_complete(&self) -> bool {
        self.state == PagerState::Done
    }

    /// Turn a partial result into an error, dropping the collected items.
    pub fn into_result(self) -> crate::Result<Vec<T>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.items),
        }
    }
}

/// Fetches pages 1..N until the upstream runs dry, reports the last page, or
/// `max_pages` requests have been made. Never retries.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    max_pages: u32,
    state: PagerState,
}

impl Pager {
    /// `max_pages` below 1 is treated as 1.
    pub fn new(max_pages: u32) -> Self {
        Self {
            max_pages: max_pages.max(1),
            state: PagerState::Idle,
        }
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    pub async fn run<T, F, Fut>(mut self, mut fetch: F) -> Paged<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = crate::Result<Page<T>>>,
    {
        let mut items = Vec::new();
        let mut requests = 0u32;
        let mut page = 1u32;
        self.state = PagerState::Fetching(page);

        loop {
            requests += 1;
            let chunk = match fetch(page).await {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(page, error = %e, "page request failed, keeping partial results");
                    self.state = PagerState::Failed;
                    return Paged {
                        items,
                        requests,
                        state: self.state,
                        error: Some(e),
                    };
                }
            };

            let count = chunk.items.len();
            let current = chunk.paging.map(|p| p.current).unwrap_or(page);
            let total = chunk.paging.map(|p| p.total).unwrap_or(page);
            items.extend(chunk.items);
            debug!(page, count, current, total, "fetched page");

            if count == 0 || current >= total || requests >= self.max_pages {
                self.state = PagerState::Done;
                break;
            }
            page = current + 1;
            self.state = PagerState::Fetching(page);
        }

        Paged {
            items,
            requests,
            state: self.state,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn page(items: Vec<u32>, current: u32, total: u32) -> Page<u32> {
        Page {
            items,
            paging: Some(Paging { current, total }),
        }
    }

    #[tokio::test]
    async fn test_stops_at_upstream_total() {
        let calls = RefCell::new(Vec::new());
        let paged = Pager::new(10)
            .run(|n| {
                calls.borrow_mut().push(n);
                async move { Ok(page(vec![n], n, 2)) }
            })
            .await;
        assert_eq!(paged.items, vec![1, 2]);
        assert_eq!(paged.requests, 2);
        assert_eq!(*calls.borrow(), vec![1, 2]);
        assert!(paged.is_complete());
    }

    #[tokio::test]
    async fn test_max_pages_caps_the_loop() {
        let paged = Pager::new(1)
            .run(|n| async move { Ok(page(vec![n * 10, n * 10 + 1], n, 5)) })
            .await;
        assert_eq!(paged.items, vec![10, 11]);
        assert_eq!(paged.requests, 1);
        assert_eq!(paged.state, PagerState::Done);
    }

    #[tokio::test]
    async fn test_empty_page_ends_the_loop() {
        let paged = Pager::new(10)
            .run(|n| async move {
                let items = if n == 1 { vec![1] } else { vec![] };
                Ok(page(items, n, 9))
            })
            .await;
        assert_eq!(paged.items, vec![1]);
        assert_eq!(paged.requests, 2);
    }

    #[tokio::test]
    async fn test_missing_paging_means_single_page() {
        let paged = Pager::new(10)
            .run(|_| async move {
                Ok(Page {
                    items: vec![1, 2, 3],
                    paging: None,
                })
            })
            .await;
        assert_eq!(paged.requests, 1);
        assert_eq!(paged.items.len(), 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_results() {
        let paged = Pager::new(10)
            .run(|n| async move {
                if n == 3 {
                    Err(PlStatsError::InvalidArgument("boom".into()))
                } else {
                    Ok(page(vec![n], n, 5))
                }
            })
            .await;
        assert_eq!(paged.items, vec![1, 2]);
        assert_eq!(paged.requests, 3);
        assert_eq!(paged.state, PagerState::Failed);
        assert!(paged.error.is_some());
        assert!(paged.into_result().is_err());
    }

    #[tokio::test]
    async fn test_next_page_follows_upstream_current() {
        let calls = RefCell::new(Vec::new());
        let paged = Pager::new(10)
            .run(|n| {
                calls.borrow_mut().push(n);
                // upstream reports it served page 2 when asked for page 1
                let current = if n == 1 { 2 } else { n };
                async move { Ok(page(vec![n], current, 3)) }
            })
            .await;
        assert_eq!(*calls.borrow(), vec![1, 3]);
        assert_eq!(paged.items, vec![1, 3]);
    }

    #[test]
    fn test_new_pager_is_idle() {
        assert_eq!(Pager::new(0).state(), PagerState::Idle);
    }
}
