//! Paginated fetcher
//!
//! Drives any paginated listing page by page. One call to `next_page` is one
//! request. Cursors only move forward and the paginator cannot be restarted;
//! once a page without a next cursor arrives, the item count is checked
//! against the total the remote side reported.

use std::collections::HashSet;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::domain::ports::{CollectorEvent, CollectorEvents, Page, PageCursor};
use crate::error::CollectError;

/// A listing endpoint that can be fetched one page at a time
#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    /// Fetch the page at `cursor`, or the first page when `cursor` is `None`
    async fn fetch_page(&self, cursor: Option<&PageCursor>) -> Result<Page<T>, CollectError>;
}

/// Lazy, finite, non-restartable sequence of pages
pub struct Paginator<'a, T, S>
where
    T: Send,
    S: PageSource<T> + ?Sized,
{
    source: &'a S,
    label: String,
    events: &'a dyn CollectorEvents,
    cursor: Option<PageCursor>,
    visited: HashSet<PageCursor>,
    pages: usize,
    received: u64,
    reported_total: Option<u64>,
    done: bool,
    _items: PhantomData<fn() -> T>,
}

impl<'a, T, S> Paginator<'a, T, S>
where
    T: Send,
    S: PageSource<T> + ?Sized,
{
    pub fn new(source: &'a S, label: impl Into<String>, events: &'a dyn CollectorEvents) -> Self {
        Self {
            source,
            label: label.into(),
            events,
            cursor: None,
            visited: HashSet::new(),
            pages: 0,
            received: 0,
            reported_total: None,
            done: false,
            _items: PhantomData,
        }
    }

    /// Start from `cursor` instead of the first page
    pub fn starting_at(mut self, cursor: PageCursor) -> Self {
        self.visited.insert(cursor.clone());
        self.cursor = Some(cursor);
        self
    }

    /// Number of pages fetched so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Fetch the next page
    ///
    /// Returns `None` once the listing is exhausted or after an error.
    pub async fn next_page(&mut self) -> Option<Result<Vec<T>, CollectError>> {
        if self.done {
            return None;
        }
        let result = self.fetch().await;
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }

    /// Drain every remaining page in order
    pub async fn collect_all(mut self) -> Result<Vec<T>, CollectError> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await {
            items.extend(page?);
        }
        Ok(items)
    }

    async fn fetch(&mut self) -> Result<Vec<T>, CollectError> {
        let page = self.source.fetch_page(self.cursor.as_ref()).await?;

        self.pages += 1;
        self.received += page.items.len() as u64;
        if let Some(total) = page.total_count {
            self.reported_total = Some(total);
        }
        self.events.record(CollectorEvent::PageFetched {
            label: self.label.clone(),
            page: self.pages,
            items: page.items.len(),
        });

        match page.next {
            Some(next) => {
                if !self.visited.insert(next.clone()) {
                    return Err(CollectError::integrity(
                        &self.label,
                        format!("cursor {} was returned twice", next),
                    ));
                }
                self.cursor = Some(next);
            }
            None => {
                self.done = true;
                self.cursor = None;
                self.verify_total()?;
            }
        }

        Ok(page.items)
    }

    fn verify_total(&self) -> Result<(), CollectError> {
        match self.reported_total {
            Some(expected) if expected != self.received => Err(CollectError::integrity(
                &self.label,
                format!(
                    "remote reported {} items but {} were received over {} pages",
                    expected, self.received, self.pages
                ),
            )),
            _ => Ok(()),
        }
    }
}
