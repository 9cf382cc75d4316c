//! Paginated collection walking
//!
//! This module provides the [`RecordSource`] abstraction over an index-paged
//! user collection and the [`PageWalker`] that enumerates it front to back,
//! one page at a time, until the source returns an empty page.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ConfigError, ExportError, FetchError, Result};
use crate::model::User;

/// Trait for fetching pages of users by index
///
/// An empty, successful result signals the end of the collection.
#[async_trait]
pub trait RecordSource: Send {
    /// Fetch one page of users
    ///
    /// # Arguments
    /// * `page` - Zero-based page index
    /// * `per_page` - Page size
    /// * `fields` - Attribute names the source should include
    ///
    /// # Returns
    /// * `Result<Vec<User>, FetchError>` - Users on the page, empty when exhausted
    async fn fetch_page(
        &mut self,
        page: u32,
        per_page: u32,
        fields: &[String],
    ) -> std::result::Result<Vec<User>, FetchError>;

    /// Size of the whole collection, if the source has reported one
    fn total_hint(&self) -> Option<u64> {
        None
    }
}

/// A non-empty batch of users and the index that produced it
#[derive(Debug, Clone)]
pub struct Page {
    pub index: u32,
    pub records: Vec<User>,
}

/// Walks a [`RecordSource`] to exhaustion
///
/// Finite and not restartable: once the walk ends, by exhaustion or by a
/// failed fetch, every later call returns `Ok(None)` without touching the
/// source.
pub struct PageWalker {
    source: Box<dyn RecordSource>,
    page_size: u32,
    fields: Vec<String>,
    next_index: u32,
    total_fetched: u64,
    done: bool,
}

impl PageWalker {
    /// Create a new walker
    ///
    /// # Arguments
    /// * `source` - Record source to walk
    /// * `page_size` - Users per fetch, must be positive
    /// * `fields` - Attribute names passed through to every fetch
    ///
    /// # Returns
    /// * `Result<Self>` - New walker or error for a zero page size
    pub fn new(source: Box<dyn RecordSource>, page_size: u32, fields: Vec<String>) -> Result<Self> {
        if page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                value: page_size.to_string(),
            }
            .into());
        }

        Ok(Self {
            source,
            page_size,
            fields,
            next_index: 0,
            total_fetched: 0,
            done: false,
        })
    }

    /// Fetch the next page
    ///
    /// # Returns
    /// * `Result<Option<Page>>` - Next page, None once the collection is exhausted,
    ///   or a fetch error naming the failed page
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.done {
            return Ok(None);
        }

        let index = self.next_index;
        debug!("Fetching page {} ({} per page)", index, self.page_size);

        let records = match self
            .source
            .fetch_page(index, self.page_size, &self.fields)
            .await
        {
            Ok(records) => records,
            Err(source) => {
                self.done = true;
                return Err(ExportError::Fetch {
                    page: index,
                    source,
                });
            }
        };

        if records.is_empty() {
            debug!(
                "Collection exhausted at page {} after {} users",
                index, self.total_fetched
            );
            self.done = true;
            return Ok(None);
        }

        self.next_index += 1;
        self.total_fetched += records.len() as u64;
        debug!(
            "Fetched page {} with {} users (total: {})",
            index,
            records.len(),
            self.total_fetched
        );

        Ok(Some(Page { index, records }))
    }

    /// Number of users fetched so far
    pub fn total_fetched(&self) -> u64 {
        self.total_fetched
    }

    /// Collection size reported by the source, if known
    pub fn total_hint(&self) -> Option<u64> {
        self.source.total_hint()
    }
}
