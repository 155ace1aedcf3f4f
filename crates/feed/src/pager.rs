//! Cursor-paged fetches
//!
//! A pager only knows how to fetch the page after a cursor. The single
//! accumulation loop lives in [`collect_all`], which also bounds the number
//! of pages so a cursor that never terminates cannot spin forever.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the following page, `None` on the last page
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait Pager: Send + Sync {
    type Item: Send;

    /// Fetch the page after `cursor`; `None` fetches the first page
    async fn next_page(&self, cursor: Option<String>) -> Result<Page<Self::Item>, FeedError>;
}

/// Fetch every page in order.
///
/// Fails with [`FeedError::PageLimitExceeded`] when the last page has not
/// been reached after `max_pages` fetches.
pub async fn collect_all<P: Pager + ?Sized>(
    pager: &P,
    max_pages: usize,
) -> Result<Vec<P::Item>, FeedError> {
    let mut items = Vec::new();
    let mut cursor = None;
    for _ in 0..max_pages {
        let page = pager.next_page(cursor).await?;
        items.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(items),
        }
    }
    tracing::warn!(max_pages, "pager still had pages left");
    Err(FeedError::PageLimitExceeded { max_pages })
}

/// Pages over an in-memory list; the cursor is the next item's offset
pub struct InMemoryPager<T> {
    items: Vec<T>,
    page_size: usize,
}

impl<T> InMemoryPager<T> {
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> Pager for InMemoryPager<T> {
    type Item = T;

    async fn next_page(&self, cursor: Option<String>) -> Result<Page<T>, FeedError> {
        let start = match cursor {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| FeedError::InvalidCursor(cursor))?,
            None => 0,
        };
        let start = start.min(self.items.len());
        let end = (start + self.page_size).min(self.items.len());
        Ok(Page {
            items: self.items[start..end].to_vec(),
            next_cursor: (end < self.items.len()).then(|| end.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Always claims there is another page
    struct EndlessPager;

    #[async_trait]
    impl Pager for EndlessPager {
        type Item = u32;

        async fn next_page(&self, _cursor: Option<String>) -> Result<Page<u32>, FeedError> {
            Ok(Page {
                items: vec![1],
                next_cursor: Some("again".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_collect_all_pages() {
        let pager = InMemoryPager::new((0..10).collect::<Vec<u32>>(), 3);
        let items = collect_all(&pager, 10).await.unwrap();
        assert_eq!(items, (0..10).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size() {
        let pager = InMemoryPager::new(vec!["a", "b", "c", "d"], 2);
        let first = pager.next_page(None).await.unwrap();
        assert_eq!(first.next_cursor.as_deref(), Some("2"));
        let second = pager.next_page(first.next_cursor).await.unwrap();
        assert_eq!(second.items, vec!["c", "d"]);
        assert_eq!(second.next_cursor, None);
    }

    #[tokio::test]
    async fn test_empty_list_is_one_page() {
        let pager: InMemoryPager<u8> = InMemoryPager::new(Vec::new(), 5);
        assert!(collect_all(&pager, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let pager = InMemoryPager::new(vec![1u8], 1);
        let result = pager.next_page(Some("x".to_string())).await;
        assert!(matches!(result, Err(FeedError::InvalidCursor(c)) if c == "x"));
    }

    #[tokio::test]
    async fn test_page_limit_guards_endless_cursor() {
        let result = collect_all(&EndlessPager, 4).await;
        assert!(matches!(
            result,
            Err(FeedError::PageLimitExceeded { max_pages: 4 })
        ));
    }
}
