//! Page types returned by blob listings and record scans.

use serde::{Deserialize, Serialize};

/// One page of a blob prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    /// Keys on this page, in store order.
    pub keys: Vec<String>,
    /// Token to pass to the next call; `None` once the listing is exhausted.
    pub next_token: Option<String>,
}

impl ListPage {
    /// Whether more keys remain after this page.
    pub fn is_truncated(&self) -> bool {
        self.next_token.is_some()
    }
}

/// Result of a capped full-table scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanPage<T> {
    /// Items returned, unordered, at most the requested page size.
    pub items: Vec<T>,
    /// Whether the table held more items than the cap allowed.
    pub truncated: bool,
}

impl<T> ScanPage<T> {
    /// Create a scan result.
    pub fn new(items: Vec<T>, truncated: bool) -> Self {
        Self { items, truncated }
    }

    /// Map the items while keeping the truncation flag.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ScanPage<U> {
        ScanPage {
            items: self.items.into_iter().map(f).collect(),
            truncated: self.truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_page_truncation() {
        let page = ListPage {
            keys: vec!["a".into()],
            next_token: Some("a".into()),
        };
        assert!(page.is_truncated());
        assert!(!ListPage::default().is_truncated());
    }
}
