//! Category and search filtering for the item list on screen.
//!
//! [`QueryState`] holds the two filters the reader can set.  Filtering never
//! mutates or reorders the ingested list; it just picks a subsequence.

use std::fmt;

use crate::source::NewsItem;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every category, including items without one.
    #[default]
    All,
    /// Exact match on [`NewsItem::category`].
    Named(String),
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub category: CategoryFilter,
    /// Case-insensitive substring of title or description.  Empty matches all.
    pub search: String,
}

impl QueryState {
    pub fn matches(&self, item: &NewsItem) -> bool {
        let category_ok = match &self.category {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => item.category == *name,
        };
        if !category_ok {
            return false;
        }

        let needle = self.search.to_lowercase();
        item.title.to_lowercase().contains(&needle) || item.description.to_lowercase().contains(&needle)
    }

    /// The items passing both filters, in their original order.
    pub fn apply<'a>(&self, items: &'a [NewsItem]) -> Vec<&'a NewsItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }

    /// Advance to the next entry of [`categories`], wrapping back to `All`.
    pub fn cycle_category(&mut self, items: &[NewsItem]) {
        let options = categories(items);
        let next = options
            .iter()
            .position(|c| *c == self.category)
            .map_or(0, |i| (i + 1) % options.len());
        self.category = options[next].clone();
    }

    /// Reset both filters, as happens when a new poll result arrives.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `All` followed by each distinct non-blank category, in first-seen order.
pub fn categories(items: &[NewsItem]) -> Vec<CategoryFilter> {
    let mut out = vec![CategoryFilter::All];
    for item in items {
        if item.category.trim().is_empty() {
            continue;
        }
        let named = CategoryFilter::Named(item.category.clone());
        if !out.contains(&named) {
            out.push(named);
        }
    }
    out
}
