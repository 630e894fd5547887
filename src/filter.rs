use crate::types::Searchable;

/// Case-insensitive substring search over an already-aggregated catalog.
pub struct QueryFilter;

impl QueryFilter {
    /// Normalized form of a user query; `None` means "no filtering".
    pub fn normalize(query: &str) -> Option<String> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            None
        } else {
            Some(q)
        }
    }

    /// True when the normalized query occurs in any of the item's search fields.
    pub fn matches<T: Searchable>(item: &T, normalized_query: &str) -> bool {
        item.search_fields()
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(normalized_query))
    }

    /// Items matching `query`, in their input order. A blank query keeps
    /// everything.
    pub fn apply<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
        match Self::normalize(query) {
            None => items.iter().collect(),
            Some(q) => items.iter().filter(|item| Self::matches(*item, &q)).collect(),
        }
    }
}
