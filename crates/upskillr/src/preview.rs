use serde::Serialize;

const EMPTY_MESSAGE: &str = "No results match the current filters.";

/// Bounded slice of a filtered listing plus its overflow or empty affordance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview<T> {
    pub total: usize,
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_all: Option<ViewAll>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
}

/// "View all N results" action shown when the listing overflows the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewAll {
    pub total: usize,
    pub label: String,
}

/// Shown instead of cards when nothing survives the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub message: &'static str,
    pub clear_filters: ClearFilters,
}

/// Action that resets every predicate in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearFilters {
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl<T: Clone> Preview<T> {
    /// A limit of zero is treated as one so a non-empty listing always shows
    /// at least one card.
    pub fn build(filtered: &[T], limit: usize) -> Self {
        let limit = limit.max(1);
        let total = filtered.len();

        let view_all = (total > limit).then(|| ViewAll {
            total,
            label: format!("View all {total} results"),
        });
        let empty_state = (total == 0).then(|| EmptyState {
            message: EMPTY_MESSAGE,
            clear_filters: ClearFilters {
                label: "Clear filters",
                href: None,
            },
        });

        Self {
            total,
            items: filtered.iter().take(limit).cloned().collect(),
            view_all,
            empty_state,
        }
    }
}

impl<T> Preview<T> {
    /// Points the clear-filters action at the unfiltered listing.
    pub fn with_clear_href(mut self, href: impl Into<String>) -> Self {
        if let Some(empty) = self.empty_state.as_mut() {
            empty.clear_filters.href = Some(href.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
