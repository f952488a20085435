use crate::catalog::RecordStore;
use crate::filter::{self, PredicateSet, Searchable};
use tracing::debug;

/// Owns a listing's filter criteria and its current result.
///
/// Every setter re-runs the pipeline against the full store rather than the
/// previous result, so relaxing a predicate brings records back.
#[derive(Debug, Clone)]
pub struct FilterController<T> {
    store: RecordStore<T>,
    predicates: PredicateSet,
    filtered: Vec<T>,
}

impl<T> FilterController<T>
where
    T: Searchable + Clone,
{
    pub fn new(store: RecordStore<T>) -> Self {
        let filtered = store.to_vec();
        Self {
            store,
            predicates: PredicateSet::default(),
            filtered,
        }
    }

    pub fn store(&self) -> &RecordStore<T> {
        &self.store
    }

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    pub fn filtered(&self) -> &[T] {
        &self.filtered
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.predicates.text = text.into();
        self.recompute();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.predicates.category = category;
        self.recompute();
    }

    pub fn set_min_score(&mut self, min_score: u16) {
        self.predicates.min_score = min_score;
        self.recompute();
    }

    /// Swaps in a whole predicate set with a single recompute.
    pub fn replace(&mut self, predicates: PredicateSet) {
        self.predicates = predicates;
        self.recompute();
    }

    /// Resets every predicate at once.
    pub fn clear_all(&mut self) {
        self.replace(PredicateSet::default());
    }

    fn recompute(&mut self) {
        self.filtered = filter::apply(&self.store, &self.predicates);
        debug!(
            active = self.predicates.active_count(),
            matched = self.filtered.len(),
            total = self.store.len(),
            "filters recomputed"
        );
    }
}
