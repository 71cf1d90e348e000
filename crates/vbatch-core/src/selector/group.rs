//! Candidate groups: one selection pool per source (e.g. one sub-folder).

/// A named, ordered pool of items. Membership is fixed once built; rescan to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGroup<T> {
    pub id: String,
    pub items: Vec<T>,
}

impl<T> CandidateGroup<T> {
    pub fn new(id: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            id: id.into(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
