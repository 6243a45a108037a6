//! Source filter: which sources' sections are currently shown.

use std::collections::BTreeSet;

use crate::models::SourceId;

/// The set of visible sources. Everything is visible by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    visible: BTreeSet<SourceId>,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            visible: SourceId::ALL.into_iter().collect(),
        }
    }
}

impl SourceFilter {
    /// All sources visible except `hidden`.
    pub fn with_hidden(hidden: &[SourceId]) -> Self {
        let mut filter = Self::default();
        for source in hidden {
            filter.visible.remove(source);
        }
        filter
    }

    pub fn is_visible(&self, source: SourceId) -> bool {
        self.visible.contains(&source)
    }

    /// Flip a source's membership; returns whether it is now visible.
    pub fn toggle(&mut self, source: SourceId) -> bool {
        if !self.visible.remove(&source) {
            self.visible.insert(source);
        }
        self.is_visible(source)
    }

    pub fn visible(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.visible.iter().copied()
    }
}
