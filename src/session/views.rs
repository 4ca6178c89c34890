use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A view the user has navigated to during this session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitedView {
    pub path: String,
    pub title: Option<String>,
    /// Affixed views survive a clear of the visited list
    pub affix: bool,
    pub visited_at: DateTime<Utc>,
}

impl VisitedView {
    pub fn new(path: impl Into<String>, title: Option<String>, affix: bool) -> Self {
        Self {
            path: path.into(),
            title,
            affix,
            visited_at: Utc::now(),
        }
    }
}

/// In-memory navigation history: visited views plus the names of views
/// whose state is kept alive between visits. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ViewCache {
    visited: Vec<VisitedView>,
    cached: BTreeSet<String>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a visit; a path already in the list is not duplicated
    pub fn add_visited(&mut self, view: VisitedView) {
        if self.visited.iter().any(|v| v.path == view.path) {
            return;
        }
        self.visited.push(view);
    }

    pub fn add_cached(&mut self, name: impl Into<String>) {
        self.cached.insert(name.into());
    }

    pub fn del_all_visited(&mut self) {
        self.visited.retain(|v| v.affix);
    }

    pub fn del_all_cached(&mut self) {
        self.cached.clear();
    }

    pub fn visited(&self) -> &[VisitedView] {
        &self.visited
    }

    pub fn cached(&self) -> &BTreeSet<String> {
        &self.cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_are_deduplicated_by_path() {
        let mut cache = ViewCache::new();
        cache.add_visited(VisitedView::new("/plans", None, false));
        cache.add_visited(VisitedView::new("/plans", Some("Plans".into()), false));
        assert_eq!(cache.visited().len(), 1);
    }

    #[test]
    fn clearing_visited_keeps_affixed_views() {
        let mut cache = ViewCache::new();
        cache.add_visited(VisitedView::new("/knowledge", None, true));
        cache.add_visited(VisitedView::new("/plans", None, false));
        cache.add_cached("Plans");

        cache.del_all_visited();
        cache.del_all_cached();

        let paths: Vec<_> = cache.visited().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["/knowledge"]);
        assert!(cache.cached().is_empty());
    }
}
