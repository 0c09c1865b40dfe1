//! Viewport visibility triggers, independent of any browser API.
//!
//! Each observed item registers the IDs it needs and the IDs worth
//! prefetching. Two margins decide what a visibility event means: an item
//! inside the tight margin needs its sources now, an item inside the wide
//! margin is about to scroll in and gets its sources plus the prefetch list.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Within the tight margin; load immediately.
    Near,
    /// Within the wide margin; load speculatively.
    Preload,
}

/// Distances from the viewport edge, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityMargins {
    pub near_px: u32,
    pub preload_px: u32,
}

impl Default for VisibilityMargins {
    fn default() -> Self {
        Self {
            near_px: 100,
            preload_px: 800,
        }
    }
}

impl VisibilityMargins {
    /// Which trigger fires for an item `distance_px` below the viewport.
    #[must_use]
    pub fn classify(&self, distance_px: u32) -> Option<Trigger> {
        if distance_px <= self.near_px {
            Some(Trigger::Near)
        } else if distance_px <= self.preload_px.max(self.near_px) {
            Some(Trigger::Preload)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
struct Observation {
    needed: Vec<String>,
    preload: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VisibilityTracker<K> {
    margins: VisibilityMargins,
    observed: HashMap<K, Observation>,
    connected: bool,
}

impl<K: Eq + Hash> VisibilityTracker<K> {
    #[must_use]
    pub fn new(margins: VisibilityMargins) -> Self {
        Self {
            margins,
            observed: HashMap::new(),
            connected: true,
        }
    }

    #[must_use]
    pub fn margins(&self) -> VisibilityMargins {
        self.margins
    }

    /// Start observing `key`. Observing the same key twice is a no-op and
    /// returns `false`, as does observing after [`Self::disconnect`].
    pub fn observe(&mut self, key: K, needed: Vec<String>, preload: Vec<String>) -> bool {
        if !self.connected || self.observed.contains_key(&key) {
            return false;
        }
        self.observed.insert(key, Observation { needed, preload });
        true
    }

    pub fn unobserve(&mut self, key: &K) -> bool {
        self.observed.remove(key).is_some()
    }

    #[must_use]
    pub fn is_observed(&self, key: &K) -> bool {
        self.observed.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// IDs to load when `key` fires `trigger`. Unknown keys yield nothing.
    #[must_use]
    pub fn on_visible(&self, key: &K, trigger: Trigger) -> Vec<String> {
        let Some(observation) = self.observed.get(key) else {
            return Vec::new();
        };
        match trigger {
            Trigger::Near => observation.needed.clone(),
            Trigger::Preload => {
                let mut ids = observation.needed.clone();
                for id in &observation.preload {
                    if !ids.contains(id) {
                        ids.push(id.clone());
                    }
                }
                ids
            }
        }
    }

    /// Classify `distance_px` and return the trigger with its IDs.
    #[must_use]
    pub fn on_distance(&self, key: &K, distance_px: u32) -> Option<(Trigger, Vec<String>)> {
        if !self.is_observed(key) {
            return None;
        }
        let trigger = self.margins.classify(distance_px)?;
        Some((trigger, self.on_visible(key, trigger)))
    }

    /// Stop observing everything. Later events and observations are ignored.
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_classify_margins() {
        let margins = VisibilityMargins {
            near_px: 50,
            preload_px: 500,
        };
        assert_eq!(margins.classify(0), Some(Trigger::Near));
        assert_eq!(margins.classify(50), Some(Trigger::Near));
        assert_eq!(margins.classify(51), Some(Trigger::Preload));
        assert_eq!(margins.classify(500), Some(Trigger::Preload));
        assert_eq!(margins.classify(501), None);
    }

    #[test]
    fn test_observe_twice_is_noop() {
        let mut tracker = VisibilityTracker::new(VisibilityMargins::default());
        assert!(tracker.observe("e1", ids(&["a"]), Vec::new()));
        assert!(!tracker.observe("e1", ids(&["b"]), Vec::new()));
        assert_eq!(tracker.on_visible(&"e1", Trigger::Near), ids(&["a"]));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_preload_includes_prefetch_ids() {
        let mut tracker = VisibilityTracker::new(VisibilityMargins::default());
        tracker.observe("e1", ids(&["a", "b"]), ids(&["b", "c"]));
        assert_eq!(tracker.on_visible(&"e1", Trigger::Near), ids(&["a", "b"]));
        assert_eq!(tracker.on_visible(&"e1", Trigger::Preload), ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_on_distance() {
        let mut tracker = VisibilityTracker::new(VisibilityMargins::default());
        tracker.observe(1, ids(&["a"]), ids(&["z"]));
        assert_eq!(
            tracker.on_distance(&1, 10),
            Some((Trigger::Near, ids(&["a"])))
        );
        assert_eq!(
            tracker.on_distance(&1, 400),
            Some((Trigger::Preload, ids(&["a", "z"])))
        );
        assert_eq!(tracker.on_distance(&1, 5000), None);
        assert_eq!(tracker.on_distance(&2, 0), None);
    }

    #[test]
    fn test_disconnect_ignores_everything() {
        let mut tracker = VisibilityTracker::new(VisibilityMargins::default());
        tracker.observe("e1", ids(&["a"]), Vec::new());
        tracker.disconnect();
        assert!(!tracker.is_connected());
        assert!(tracker.is_empty());
        assert!(tracker.on_visible(&"e1", Trigger::Near).is_empty());
        assert!(!tracker.observe("e2", ids(&["b"]), Vec::new()));
    }

    #[test]
    fn test_unobserve_allows_reobserve() {
        let mut tracker = VisibilityTracker::new(VisibilityMargins::default());
        tracker.observe("e1", ids(&["a"]), Vec::new());
        assert!(tracker.unobserve(&"e1"));
        assert!(tracker.observe("e1", ids(&["b"]), Vec::new()));
        assert_eq!(tracker.on_visible(&"e1", Trigger::Near), ids(&["b"]));
    }
}
