//! Collect the article/source IDs referenced by a timeline.

use std::collections::HashSet;

use super::categories::{canonical_sub_categories, ORDERED_MAIN_CATEGORIES};
use super::model::{CuratedEvent, CuratedTimeline, LegacyTimeline, TimelineContent};

/// Insertion-ordered set of IDs.
///
/// The order is the order of first appearance, so the same input always
/// produces the same request list.
#[derive(Debug, Clone, Default)]
pub struct SourceIds {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl SourceIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id`; returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string());
        self.order.push(id.to_string());
        true
    }

    pub fn extend<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for id in ids {
            self.insert(id);
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl PartialEq for SourceIds {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for SourceIds {}

/// Every unique source ID reachable from `content`.
#[must_use]
pub fn collect_source_ids(content: &TimelineContent) -> SourceIds {
    match content {
        TimelineContent::Legacy(legacy) => collect_legacy(legacy),
        TimelineContent::Curated(curated) => collect_curated(curated),
    }
}

fn collect_legacy(legacy: &LegacyTimeline) -> SourceIds {
    let mut ids = SourceIds::new();
    for item in &legacy.category_content {
        ids.extend(&item.article_ids);
    }
    ids
}

fn collect_curated(curated: &CuratedTimeline) -> SourceIds {
    let mut ids = SourceIds::new();
    for event in curated_events_in_order(curated) {
        collect_into(event, &mut ids);
    }
    ids
}

/// Source IDs of a single event's timeline points.
#[must_use]
pub fn collect_event_source_ids(event: &CuratedEvent) -> SourceIds {
    let mut ids = SourceIds::new();
    collect_into(event, &mut ids);
    ids
}

fn collect_into(event: &CuratedEvent, ids: &mut SourceIds) {
    for point in &event.timeline_points {
        ids.extend(&point.source_ids);
    }
}

/// Walk every event: canonical categories first, then the remaining keys in
/// lexical order.
pub fn curated_events_in_order(curated: &CuratedTimeline) -> impl Iterator<Item = &CuratedEvent> {
    let mut mains: Vec<&String> = curated.categories.keys().collect();
    mains.sort_by_key(|main| canonical_rank(ORDERED_MAIN_CATEGORIES, main));

    mains.into_iter().flat_map(move |main| {
        let subs_map = &curated.categories[main];
        let canonical = canonical_sub_categories(main);
        let mut subs: Vec<&String> = subs_map.keys().collect();
        subs.sort_by_key(|sub| canonical_rank(canonical, sub));
        subs.into_iter().flat_map(move |sub| subs_map[sub].iter())
    })
}

/// Position in `ordering`, unknown names after every known one. Ties between
/// unknown names keep the map's lexical order since the sort is stable.
fn canonical_rank(ordering: &[&str], name: &str) -> usize {
    ordering
        .iter()
        .position(|candidate| *candidate == name)
        .unwrap_or(ordering.len())
}
