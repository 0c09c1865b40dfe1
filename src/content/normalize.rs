//! Turn a versioned timeline payload into what a page renders.
//!
//! This is the only place that branches on the schema version.

use super::categories::CategoryIndex;
use super::dates::{sort_events, sorted_event};
use super::model::{CuratedEvent, TimelineContent, WikiContentItem};
use super::navigator::{available_years, NavQuery, NavState};
use super::sources::{collect_source_ids, SourceIds};

/// Legacy wiki blocks of one category, in payload order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySection {
    pub category: String,
    pub items: Vec<WikiContentItem>,
}

#[derive(Debug, Clone)]
pub struct CuratedView {
    pub nav: NavState,
    /// Events of the active sub category after the year filter, newest first,
    /// each with its points sorted.
    pub events: Vec<CuratedEvent>,
    /// Years present in the active sub category, newest first.
    pub years: Vec<i32>,
}

#[derive(Debug, Clone)]
pub enum NormalizedTimeline {
    Legacy(Vec<LegacySection>),
    Curated(CuratedView),
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub timeline: NormalizedTimeline,
    /// Every source ID the payload references.
    pub source_ids: SourceIds,
}

#[must_use]
pub fn normalize(content: &TimelineContent, query: &NavQuery) -> Normalized {
    let source_ids = collect_source_ids(content);

    let timeline = match content {
        TimelineContent::Legacy(legacy) => {
            let mut sections: Vec<LegacySection> = Vec::new();
            for item in &legacy.category_content {
                match sections.iter_mut().find(|s| s.category == item.category) {
                    Some(section) => section.items.push(item.clone()),
                    None => sections.push(LegacySection {
                        category: item.category.clone(),
                        items: vec![item.clone()],
                    }),
                }
            }
            NormalizedTimeline::Legacy(sections)
        }
        TimelineContent::Curated(curated) => {
            let nav = NavState::new(CategoryIndex::from_curated(curated), query);
            let all = nav
                .selection()
                .map(|s| curated.events(&s.main, &s.sub))
                .unwrap_or_default();
            let years = available_years(all);
            let filter = nav.years();
            let events = sort_events(all)
                .iter()
                .filter(|e| filter.matches(e))
                .map(sorted_event)
                .collect();
            NormalizedTimeline::Curated(CuratedView { nav, events, years })
        }
    };

    Normalized {
        timeline,
        source_ids,
    }
}
