//! Timeline event and legacy section components.

use maud::{html, Markup, Render};

use super::card::ArticleCard;
use crate::content::dates::format_partial_date;
use crate::content::{Article, ArticleSummary, CuratedEvent, WikiContentItem};

/// Source state of one rendered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSources {
    /// Resolved on the server; missing IDs are left out.
    Resolved(Vec<Article>),
    /// Left for the client-side loader.
    Deferred(Vec<String>),
}

impl EventSources {
    /// Resolve from `ids` when every ID is available, otherwise defer them.
    #[must_use]
    pub fn from_lookup(ids: &[String], resolved: Vec<Article>, complete: bool) -> Self {
        if complete || ids.is_empty() {
            Self::Resolved(resolved)
        } else {
            Self::Deferred(ids.to_vec())
        }
    }
}

/// One curated event with its (already sorted) timeline points.
#[derive(Debug, Clone)]
pub struct EventCard<'a> {
    pub event: &'a CuratedEvent,
    pub sources: &'a EventSources,
}

impl<'a> EventCard<'a> {
    #[must_use]
    pub const fn new(event: &'a CuratedEvent, sources: &'a EventSources) -> Self {
        Self { event, sources }
    }

    fn render_sources(&self) -> Markup {
        match self.sources {
            EventSources::Resolved(articles) if articles.is_empty() => html! {},
            EventSources::Resolved(articles) => html! {
                details class="event-sources" {
                    summary { "Sources (" (articles.len()) ")" }
                    ul {
                        @for article in articles {
                            (ArticleCard::new(article))
                        }
                    }
                }
            },
            // JSON keeps IDs that contain commas intact
            EventSources::Deferred(ids) => html! {
                details class="event-sources lazy-sources"
                    data-source-ids=(serde_json::to_string(ids).unwrap_or_default()) {
                    summary { "Sources (" (ids.len()) ")" }
                    ul aria-busy="true" {}
                }
            },
        }
    }
}

impl Render for EventCard<'_> {
    fn render(&self) -> Markup {
        let event = self.event;
        html! {
            article class="timeline-event" data-status=(event.status) {
                header {
                    @if !event.primary_date.is_empty() {
                        time class="event-date" datetime=(event.primary_date) {
                            (format_partial_date(&event.primary_date))
                        }
                    }
                    h3 { (event.event_title) }
                }
                @if !event.event_summary.is_empty() {
                    p class="event-summary" { (event.event_summary) }
                }
                @if !event.timeline_points.is_empty() {
                    ol class="timeline-points" {
                        @for point in &event.timeline_points {
                            li {
                                time datetime=(point.date) { (format_partial_date(&point.date)) }
                                " "
                                span { (point.description) }
                            }
                        }
                    }
                }
                (self.render_sources())
            }
        }
    }
}

/// A legacy wiki category block with its article summaries.
#[derive(Debug, Clone)]
pub struct LegacySectionView<'a> {
    pub category: &'a str,
    pub items: &'a [WikiContentItem],
    pub summaries: &'a [ArticleSummary],
}

impl LegacySectionView<'_> {
    fn summaries_for(&self, item: &WikiContentItem) -> Vec<&ArticleSummary> {
        item.article_ids
            .iter()
            .filter_map(|id| self.summaries.iter().find(|s| &s.id == id))
            .collect()
    }
}

impl Render for LegacySectionView<'_> {
    fn render(&self) -> Markup {
        html! {
            section class="legacy-section" {
                h2 { (self.category) }
                @for item in self.items {
                    article class="wiki-item" id=(item.id) {
                        @if let Some(sub) = &item.subcategory {
                            h3 { (sub) }
                        }
                        p { (item.content) }
                        @let summaries = self.summaries_for(item);
                        @if !summaries.is_empty() {
                            ul class="article-summaries" {
                                @for summary in summaries {
                                    li {
                                        strong { (summary.title) }
                                        @for (date, text) in summary.event_contents.iter().rev() {
                                            p {
                                                time datetime=(date) { (format_partial_date(date)) }
                                                " "
                                                (text)
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
