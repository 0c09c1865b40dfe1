//! Figure page: profile, overview and the timeline.

use maud::{html, Markup};

use crate::articles::VisibilityMargins;
use crate::components::{
    figure_href, Alert, ArticleCard, BaseLayout, EmptyState, EventCard, EventSources,
    LegacySectionView, Tab, TabGroup, TabStyle,
};
use crate::content::navigator::{NavAction, NavQuery, NavState};
use crate::content::normalize::{CuratedView, LegacySection};
use crate::content::{Article, ArticleSummary, MainOverview, PublicFigure};

const LAZY_SOURCES_SCRIPT: &str = "/static/js/lazy-sources.js";

/// Timeline data ready for rendering.
#[derive(Debug, Clone)]
pub enum TimelineSection<'a> {
    Curated {
        view: &'a CuratedView,
        /// Aligned with `view.events`.
        sources: &'a [EventSources],
    },
    Legacy {
        sections: &'a [LegacySection],
        summaries: &'a [ArticleSummary],
    },
}

#[derive(Debug, Clone)]
pub struct FigurePageParams<'a> {
    pub figure: &'a PublicFigure,
    pub overview: &'a MainOverview,
    pub overview_sources: &'a [Article],
    pub timeline: TimelineSection<'a>,
    /// Banner shown when sources could not be resolved.
    pub notice: Option<&'a str>,
    /// Trigger distances handed to the client-side source loader.
    pub margins: VisibilityMargins,
}

fn nav_href(base: &str, query: &NavQuery) -> String {
    let query = query.to_query_string();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

fn render_profile(figure: &PublicFigure) -> Markup {
    html! {
        header class="figure-profile" {
            @if let Some(pic) = &figure.profile_pic {
                img class="profile-pic" src=(pic) alt=(figure.name);
            }
            hgroup {
                h1 { (figure.name) }
                @if !figure.name_kr.is_empty() {
                    p class="name-kr" { (figure.name_kr) }
                }
            }
            dl class="profile-facts" {
                @if !figure.occupation.is_empty() {
                    dt { "Occupation" }
                    dd { (figure.occupation.join(", ")) }
                }
                @if let Some(group) = &figure.group_name {
                    dt { @if figure.is_group { "Group" } @else { "Member of" } }
                    dd { (group) }
                }
                @if !figure.nationality.is_empty() {
                    dt { "Nationality" }
                    dd { (figure.nationality) }
                }
                @if let Some(birth) = &figure.birth_date {
                    dt { @if figure.is_group { "Debut" } @else { "Born" } }
                    dd { (birth) }
                }
            }
        }
    }
}

fn render_overview(overview: &MainOverview, sources: &[Article]) -> Markup {
    html! {
        section class="overview" {
            @if !overview.content.is_empty() {
                p { (overview.content) }
            }
            @if !sources.is_empty() {
                details class="overview-sources" {
                    summary { "Sources (" (sources.len()) ")" }
                    ul {
                        @for article in sources {
                            (ArticleCard::new(article))
                        }
                    }
                }
            }
        }
    }
}

fn render_navigation(base: &str, nav: &NavState, years: &[i32]) -> Markup {
    let Some(selection) = nav.selection() else {
        return html! {};
    };

    let mut mains = TabGroup::new(TabStyle::Primary).with_aria_label("Categories");
    mains.extend(nav.index().main_categories().map(|main| {
        let href = nav_href(base, &nav.preview(NavAction::SelectMain(main.to_string())));
        Tab::new(main, href).active_if(main == selection.main)
    }));

    let mut subs = TabGroup::new(TabStyle::Secondary).with_aria_label("Subcategories");
    subs.extend(nav.index().sub_categories(&selection.main).iter().map(|sub| {
        let href = nav_href(base, &nav.preview(NavAction::SelectSub(sub.clone())));
        Tab::new(sub.as_str(), href).active_if(*sub == selection.sub)
    }));

    let filter = nav.years();
    let mut chips = TabGroup::new(TabStyle::Chips).with_aria_label("Years");
    if !years.is_empty() {
        chips.extend(std::iter::once(
            Tab::new("All years", nav_href(base, &nav.preview(NavAction::AllYears)))
                .active_if(filter.is_empty()),
        ));
        chips.extend(years.iter().map(|&year| {
            let href = nav_href(base, &nav.preview(NavAction::ToggleYear(year)));
            Tab::new(year.to_string(), href).active_if(filter.contains(year))
        }));
    }

    html! {
        (mains)
        (subs)
        (chips)
    }
}

fn render_curated(base: &str, view: &CuratedView, sources: &[EventSources]) -> Markup {
    if view.nav.selection().is_none() {
        return html! { (EmptyState::new("No timeline events yet.")) };
    }

    html! {
        (render_navigation(base, &view.nav, &view.years))
        @if view.events.is_empty() {
            (EmptyState::new("No events match the selected years."))
        } @else {
            div class="timeline" {
                @for (event, event_sources) in view.events.iter().zip(sources) {
                    (EventCard::new(event, event_sources))
                }
            }
        }
    }
}

fn render_legacy(sections: &[LegacySection], summaries: &[ArticleSummary]) -> Markup {
    html! {
        @if sections.is_empty() {
            (EmptyState::new("No timeline events yet."))
        }
        @for section in sections {
            (LegacySectionView {
                category: &section.category,
                items: &section.items,
                summaries,
            })
        }
    }
}

#[must_use]
pub fn render_figure_page(params: &FigurePageParams<'_>) -> Markup {
    let base = figure_href(&params.figure.id);

    let has_deferred = match &params.timeline {
        TimelineSection::Curated { sources, .. } => sources
            .iter()
            .any(|s| matches!(s, EventSources::Deferred(_))),
        TimelineSection::Legacy { .. } => false,
    };

    let timeline = match &params.timeline {
        TimelineSection::Curated { view, sources } => render_curated(&base, view, sources),
        TimelineSection::Legacy {
            sections,
            summaries,
        } => render_legacy(sections, summaries),
    };

    let content = html! {
        (render_profile(params.figure))
        @if let Some(notice) = params.notice {
            (Alert::warning(notice))
        }
        (render_overview(params.overview, params.overview_sources))
        section class="figure-timeline"
            data-near-margin=(params.margins.near_px)
            data-preload-margin=(params.margins.preload_px) {
            h2 { "Timeline" }
            (timeline)
        }
    };

    let mut layout = BaseLayout::new(&params.figure.name);
    if has_deferred {
        layout = layout.with_script(LAZY_SOURCES_SCRIPT);
    }
    layout.render(content)
}
