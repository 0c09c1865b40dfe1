//! Category, sub category and year selection for the curated timeline view.
//!
//! The view state is a small reducer. The URL query is the source of truth:
//! a request (or a back/forward navigation) resolves it into a selection.
//! Local actions update the selection optimistically and record the URL
//! write they imply until a matching `UrlChanged` reconciles it.

use std::collections::BTreeSet;

use url::form_urlencoded;

use super::categories::{slugify, CategoryIndex};
use super::model::CuratedEvent;

/// URL query parameters driving the timeline view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavQuery {
    /// Main category slug.
    pub category: Option<String>,
    /// Sub category slug.
    pub sub_category: Option<String>,
    pub years: BTreeSet<i32>,
}

impl NavQuery {
    /// Parse a raw query string. Unknown keys and non-numeric years are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::default();
        for (key, value) in form_urlencoded::parse(raw.trim_start_matches('?').as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "category" => query.category = Some(value.to_string()),
                "subCategory" => query.sub_category = Some(value.to_string()),
                "year" => {
                    if let Ok(year) = value.parse() {
                        query.years.insert(year);
                    }
                }
                _ => {}
            }
        }
        query
    }

    /// Serialize back into a query string (without the leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(category) = &self.category {
            serializer.append_pair("category", category);
        }
        if let Some(sub) = &self.sub_category {
            serializer.append_pair("subCategory", sub);
        }
        for year in &self.years {
            serializer.append_pair("year", &year.to_string());
        }
        serializer.finish()
    }
}

/// Active main and sub category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub main: String,
    pub sub: String,
}

/// Multi-select filter over `event_years`. Empty means no filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearFilter {
    years: BTreeSet<i32>,
}

impl YearFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_years<I: IntoIterator<Item = i32>>(years: I) -> Self {
        Self {
            years: years.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    #[must_use]
    pub fn contains(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    pub fn toggle(&mut self, year: i32) {
        if !self.years.remove(&year) {
            self.years.insert(year);
        }
    }

    /// "All Years": drop every selected year.
    pub fn clear(&mut self) {
        self.years.clear();
    }

    pub fn selected(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().copied()
    }

    #[must_use]
    pub fn matches(&self, event: &CuratedEvent) -> bool {
        self.is_empty() || event.event_years.iter().any(|y| self.years.contains(y))
    }

    #[must_use]
    pub fn apply<'a>(&self, events: &'a [CuratedEvent]) -> Vec<&'a CuratedEvent> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Distinct years across `events`, newest first.
#[must_use]
pub fn available_years(events: &[CuratedEvent]) -> Vec<i32> {
    let years: BTreeSet<i32> = events
        .iter()
        .flat_map(|e| e.event_years.iter().copied())
        .collect();
    years.into_iter().rev().collect()
}

#[derive(Debug, Clone)]
pub enum NavAction {
    /// Select a main category by name or slug; its first sub category follows.
    SelectMain(String),
    /// Select a sub category of the active main category by name or slug.
    SelectSub(String),
    ToggleYear(i32),
    AllYears,
    /// The URL changed (page load, back/forward or our own write landing).
    UrlChanged(NavQuery),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewSelection {
    selection: Option<Selection>,
    years: YearFilter,
}

/// Navigation state for one curated timeline.
#[derive(Debug, Clone)]
pub struct NavState {
    index: CategoryIndex,
    url: ViewSelection,
    local: Option<ViewSelection>,
    pending_url: Option<NavQuery>,
}

impl NavState {
    /// Build the state from the current URL query.
    #[must_use]
    pub fn new(index: CategoryIndex, query: &NavQuery) -> Self {
        let url = resolve(&index, query);
        Self {
            index,
            url,
            local: None,
            pending_url: None,
        }
    }

    #[must_use]
    pub fn index(&self) -> &CategoryIndex {
        &self.index
    }

    fn current(&self) -> &ViewSelection {
        self.local.as_ref().unwrap_or(&self.url)
    }

    /// Active selection, `None` when the timeline has no selectable events.
    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.current().selection.as_ref()
    }

    #[must_use]
    pub fn years(&self) -> &YearFilter {
        &self.current().years
    }

    /// URL write still waiting to be confirmed by a `UrlChanged`.
    #[must_use]
    pub fn pending_url(&self) -> Option<&NavQuery> {
        self.pending_url.as_ref()
    }

    /// Query reflecting the active state.
    #[must_use]
    pub fn query(&self) -> NavQuery {
        to_query(self.current())
    }

    /// Apply `action`. Returns the URL write it implies, if any.
    pub fn apply(&mut self, action: NavAction) -> Option<NavQuery> {
        if let NavAction::UrlChanged(query) = action {
            self.url = resolve(&self.index, &query);
            self.local = None;
            self.pending_url = None;
            return None;
        }

        let next = self.reduce(self.current().clone(), action);
        if &next == self.current() {
            return None;
        }

        let write = to_query(&next);
        self.local = Some(next);
        self.pending_url = Some(write.clone());
        Some(write)
    }

    /// Query the state would have after `action`, without applying it.
    #[must_use]
    pub fn preview(&self, action: NavAction) -> NavQuery {
        let mut copy = self.clone();
        copy.apply(action);
        copy.query()
    }

    fn reduce(&self, mut view: ViewSelection, action: NavAction) -> ViewSelection {
        match action {
            NavAction::SelectMain(value) => {
                let Some(main) = self.index.main_by_slug(&value) else {
                    return view;
                };
                let unchanged = view.selection.as_ref().is_some_and(|s| s.main == main);
                if !unchanged {
                    view.selection = self.index.first_sub(main).map(|sub| Selection {
                        main: main.to_string(),
                        sub: sub.to_string(),
                    });
                }
            }
            NavAction::SelectSub(value) => {
                if let Some(selection) = view.selection.as_mut() {
                    if let Some(sub) = self.index.sub_by_slug(&selection.main, &value) {
                        selection.sub = sub.to_string();
                    }
                }
            }
            NavAction::ToggleYear(year) => view.years.toggle(year),
            NavAction::AllYears => view.years.clear(),
            NavAction::UrlChanged(_) => {}
        }
        view
    }
}

/// Resolve a URL query against the available categories.
///
/// Unknown or missing categories fall back to the first available one; a sub
/// category that does not exist under the resolved main category falls back
/// to that category's first sub category.
fn resolve(index: &CategoryIndex, query: &NavQuery) -> ViewSelection {
    let main = query
        .category
        .as_deref()
        .and_then(|c| index.main_by_slug(c))
        .or_else(|| index.first_main());

    let selection = main.and_then(|main| {
        let sub = query
            .sub_category
            .as_deref()
            .and_then(|s| index.sub_by_slug(main, s))
            .or_else(|| index.first_sub(main))?;
        Some(Selection {
            main: main.to_string(),
            sub: sub.to_string(),
        })
    });

    ViewSelection {
        selection,
        years: YearFilter::from_years(query.years.iter().copied()),
    }
}

fn to_query(view: &ViewSelection) -> NavQuery {
    NavQuery {
        category: view.selection.as_ref().map(|s| slugify(&s.main)),
        sub_category: view.selection.as_ref().map(|s| slugify(&s.sub)),
        years: view.years.selected().collect(),
    }
}
