//! Canonical category ordering and URL slugs.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::CuratedTimeline;

/// Main categories in display order.
pub const ORDERED_MAIN_CATEGORIES: &[&str] = &[
    "Creative Works",
    "Live & Broadcast",
    "Public Relations",
    "Personal Milestones",
    "Incidents & Controversies",
];

/// Sub categories per main category, in display order.
pub const ORDERED_SUB_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Creative Works",
        &["Music", "Film & TV", "Publications & Art", "Awards & Honors"],
    ),
    (
        "Live & Broadcast",
        &["Concerts & Tours", "Fan Events", "Broadcast Appearances"],
    ),
    (
        "Public Relations",
        &[
            "Media Interviews",
            "Endorsements & Ambassadors",
            "Social & Digital",
        ],
    ),
    (
        "Personal Milestones",
        &["Relationships & Family", "Health & Service", "Education & Growth"],
    ),
    (
        "Incidents & Controversies",
        &[
            "Legal & Scandal",
            "Accidents & Emergencies",
            "Public Backlash",
        ],
    ),
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid regex"));

/// Canonical sub categories for `main`, empty when `main` is unknown.
#[must_use]
pub fn canonical_sub_categories(main: &str) -> &'static [&'static str] {
    ORDERED_SUB_CATEGORIES
        .iter()
        .find(|(name, _)| *name == main)
        .map(|(_, subs)| *subs)
        .unwrap_or_default()
}

/// URL slug for a category name: `Film & TV` becomes `film-and-tv`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase().replace('&', "-and-");
    let dashed = WHITESPACE.replace_all(&lowered, "-");
    DASHES
        .replace_all(&dashed, "-")
        .trim_matches('-')
        .to_string()
}

/// Find the entry of `candidates` whose slug (or name) matches `value`.
#[must_use]
pub fn match_slug<'a, S: AsRef<str>>(candidates: &'a [S], value: &str) -> Option<&'a str> {
    let wanted = slugify(value);
    candidates
        .iter()
        .map(|c| -> &'a str { c.as_ref() })
        .find(|c| slugify(c) == wanted)
}

/// Selectable categories of a curated timeline.
///
/// Only canonical categories holding at least one event appear, in
/// canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    entries: Vec<(String, Vec<String>)>,
}

impl CategoryIndex {
    #[must_use]
    pub fn from_curated(timeline: &CuratedTimeline) -> Self {
        let entries = ORDERED_MAIN_CATEGORIES
            .iter()
            .filter_map(|main| {
                let present = timeline.categories.get(*main)?;
                let subs: Vec<String> = canonical_sub_categories(main)
                    .iter()
                    .filter(|sub| present.get(**sub).is_some_and(|events| !events.is_empty()))
                    .map(|sub| (*sub).to_string())
                    .collect();
                (!subs.is_empty()).then(|| ((*main).to_string(), subs))
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Available main categories in canonical order.
    pub fn main_categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(main, _)| main.as_str())
    }

    /// Available sub categories of `main` in canonical order.
    #[must_use]
    pub fn sub_categories(&self, main: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(m, _)| m == main)
            .map(|(_, subs)| subs.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn first_main(&self) -> Option<&str> {
        self.entries.first().map(|(main, _)| main.as_str())
    }

    #[must_use]
    pub fn first_sub(&self, main: &str) -> Option<&str> {
        self.sub_categories(main).first().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, main: &str, sub: &str) -> bool {
        self.sub_categories(main).iter().any(|s| s == sub)
    }

    /// Resolve a main category from its slug or name.
    #[must_use]
    pub fn main_by_slug(&self, value: &str) -> Option<&str> {
        let wanted = slugify(value);
        self.main_categories().find(|m| slugify(m) == wanted)
    }

    /// Resolve a sub category of `main` from its slug or name.
    #[must_use]
    pub fn sub_by_slug(&self, main: &str, value: &str) -> Option<&str> {
        match_slug(self.sub_categories(main), value)
    }
}
