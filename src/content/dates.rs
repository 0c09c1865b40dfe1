//! Partial-precision dates and the timeline ordering built on them.
//!
//! Timeline dates come in three precisions: `YYYY`, `YYYY-MM` and
//! `YYYY-MM-DD`. Points are shown newest first, with a year-only point
//! leading the more specific points of the same year since it stands for the
//! year as a whole.

use std::cmp::Ordering;

use chrono::Month;

use super::model::{CuratedEvent, TimelinePoint};

/// Number of date parts that were actually given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    Year = 1,
    Month = 2,
    Day = 3,
}

/// A date with year, optional month and optional day.
///
/// Missing parts default to 1 for comparison purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub specificity: Specificity,
}

impl PartialDate {
    /// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    ///
    /// Returns `None` for empty or non-numeric segments and for more than
    /// three segments.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');

        let year = parts.next()?.parse::<i32>().ok()?;
        let month = parts.next().map(str::parse::<u32>).transpose().ok()?;
        let day = parts.next().map(str::parse::<u32>).transpose().ok()?;
        if parts.next().is_some() {
            return None;
        }

        let specificity = match (month, day) {
            (None, _) => Specificity::Year,
            (Some(_), None) => Specificity::Month,
            (Some(_), Some(_)) => Specificity::Day,
        };

        Some(Self {
            year,
            month: month.unwrap_or(1),
            day: day.unwrap_or(1),
            specificity,
        })
    }

    /// Human-readable label: `2021`, `Mar 2021` or `Mar 5, 2021`.
    #[must_use]
    pub fn label(&self) -> String {
        let month = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name()[..3].to_string());

        match (self.specificity, month) {
            (Specificity::Year, _) | (_, None) => self.year.to_string(),
            (Specificity::Month, Some(m)) => format!("{m} {}", self.year),
            (Specificity::Day, Some(m)) => format!("{m} {}, {}", self.day, self.year),
        }
    }
}

/// Timeline order between two parsed dates. `Less` means `a` is shown first.
#[must_use]
pub fn compare_partial_dates(a: &PartialDate, b: &PartialDate) -> Ordering {
    b.year
        .cmp(&a.year)
        .then_with(|| match (a.specificity, b.specificity) {
            (Specificity::Year, Specificity::Year) => Ordering::Equal,
            (Specificity::Year, _) => Ordering::Less,
            (_, Specificity::Year) => Ordering::Greater,
            _ => Ordering::Equal,
        })
        .then_with(|| b.month.cmp(&a.month))
        .then_with(|| a.specificity.cmp(&b.specificity))
        .then_with(|| b.day.cmp(&a.day))
}

/// Timeline order between two raw date strings.
///
/// Unparseable dates go after every parseable one and compare equal to each
/// other, so a stable sort keeps them in input order.
#[must_use]
pub fn compare_date_strings(a: &str, b: &str) -> Ordering {
    compare_parsed(PartialDate::parse(a).as_ref(), PartialDate::parse(b).as_ref())
}

fn compare_parsed(a: Option<&PartialDate>, b: Option<&PartialDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_partial_dates(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Return a sorted copy of `points`, newest first.
#[must_use]
pub fn sort_timeline_points(points: &[TimelinePoint]) -> Vec<TimelinePoint> {
    let mut keyed: Vec<(Option<PartialDate>, &TimelinePoint)> = points
        .iter()
        .map(|p| (PartialDate::parse(&p.date), p))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_parsed(a.as_ref(), b.as_ref()));
    keyed.into_iter().map(|(_, p)| p.clone()).collect()
}

/// Return a sorted copy of `events` ordered by `primary_date`, newest first.
#[must_use]
pub fn sort_events(events: &[CuratedEvent]) -> Vec<CuratedEvent> {
    let mut keyed: Vec<(Option<PartialDate>, &CuratedEvent)> = events
        .iter()
        .map(|e| (PartialDate::parse(&e.primary_date), e))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_parsed(a.as_ref(), b.as_ref()));
    keyed.into_iter().map(|(_, e)| e.clone()).collect()
}

/// Deep copy of `event` with its timeline points sorted.
#[must_use]
pub fn sorted_event(event: &CuratedEvent) -> CuratedEvent {
    CuratedEvent {
        timeline_points: sort_timeline_points(&event.timeline_points),
        ..event.clone()
    }
}

/// Display label for a raw date string; unparseable input is returned as-is.
#[must_use]
pub fn format_partial_date(value: &str) -> String {
    PartialDate::parse(value).map_or_else(|| value.to_string(), |d| d.label())
}
