//! Link-based tab components for timeline navigation.
//!
//! Category tabs, subcategory tabs and year chips all render as plain links
//! so the page works without JavaScript; the URL carries the selection.

use maud::{html, Markup, Render};

/// Visual style of a tab group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabStyle {
    /// Main category row
    #[default]
    Primary,
    /// Subcategory row under the main tabs
    Secondary,
    /// Toggleable filter chips
    Chips,
}

impl TabStyle {
    const fn group_class(self) -> &'static str {
        match self {
            Self::Primary => "timeline-tabs",
            Self::Secondary => "timeline-tabs secondary",
            Self::Chips => "filter-chips",
        }
    }

    const fn item_class(self, active: bool) -> &'static str {
        match (self, active) {
            (Self::Chips, true) => "chip active",
            (Self::Chips, false) => "chip",
            (_, true) => "timeline-tab active",
            (_, false) => "timeline-tab",
        }
    }
}

/// A single tab in a tab group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub label: String,
    pub href: String,
    /// Optional count badge to display
    pub count: Option<usize>,
    pub active: bool,
}

impl Tab {
    #[must_use]
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            count: None,
            active: false,
        }
    }

    /// Mark the tab active when `active` holds.
    #[must_use]
    pub fn active_if(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    fn render_with(&self, style: TabStyle) -> Markup {
        html! {
            a class=(style.item_class(self.active))
                href=(self.href)
                aria-current=[self.active.then_some("page")] {
                (self.label)
                @if let Some(count) = self.count.filter(|c| *c > 0) {
                    " "
                    span class="tab-count" aria-label=(format!("{count} items")) { (count) }
                }
            }
        }
    }
}

/// A group of tabs for navigation.
#[derive(Debug, Clone, Default)]
pub struct TabGroup<'a> {
    pub tabs: Vec<Tab>,
    pub style: TabStyle,
    /// Optional aria-label for accessibility
    pub aria_label: Option<&'a str>,
}

impl<'a> TabGroup<'a> {
    #[must_use]
    pub fn new(style: TabStyle) -> Self {
        Self {
            tabs: Vec::new(),
            style,
            aria_label: None,
        }
    }

    #[must_use]
    pub fn push_tab(mut self, tab: Tab) -> Self {
        self.tabs.push(tab);
        self
    }

    #[must_use]
    pub fn with_aria_label(mut self, label: &'a str) -> Self {
        self.aria_label = Some(label);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl Extend<Tab> for TabGroup<'_> {
    fn extend<I: IntoIterator<Item = Tab>>(&mut self, iter: I) {
        self.tabs.extend(iter);
    }
}

impl Render for TabGroup<'_> {
    fn render(&self) -> Markup {
        if self.tabs.is_empty() {
            return html! {};
        }
        html! {
            nav class=(self.style.group_class()) aria-label=[self.aria_label] {
                @for tab in &self.tabs {
                    (tab.render_with(self.style))
                }
            }
        }
    }
}
