//! Browse page: search, occupation filters and a paginated figure grid.

use maud::{html, Markup};
use url::form_urlencoded;

use crate::components::{
    Alert, BaseLayout, EmptyState, FigureGrid, Pagination, Tab, TabGroup, TabStyle,
};
use crate::db::FigurePage;

/// Parameters for rendering the browse page.
#[derive(Debug, Clone)]
pub struct HomePageParams<'a> {
    pub page: &'a FigurePage,
    pub search: Option<&'a str>,
    /// Active occupation filters.
    pub categories: &'a [String],
    /// Known occupations with figure counts.
    pub occupations: &'a [(String, i64)],
    /// Banner shown when part of the page failed to load.
    pub error: Option<&'a str>,
}

/// Browse URL with the given search and occupation filters, on page 1.
fn browse_href(search: Option<&str>, categories: &[&str]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        serializer.append_pair("search", search);
    }
    for category in categories {
        serializer.append_pair("category", category);
    }
    let query = serializer.finish();
    if query.is_empty() {
        "/".to_string()
    } else {
        format!("/?{query}")
    }
}

/// Occupation chips; each toggles its occupation in the active set.
fn occupation_chips(params: &HomePageParams<'_>) -> TabGroup<'static> {
    let selected: Vec<&str> = params.categories.iter().map(String::as_str).collect();
    let mut group = TabGroup::new(TabStyle::Chips).with_aria_label("Occupations");

    group.extend(std::iter::once(
        Tab::new("All", browse_href(params.search, &[])).active_if(selected.is_empty()),
    ));

    group.extend(params.occupations.iter().map(|(occupation, count)| {
        let active = selected
            .iter()
            .any(|s| s.eq_ignore_ascii_case(occupation));
        let toggled: Vec<&str> = if active {
            selected
                .iter()
                .copied()
                .filter(|s| !s.eq_ignore_ascii_case(occupation))
                .collect()
        } else {
            selected
                .iter()
                .copied()
                .chain(std::iter::once(occupation.as_str()))
                .collect()
        };
        Tab::new(occupation.as_str(), browse_href(params.search, &toggled))
            .active_if(active)
            .with_count(usize::try_from(*count).unwrap_or(0))
    }));

    group
}

#[must_use]
pub fn render_home_page(params: &HomePageParams<'_>) -> Markup {
    let page = params.page;
    let total_pages = usize::try_from(page.total_pages()).unwrap_or(usize::MAX);
    let current = usize::try_from(page.page.max(1) - 1).unwrap_or(0);

    let pagination = Pagination::new(current, total_pages, "/")
        .with_search(params.search)
        .with_categories(params.categories);

    let content = html! {
        h1 { "Public Figures" }
        @if let Some(error) = params.error {
            (Alert::error(error))
        }
        (occupation_chips(params))
        p class="result-count" {
            (page.total)
            @if page.total == 1 { " figure" } @else { " figures" }
            @if let Some(search) = params.search.filter(|s| !s.is_empty()) {
                " matching \u{201c}" (search) "\u{201d}"
            }
        }
        @if page.figures.is_empty() {
            (EmptyState::no_results())
        } @else {
            (FigureGrid::new(&page.figures))
        }
        (pagination)
    };

    let mut layout = BaseLayout::new("Public Figures");
    if let Some(search) = params.search {
        layout = layout.with_search(search);
    }
    layout.render(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PublicFigure;

    fn figure(id: &str) -> PublicFigure {
        PublicFigure {
            id: id.to_string(),
            name: id.to_uppercase(),
            name_kr: String::new(),
            gender: String::new(),
            nationality: String::new(),
            occupation: vec!["Singer".to_string()],
            profile_pic: None,
            birth_date: None,
            is_group: false,
            group_name: None,
        }
    }

    #[test]
    fn test_browse_href() {
        assert_eq!(browse_href(None, &[]), "/");
        assert_eq!(browse_href(Some(""), &[]), "/");
        assert_eq!(
            browse_href(Some("iu lee"), &["Singer", "Actor"]),
            "/?search=iu+lee&category=Singer&category=Actor"
        );
    }

    #[test]
    fn test_render_home_with_filters() {
        let page = FigurePage {
            figures: vec![figure("iu"), figure("tw")],
            total: 40,
            page: 2,
            per_page: 18,
        };
        let categories = vec!["Singer".to_string()];
        let occupations = vec![("Singer".to_string(), 30), ("Actor".to_string(), 10)];
        let html = render_home_page(&HomePageParams {
            page: &page,
            search: Some("i"),
            categories: &categories,
            occupations: &occupations,
            error: None,
        })
        .into_string();

        assert!(html.contains("40 figures"));
        assert!(html.contains(r#"href="/figure/iu""#));
        // Active chip toggles itself off, inactive chip adds itself
        assert!(html.contains(r#"class="chip active" href="/?search=i""#));
        assert!(html.contains(r#"href="/?search=i&amp;category=Singer&amp;category=Actor""#));
        // Pagination keeps filters
        assert!(html.contains("search=i&amp;category=Singer&amp;page=3"));
    }

    #[test]
    fn test_render_home_empty_with_error() {
        let page = FigurePage {
            figures: Vec::new(),
            total: 0,
            page: 1,
            per_page: 18,
        };
        let html = render_home_page(&HomePageParams {
            page: &page,
            search: None,
            categories: &[],
            occupations: &[],
            error: Some("Occupation filters are unavailable."),
        })
        .into_string();

        assert!(html.contains("No results found."));
        assert!(html.contains("Occupation filters are unavailable."));
        assert!(!html.contains("pagination"));
    }
}
