//! Card components for public figures and source articles.

use maud::{html, Markup, Render};
use urlencoding::encode;

use crate::content::{Article, PublicFigure};

/// Link to a figure's timeline page.
#[must_use]
pub fn figure_href(id: &str) -> String {
    format!("/figure/{}", encode(id))
}

/// A profile card on the browse page.
///
/// # Example
///
/// ```ignore
/// use crate::components::card::FigureCard;
///
/// let card = FigureCard::new(&figure);
/// ```
#[derive(Debug, Clone)]
pub struct FigureCard<'a> {
    pub figure: &'a PublicFigure,
}

impl<'a> FigureCard<'a> {
    #[must_use]
    pub const fn new(figure: &'a PublicFigure) -> Self {
        Self { figure }
    }
}

impl Render for FigureCard<'_> {
    fn render(&self) -> Markup {
        let figure = self.figure;
        let href = figure_href(&figure.id);

        html! {
            article class="figure-card" {
                @if let Some(pic) = &figure.profile_pic {
                    img class="figure-thumb" src=(pic) alt=(figure.name) loading="lazy";
                }
                h3 {
                    a href=(href) { (figure.name) }
                    @if !figure.name_kr.is_empty() {
                        " "
                        small class="name-kr" { (figure.name_kr) }
                    }
                }
                @if !figure.occupation.is_empty() {
                    p class="meta occupations" {
                        @for occupation in &figure.occupation {
                            span class="occupation" { (occupation) }
                        }
                    }
                }
                @if let Some(group) = &figure.group_name {
                    p class="meta group" { (group) }
                }
            }
        }
    }
}

/// A grid of figure cards.
#[derive(Debug, Clone)]
pub struct FigureGrid<'a> {
    pub figures: &'a [PublicFigure],
}

impl<'a> FigureGrid<'a> {
    #[must_use]
    pub const fn new(figures: &'a [PublicFigure]) -> Self {
        Self { figures }
    }
}

impl Render for FigureGrid<'_> {
    fn render(&self) -> Markup {
        html! {
            div class="figure-grid" {
                @for figure in self.figures {
                    (FigureCard::new(figure))
                }
            }
        }
    }
}

/// Placeholder text for an empty list.
#[derive(Debug, Clone)]
pub struct EmptyState<'a> {
    pub message: &'a str,
}

impl<'a> EmptyState<'a> {
    #[must_use]
    pub const fn new(message: &'a str) -> Self {
        Self { message }
    }

    #[must_use]
    pub const fn no_results() -> Self {
        Self {
            message: "No results found.",
        }
    }
}

impl Render for EmptyState<'_> {
    fn render(&self) -> Markup {
        html! {
            p class="empty-state" { (self.message) }
        }
    }
}

/// A compact source article entry.
#[derive(Debug, Clone)]
pub struct ArticleCard<'a> {
    pub article: &'a Article,
}

impl<'a> ArticleCard<'a> {
    #[must_use]
    pub const fn new(article: &'a Article) -> Self {
        Self { article }
    }
}

impl Render for ArticleCard<'_> {
    fn render(&self) -> Markup {
        let article = self.article;
        let title = if article.title.is_empty() {
            "Untitled"
        } else {
            article.title.as_str()
        };

        html! {
            li class="source-article" data-article-id=(article.id) {
                @if article.link.is_empty() {
                    span class="source-title" { (title) }
                } @else {
                    a class="source-title" href=(article.link) target="_blank" rel="noopener noreferrer" {
                        (title)
                    }
                }
                @if !article.source.is_empty() || !article.send_date.is_empty() {
                    " "
                    small class="meta" {
                        (article.source)
                        @if !article.source.is_empty() && !article.send_date.is_empty() {
                            " · "
                        }
                        (article.send_date)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_figure() -> PublicFigure {
        PublicFigure {
            id: "iu".to_string(),
            name: "IU".to_string(),
            name_kr: "아이유".to_string(),
            gender: "Female".to_string(),
            nationality: "South Korea".to_string(),
            occupation: vec!["Singer".to_string(), "Actor".to_string()],
            profile_pic: Some("https://img.example/iu.jpg".to_string()),
            birth_date: None,
            is_group: false,
            group_name: None,
        }
    }

    #[test]
    fn test_figure_card() {
        let figure = sample_figure();
        let html = FigureCard::new(&figure).render().into_string();

        assert!(html.contains("figure-card"));
        assert!(html.contains(r#"href="/figure/iu""#));
        assert!(html.contains("아이유"));
        assert!(html.contains(r#"<span class="occupation">Singer</span>"#));
        assert!(html.contains("figure-thumb"));
        assert!(!html.contains("meta group"));
    }

    #[test]
    fn test_figure_href_encodes_id() {
        assert_eq!(figure_href("new jeans"), "/figure/new%20jeans");
    }

    #[test]
    fn test_figure_grid_empty() {
        let html = FigureGrid::new(&[]).render().into_string();
        assert!(html.contains("figure-grid"));
        assert!(!html.contains("figure-card"));
    }

    #[test]
    fn test_empty_state() {
        let html = EmptyState::no_results().render().into_string();
        assert!(html.contains("No results found."));
    }

    #[test]
    fn test_article_card() {
        let article = Article {
            id: "a1".to_string(),
            title: "IU releases LILAC".to_string(),
            sub_title: String::new(),
            body: String::new(),
            source: "Yonhap".to_string(),
            send_date: "20210325".to_string(),
            link: "https://news.example/a1".to_string(),
            image_urls: Vec::new(),
        };
        let html = ArticleCard::new(&article).render().into_string();

        assert!(html.contains(r#"data-article-id="a1""#));
        assert!(html.contains(r#"href="https://news.example/a1""#));
        assert!(html.contains("Yonhap · 20210325"));
    }
}
