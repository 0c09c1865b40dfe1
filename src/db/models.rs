use anyhow::{Context, Result};
use serde::Serialize;

use crate::content::{
    Article, ArticleSummary, MainOverview, PublicFigure, PublicFigureContent, TimelineContent,
};

/// A `public_figures` row with its JSON columns still encoded.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FigureRow {
    pub id: String,
    pub name: String,
    pub name_kr: String,
    pub gender: String,
    pub nationality: String,
    pub occupation: String,
    pub profile_pic: Option<String>,
    pub birth_date: Option<String>,
    pub is_group: bool,
    pub group_name: Option<String>,
}

impl FigureRow {
    /// Decode into the domain type.
    ///
    /// # Errors
    ///
    /// Returns an error if the occupation column is not a JSON string array.
    pub fn into_figure(self) -> Result<PublicFigure> {
        let occupation: Vec<String> = serde_json::from_str(&self.occupation)
            .with_context(|| format!("Invalid occupation JSON for figure {}", self.id))?;
        Ok(PublicFigure {
            id: self.id,
            name: self.name,
            name_kr: self.name_kr,
            gender: self.gender,
            nationality: self.nationality,
            occupation,
            profile_pic: self.profile_pic,
            birth_date: self.birth_date,
            is_group: self.is_group,
            group_name: self.group_name,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContentRow {
    pub figure_id: String,
    pub main_overview: String,
    pub timeline_content: String,
}

impl ContentRow {
    /// Decode both JSON documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document does not match its schema.
    pub fn into_content(self) -> Result<PublicFigureContent> {
        let main_overview: MainOverview = serde_json::from_str(&self.main_overview)
            .with_context(|| format!("Invalid main overview for figure {}", self.figure_id))?;
        let timeline_content: TimelineContent = serde_json::from_str(&self.timeline_content)
            .with_context(|| format!("Invalid timeline content for figure {}", self.figure_id))?;
        Ok(PublicFigureContent {
            main_overview,
            timeline_content,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: String,
    pub title: String,
    pub sub_title: String,
    pub body: String,
    pub source: String,
    pub send_date: String,
    pub link: String,
    pub image_urls: String,
}

impl ArticleRow {
    /// # Errors
    ///
    /// Returns an error if `image_urls` is not a JSON string array.
    pub fn into_article(self) -> Result<Article> {
        let image_urls: Vec<String> = serde_json::from_str(&self.image_urls)
            .with_context(|| format!("Invalid image_urls JSON for article {}", self.id))?;
        Ok(Article {
            id: self.id,
            title: self.title,
            sub_title: self.sub_title,
            body: self.body,
            source: self.source,
            send_date: self.send_date,
            link: self.link,
            image_urls,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SummaryRow {
    pub id: String,
    pub category: String,
    pub sub_category: String,
    pub title: String,
    pub content: String,
    pub event_contents: String,
}

impl SummaryRow {
    /// # Errors
    ///
    /// Returns an error if `event_contents` is not a JSON object of strings.
    pub fn into_summary(self) -> Result<ArticleSummary> {
        let event_contents = serde_json::from_str(&self.event_contents)
            .with_context(|| format!("Invalid event_contents JSON for summary {}", self.id))?;
        Ok(ArticleSummary {
            id: self.id,
            event_contents,
            sub_category: self.sub_category,
            category: self.category,
            content: self.content,
            title: self.title,
        })
    }
}

/// Filters for the figure browse page.
#[derive(Debug, Clone, Default)]
pub struct FigureFilter {
    /// Free-text search over names, occupations and group names.
    pub search: Option<String>,
    /// Occupations; a figure matches if it has any of them (case-insensitive).
    pub categories: Vec<String>,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl FigureFilter {
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * i64::from(self.per_page)
    }
}

/// One page of figures plus the total matching count.
#[derive(Debug, Clone, Serialize)]
pub struct FigurePage {
    pub figures: Vec<PublicFigure>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl FigurePage {
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let pages = u64::try_from(self.total)
            .unwrap_or(0)
            .div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}
