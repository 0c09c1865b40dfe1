//! JSON seed import.
//!
//! A seed document bundles profiles, their content documents, article
//! summaries and the shared article corpus:
//!
//! ```json
//! {
//!   "figures": [
//!     { "id": "iu", "name": "IU", "occupation": ["Singer"],
//!       "content": { "main_overview": {...}, "timeline_content": {...} },
//!       "article_summaries": [ ... ] }
//!   ],
//!   "articles": [ ... ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::queries::{
    upsert_article, upsert_article_summary, upsert_figure_content, upsert_public_figure,
};
use crate::content::{Article, ArticleSummary, PublicFigure, PublicFigureContent};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub figures: Vec<SeedFigure>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedFigure {
    #[serde(flatten)]
    pub profile: PublicFigure,
    #[serde(default)]
    pub content: Option<PublicFigureContent>,
    #[serde(default)]
    pub article_summaries: Vec<ArticleSummary>,
}

/// Counts of imported documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub figures: usize,
    pub contents: usize,
    pub articles: usize,
    pub summaries: usize,
}

/// Import a parsed seed document. Existing documents with the same IDs are replaced.
///
/// # Errors
///
/// Returns an error if any write fails.
pub async fn import(pool: &SqlitePool, seed: &SeedData) -> Result<SeedStats> {
    let mut stats = SeedStats::default();

    for article in &seed.articles {
        upsert_article(pool, article)
            .await
            .with_context(|| format!("Failed to import article {}", article.id))?;
        stats.articles += 1;
    }

    for figure in &seed.figures {
        let id = &figure.profile.id;
        upsert_public_figure(pool, &figure.profile)
            .await
            .with_context(|| format!("Failed to import figure {id}"))?;
        stats.figures += 1;

        if let Some(content) = &figure.content {
            debug!(
                figure = %id,
                schema = content.timeline_content.schema_version(),
                "Importing timeline content"
            );
            upsert_figure_content(pool, id, content).await?;
            stats.contents += 1;
        }

        for summary in &figure.article_summaries {
            upsert_article_summary(pool, id, summary).await?;
            stats.summaries += 1;
        }
    }

    Ok(stats)
}

/// Read and import a seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a valid seed
/// document, or the import fails.
pub async fn import_file(pool: &SqlitePool, path: &Path) -> Result<SeedStats> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    let seed: SeedData = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid seed file: {}", path.display()))?;

    let stats = import(pool, &seed).await?;
    info!(
        path = %path.display(),
        figures = stats.figures,
        contents = stats.contents,
        articles = stats.articles,
        summaries = stats.summaries,
        "Seed imported"
    );
    Ok(stats)
}
