use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::fts::sanitize_fts_query;
use super::models::{ArticleRow, ContentRow, FigureFilter, FigurePage, FigureRow, SummaryRow};
use crate::content::{Article, ArticleSummary, PublicFigure, PublicFigureContent};

// ========== Public Figures ==========

/// Insert or update a figure profile.
pub async fn upsert_public_figure(pool: &SqlitePool, figure: &PublicFigure) -> Result<()> {
    let occupation =
        serde_json::to_string(&figure.occupation).context("Failed to encode occupation")?;

    sqlx::query(
        r"
        INSERT INTO public_figures
            (id, name, name_kr, gender, nationality, occupation, profile_pic, birth_date, is_group, group_name)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            name_kr = excluded.name_kr,
            gender = excluded.gender,
            nationality = excluded.nationality,
            occupation = excluded.occupation,
            profile_pic = excluded.profile_pic,
            birth_date = excluded.birth_date,
            is_group = excluded.is_group,
            group_name = excluded.group_name,
            updated_at = datetime('now')
        ",
    )
    .bind(&figure.id)
    .bind(&figure.name)
    .bind(&figure.name_kr)
    .bind(&figure.gender)
    .bind(&figure.nationality)
    .bind(occupation)
    .bind(&figure.profile_pic)
    .bind(&figure.birth_date)
    .bind(figure.is_group)
    .bind(&figure.group_name)
    .execute(pool)
    .await
    .context("Failed to upsert public figure")?;

    Ok(())
}

/// Get a figure by ID.
pub async fn get_public_figure(pool: &SqlitePool, id: &str) -> Result<Option<PublicFigure>> {
    let row: Option<FigureRow> = sqlx::query_as(
        r"
        SELECT id, name, name_kr, gender, nationality, occupation,
               profile_pic, birth_date, is_group, group_name
        FROM public_figures
        WHERE id = ?
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch public figure")?;

    row.map(FigureRow::into_figure).transpose()
}

/// Append the shared `WHERE` clause of the browse queries.
fn push_figure_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &FigureFilter) {
    builder.push(" WHERE 1 = 1");

    let fts = filter
        .search
        .as_deref()
        .map(sanitize_fts_query)
        .unwrap_or_default();
    if !fts.is_empty() {
        builder.push(
            " AND f.rowid IN (SELECT rowid FROM public_figures_fts WHERE public_figures_fts MATCH ",
        );
        builder.push_bind(fts);
        builder.push(")");
    }

    let categories: Vec<String> = filter
        .categories
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();
    if !categories.is_empty() {
        builder.push(" AND EXISTS (SELECT 1 FROM json_each(f.occupation) o WHERE lower(o.value) IN (");
        let mut separated = builder.separated(", ");
        for category in categories {
            separated.push_bind(category);
        }
        separated.push_unseparated("))");
    }
}

/// List figures matching `filter`, ordered by name.
pub async fn list_public_figures(pool: &SqlitePool, filter: &FigureFilter) -> Result<FigurePage> {
    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM public_figures f");
    push_figure_filters(&mut count_query, filter);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .context("Failed to count public figures")?;

    let mut list_query = QueryBuilder::<Sqlite>::new(
        r"
        SELECT f.id, f.name, f.name_kr, f.gender, f.nationality, f.occupation,
               f.profile_pic, f.birth_date, f.is_group, f.group_name
        FROM public_figures f",
    );
    push_figure_filters(&mut list_query, filter);
    list_query.push(" ORDER BY f.name COLLATE NOCASE, f.id LIMIT ");
    list_query.push_bind(i64::from(filter.per_page));
    list_query.push(" OFFSET ");
    list_query.push_bind(filter.offset());

    let rows: Vec<FigureRow> = list_query
        .build_query_as()
        .fetch_all(pool)
        .await
        .context("Failed to list public figures")?;

    let figures = rows
        .into_iter()
        .map(FigureRow::into_figure)
        .collect::<Result<Vec<_>>>()?;

    Ok(FigurePage {
        figures,
        total,
        page: filter.page.max(1),
        per_page: filter.per_page,
    })
}

/// Distinct occupations with figure counts, most common first.
pub async fn count_figures_by_occupation(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    sqlx::query_as(
        r"
        SELECT o.value AS occupation, COUNT(DISTINCT f.id) AS figure_count
        FROM public_figures f, json_each(f.occupation) o
        GROUP BY o.value
        ORDER BY figure_count DESC, occupation
        ",
    )
    .fetch_all(pool)
    .await
    .context("Failed to count figures by occupation")
}

// ========== Figure Content ==========

/// Insert or replace the content document of a figure.
pub async fn upsert_figure_content(
    pool: &SqlitePool,
    figure_id: &str,
    content: &PublicFigureContent,
) -> Result<()> {
    let main_overview =
        serde_json::to_string(&content.main_overview).context("Failed to encode overview")?;
    let timeline_content = serde_json::to_string(&content.timeline_content)
        .context("Failed to encode timeline content")?;

    sqlx::query(
        r"
        INSERT INTO figure_content (figure_id, main_overview, timeline_content)
        VALUES (?, ?, ?)
        ON CONFLICT(figure_id) DO UPDATE SET
            main_overview = excluded.main_overview,
            timeline_content = excluded.timeline_content,
            updated_at = datetime('now')
        ",
    )
    .bind(figure_id)
    .bind(main_overview)
    .bind(timeline_content)
    .execute(pool)
    .await
    .context("Failed to upsert figure content")?;

    Ok(())
}

/// Get the content document of a figure.
pub async fn get_figure_content(
    pool: &SqlitePool,
    figure_id: &str,
) -> Result<Option<PublicFigureContent>> {
    let row: Option<ContentRow> = sqlx::query_as(
        "SELECT figure_id, main_overview, timeline_content FROM figure_content WHERE figure_id = ?",
    )
    .bind(figure_id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch figure content")?;

    row.map(ContentRow::into_content).transpose()
}

// ========== Articles ==========

/// Insert or update an article.
pub async fn upsert_article(pool: &SqlitePool, article: &Article) -> Result<()> {
    let image_urls =
        serde_json::to_string(&article.image_urls).context("Failed to encode image urls")?;

    sqlx::query(
        r"
        INSERT INTO articles (id, title, sub_title, body, source, send_date, link, image_urls)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            sub_title = excluded.sub_title,
            body = excluded.body,
            source = excluded.source,
            send_date = excluded.send_date,
            link = excluded.link,
            image_urls = excluded.image_urls
        ",
    )
    .bind(&article.id)
    .bind(&article.title)
    .bind(&article.sub_title)
    .bind(&article.body)
    .bind(&article.source)
    .bind(&article.send_date)
    .bind(&article.link)
    .bind(image_urls)
    .execute(pool)
    .await
    .context("Failed to upsert article")?;

    Ok(())
}

/// Resolve articles by ID.
///
/// The result follows the order of `ids`; unknown IDs are skipped and
/// duplicates resolve once.
pub async fn get_articles_by_ids(pool: &SqlitePool, ids: &[String]) -> Result<Vec<Article>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, title, sub_title, body, source, send_date, link, image_urls FROM articles WHERE id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let rows: Vec<ArticleRow> = builder
        .build_query_as()
        .fetch_all(pool)
        .await
        .context("Failed to fetch articles")?;

    let mut by_id = rows
        .into_iter()
        .map(|row| row.into_article().map(|a| (a.id.clone(), a)))
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

// ========== Article Summaries ==========

/// Insert or update an article summary filed under `figure_id`.
pub async fn upsert_article_summary(
    pool: &SqlitePool,
    figure_id: &str,
    summary: &ArticleSummary,
) -> Result<()> {
    let event_contents = serde_json::to_string(&summary.event_contents)
        .context("Failed to encode event contents")?;

    sqlx::query(
        r"
        INSERT INTO article_summaries
            (public_figure, id, category, sub_category, title, content, event_contents)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(public_figure, id) DO UPDATE SET
            category = excluded.category,
            sub_category = excluded.sub_category,
            title = excluded.title,
            content = excluded.content,
            event_contents = excluded.event_contents
        ",
    )
    .bind(figure_id)
    .bind(&summary.id)
    .bind(&summary.category)
    .bind(&summary.sub_category)
    .bind(&summary.title)
    .bind(&summary.content)
    .bind(event_contents)
    .execute(pool)
    .await
    .context("Failed to upsert article summary")?;

    Ok(())
}

/// Summaries of `figure_id` for the given article IDs, in the order of `ids`.
pub async fn get_article_summaries(
    pool: &SqlitePool,
    figure_id: &str,
    ids: &[String],
) -> Result<Vec<ArticleSummary>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        r"
        SELECT id, category, sub_category, title, content, event_contents
        FROM article_summaries
        WHERE public_figure = ",
    );
    builder.push_bind(figure_id);
    builder.push(" AND id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let rows: Vec<SummaryRow> = builder
        .build_query_as()
        .fetch_all(pool)
        .await
        .context("Failed to fetch article summaries")?;

    let mut by_id = rows
        .into_iter()
        .map(|row| row.into_summary().map(|s| (s.id.clone(), s)))
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;
    use crate::content::{LegacyTimeline, MainOverview, TimelineContent, WikiContentItem};
    use crate::db::Database;

    async fn test_db() -> (Database, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(&dir.path().join("test.sqlite")).await.unwrap();
        (db, dir)
    }

    fn figure(id: &str, name: &str, occupation: &[&str]) -> PublicFigure {
        PublicFigure {
            id: id.to_string(),
            name: name.to_string(),
            name_kr: String::new(),
            gender: "Female".to_string(),
            nationality: "South Korea".to_string(),
            occupation: occupation.iter().map(|o| (*o).to_string()).collect(),
            profile_pic: None,
            birth_date: None,
            is_group: false,
            group_name: None,
        }
    }

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Article {id}"),
            sub_title: String::new(),
            body: "body".to_string(),
            source: "Yonhap".to_string(),
            send_date: "20210101".to_string(),
            link: String::new(),
            image_urls: vec!["https://img.example/1.jpg".to_string()],
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[tokio::test]
    async fn test_figure_roundtrip_and_update() {
        let (db, _dir) = test_db().await;
        let mut iu = figure("iu", "IU", &["Singer", "Actor"]);
        upsert_public_figure(db.pool(), &iu).await.unwrap();

        iu.name_kr = "아이유".to_string();
        upsert_public_figure(db.pool(), &iu).await.unwrap();

        let loaded = get_public_figure(db.pool(), "iu").await.unwrap().unwrap();
        assert_eq!(loaded, iu);
        assert!(get_public_figure(db.pool(), "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let (db, _dir) = test_db().await;
        upsert_public_figure(db.pool(), &figure("iu", "IU", &["Singer", "Actor"]))
            .await
            .unwrap();
        upsert_public_figure(db.pool(), &figure("sjk", "Song Joong-ki", &["Actor"]))
            .await
            .unwrap();
        upsert_public_figure(db.pool(), &figure("tw", "Taeyeon", &["Singer"]))
            .await
            .unwrap();

        let all = list_public_figures(
            db.pool(),
            &FigureFilter {
                page: 1,
                per_page: 2,
                ..FigureFilter::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.figures.len(), 2);
        assert_eq!(all.total_pages(), 2);
        assert_eq!(all.figures[0].id, "iu");

        let actors = list_public_figures(
            db.pool(),
            &FigureFilter {
                categories: vec!["actor".to_string()],
                page: 1,
                per_page: 10,
                ..FigureFilter::default()
            },
        )
        .await
        .unwrap();
        let actor_ids: Vec<_> = actors.figures.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(actor_ids, vec!["iu", "sjk"]);

        let search = list_public_figures(
            db.pool(),
            &FigureFilter {
                search: Some("tae".to_string()),
                page: 1,
                per_page: 10,
                ..FigureFilter::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(search.total, 1);
        assert_eq!(search.figures[0].id, "tw");

        let counts = count_figures_by_occupation(db.pool()).await.unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|(_, c)| *c == 2));
    }

    #[tokio::test]
    async fn test_search_sees_updates() {
        let (db, _dir) = test_db().await;
        let mut f = figure("a", "Old Name", &["Singer"]);
        upsert_public_figure(db.pool(), &f).await.unwrap();
        f.name = "Fresh Name".to_string();
        upsert_public_figure(db.pool(), &f).await.unwrap();

        let filter = |q: &str| FigureFilter {
            search: Some(q.to_string()),
            page: 1,
            per_page: 10,
            ..FigureFilter::default()
        };
        assert_eq!(list_public_figures(db.pool(), &filter("fresh")).await.unwrap().total, 1);
        assert_eq!(list_public_figures(db.pool(), &filter("old")).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_content_roundtrip() {
        let (db, _dir) = test_db().await;
        upsert_public_figure(db.pool(), &figure("iu", "IU", &["Singer"]))
            .await
            .unwrap();
        let content = PublicFigureContent {
            main_overview: MainOverview {
                id: "iu".to_string(),
                content: "Overview".to_string(),
                article_ids: ids(&["a1"]),
            },
            timeline_content: TimelineContent::Legacy(LegacyTimeline {
                category_content: vec![WikiContentItem {
                    id: "c1".to_string(),
                    category: "Career".to_string(),
                    subcategory: None,
                    content: "Debut".to_string(),
                    article_ids: ids(&["a1", "a2"]),
                }],
            }),
        };
        upsert_figure_content(db.pool(), "iu", &content).await.unwrap();

        let loaded = get_figure_content(db.pool(), "iu").await.unwrap().unwrap();
        assert_eq!(loaded, content);
        assert!(get_figure_content(db.pool(), "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_articles_by_ids_follow_request_order() {
        let (db, _dir) = test_db().await;
        for id in ["a", "b", "c"] {
            upsert_article(db.pool(), &article(id)).await.unwrap();
        }

        let found = get_articles_by_ids(db.pool(), &ids(&["c", "missing", "a", "c"]))
            .await
            .unwrap();
        let found_ids: Vec<_> = found.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(found_ids, vec!["c", "a"]);
        assert_eq!(found[0].image_urls.len(), 1);
        assert!(get_articles_by_ids(db.pool(), &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summaries_scoped_to_figure() {
        let (db, _dir) = test_db().await;
        upsert_public_figure(db.pool(), &figure("iu", "IU", &["Singer"]))
            .await
            .unwrap();
        upsert_public_figure(db.pool(), &figure("tw", "Taeyeon", &["Singer"]))
            .await
            .unwrap();

        let mut event_contents = BTreeMap::new();
        event_contents.insert("2021-03-25".to_string(), "Released LILAC".to_string());
        let summary = ArticleSummary {
            id: "a1".to_string(),
            event_contents,
            sub_category: "Music".to_string(),
            category: "Career".to_string(),
            content: "Summary".to_string(),
            title: "LILAC".to_string(),
        };
        upsert_article_summary(db.pool(), "iu", &summary).await.unwrap();

        let found = get_article_summaries(db.pool(), "iu", &ids(&["a1", "a2"]))
            .await
            .unwrap();
        assert_eq!(found, vec![summary]);
        assert!(get_article_summaries(db.pool(), "tw", &ids(&["a1"]))
            .await
            .unwrap()
            .is_empty());
    }
}
