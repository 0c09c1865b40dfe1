use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use url::form_urlencoded;

use super::pages::{self, FigurePageParams, HomePageParams, TimelineSection};
use super::AppState;
use crate::articles::{
    ArticleFetcher, ArticleLoader, LazyArticles, LoadOutcome, MAX_IDS_PER_REQUEST,
};
use crate::components::EventSources;
use crate::config::Config;
use crate::content::navigator::NavQuery;
use crate::content::normalize::{normalize, NormalizedTimeline};
use crate::content::sources::collect_event_source_ids;
use crate::content::{ArticleSummary, CuratedEvent};
use crate::db::{
    count_figures_by_occupation, get_article_summaries, get_articles_by_ids, get_figure_content,
    get_public_figure, list_public_figures, FigureFilter,
};

const SOURCES_NOTICE: &str =
    "Some sources could not be loaded. They will be retried as you scroll.";

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/figure/:id", get(figure_detail))
        .route("/healthz", get(health))
        .route("/api/public-figure-content/:id", get(api_figure_content))
        .route("/api/article-summaries", get(api_article_summaries))
        .route("/api/articles", get(api_articles))
}

// ========== Query Parsing ==========

/// Query parameters of the browse page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BrowseParams {
    search: Option<String>,
    categories: Vec<String>,
    page: u32,
}

impl BrowseParams {
    fn parse(raw: &str) -> Self {
        let mut params = Self {
            page: 1,
            ..Self::default()
        };
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "search" => params.search = Some(value.to_string()),
                "category" => {
                    if !params.categories.iter().any(|c| c.eq_ignore_ascii_case(value)) {
                        params.categories.push(value.to_string());
                    }
                }
                "page" => params.page = value.parse().unwrap_or(1).max(1),
                _ => {}
            }
        }
        params
    }
}

/// IDs from repeated `single_key` pairs, each taken whole, and from
/// comma-separated `list_key` values. Duplicates are dropped, first
/// occurrence wins.
fn id_list(raw: &str, single_key: &str, list_key: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let mut push = |id: &str| {
        let id = id.trim();
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    };
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        if key == single_key {
            push(&*value);
        } else if key == list_key {
            value.split(',').for_each(&mut push);
        }
    }
    ids
}

fn single_value(raw: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(raw.as_bytes())
        .find(|(k, v)| k == key && !v.trim().is_empty())
        .map(|(_, v)| v.trim().to_string())
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn not_found_page(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::render_not_found_page(message).into_string()),
    )
        .into_response()
}

// ========== HTML Routes ==========

async fn home(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let params = BrowseParams::parse(raw.as_deref().unwrap_or_default());
    let filter = FigureFilter {
        search: params.search.clone(),
        categories: params.categories.clone(),
        page: params.page,
        per_page: state.config.page_size,
    };

    let pool = state.db.pool();
    let (page, occupations) = tokio::join!(
        list_public_figures(pool, &filter),
        count_figures_by_occupation(pool)
    );

    let page = match page {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to list public figures: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let (occupations, error) = match occupations {
        Ok(o) => (o, None),
        Err(e) => {
            tracing::warn!("Failed to count occupations: {e:#}");
            (Vec::new(), Some("Occupation filters are unavailable right now."))
        }
    };

    let html = pages::render_home_page(&HomePageParams {
        page: &page,
        search: params.search.as_deref(),
        categories: &params.categories,
        occupations: &occupations,
        error,
    });
    Html(html.into_string()).into_response()
}

/// Resolve sources for the events inside the first render window.
///
/// Each event is observed with its own IDs as needed and the next event's
/// IDs as preload, then reported at its estimated distance below the
/// initial viewport. Events past the preload margin stay deferred.
async fn resolve_event_sources<F: ArticleFetcher>(
    lazy: &LazyArticles<usize, F>,
    events: &[CuratedEvent],
    config: &Config,
) -> (Vec<EventSources>, bool) {
    let ids: Vec<Vec<String>> = events
        .iter()
        .map(|e| collect_event_source_ids(e).into_vec())
        .collect();

    for (i, needed) in ids.iter().enumerate() {
        let preload = ids.get(i + 1).cloned().unwrap_or_default();
        lazy.observe(i, needed.clone(), preload);
    }

    let margins = lazy.margins();
    let mut triggered = vec![false; events.len()];
    let mut failed = false;
    for i in 0..events.len() {
        let top = u32::try_from(i)
            .unwrap_or(u32::MAX)
            .saturating_mul(config.event_height_px);
        let distance = top.saturating_sub(config.initial_viewport_px);
        if margins.classify(distance).is_none() {
            break;
        }
        triggered[i] = true;
        if let LoadOutcome::Failed(_) = lazy.on_distance(&i, distance).await {
            failed = true;
        }
    }

    let loader = lazy.loader();
    let sources = ids
        .iter()
        .zip(triggered)
        .map(|(needed, was_triggered)| {
            let resolved = loader.articles_for(needed);
            let complete = resolved.len() == needed.len() || (was_triggered && !failed);
            EventSources::from_lookup(needed, resolved, complete)
        })
        .collect();

    (sources, failed)
}

/// Legacy summaries come from the remote API when one is configured.
async fn load_summaries(
    state: &AppState,
    figure_id: &str,
    ids: &[String],
) -> anyhow::Result<Vec<ArticleSummary>> {
    match &state.content_api {
        Some(client) => Ok(client.article_summaries(figure_id, ids).await?),
        None => get_article_summaries(state.db.pool(), figure_id, ids).await,
    }
}

async fn figure_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawQuery(raw): RawQuery,
) -> Response {
    let pool = state.db.pool();
    let (figure, content) = match tokio::try_join!(
        get_public_figure(pool, &id),
        get_figure_content(pool, &id)
    ) {
        Ok((Some(figure), Some(content))) => (figure, content),
        Ok(_) => {
            return not_found_page(&format!("No public figure with ID \"{id}\"."));
        }
        Err(e) => {
            tracing::error!(figure = %id, "Failed to load figure: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let query = NavQuery::parse(raw.as_deref().unwrap_or_default());
    let normalized = normalize(&content.timeline_content, &query);
    tracing::debug!(
        figure = %id,
        schema = content.timeline_content.schema_version(),
        sources = normalized.source_ids.len(),
        "Rendering figure timeline"
    );

    let lazy: LazyArticles<usize, _> = LazyArticles::new(
        ArticleLoader::new(state.articles.clone()),
        state.config.visibility_margins(),
    );

    let overview_ids = &content.main_overview.article_ids;
    let mut sources_failed = matches!(
        lazy.loader().load_articles(overview_ids).await,
        LoadOutcome::Failed(_)
    );
    let overview_sources = lazy.loader().articles_for(overview_ids);

    let html = match &normalized.timeline {
        NormalizedTimeline::Curated(view) => {
            let (event_sources, failed) =
                resolve_event_sources(&lazy, &view.events, &state.config).await;
            sources_failed |= failed;
            pages::render_figure_page(&FigurePageParams {
                figure: &figure,
                overview: &content.main_overview,
                overview_sources: &overview_sources,
                timeline: TimelineSection::Curated {
                    view,
                    sources: &event_sources,
                },
                notice: sources_failed.then_some(SOURCES_NOTICE),
                margins: lazy.margins(),
            })
        }
        NormalizedTimeline::Legacy(sections) => {
            let ids = normalized.source_ids.as_slice();
            let summaries = match load_summaries(&state, &id, ids).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(figure = %id, "Failed to load article summaries: {e:#}");
                    Vec::new()
                }
            };
            pages::render_figure_page(&FigurePageParams {
                figure: &figure,
                overview: &content.main_overview,
                overview_sources: &overview_sources,
                timeline: TimelineSection::Legacy {
                    sections,
                    summaries: &summaries,
                },
                notice: sources_failed.then_some(SOURCES_NOTICE),
                margins: lazy.margins(),
            })
        }
    };

    lazy.unmount();
    Html(html.into_string()).into_response()
}

async fn health() -> &'static str {
    "OK"
}

// ========== JSON API ==========

async fn api_figure_content(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match get_figure_content(state.db.pool(), &id).await {
        Ok(Some(content)) => Json(content).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Public figure content not found"),
        Err(e) => {
            tracing::error!(figure = %id, "Failed to fetch figure content: {e:#}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

async fn api_article_summaries(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Response {
    let raw = raw.unwrap_or_default();
    let Some(figure_id) = single_value(&raw, "publicFigure") else {
        return json_error(StatusCode::BAD_REQUEST, "publicFigure is required");
    };
    let ids = id_list(&raw, "articleId", "articleIds");
    if ids.len() > MAX_IDS_PER_REQUEST {
        return json_error(StatusCode::BAD_REQUEST, "Too many article IDs");
    }

    match get_article_summaries(state.db.pool(), &figure_id, &ids).await {
        Ok(summaries) => Json(summaries).into_response(),
        Err(e) => {
            tracing::error!(figure = %figure_id, "Failed to fetch article summaries: {e:#}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

async fn api_articles(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let ids = id_list(raw.as_deref().unwrap_or_default(), "id", "ids");
    if ids.len() > MAX_IDS_PER_REQUEST {
        return json_error(StatusCode::BAD_REQUEST, "Too many article IDs");
    }

    match get_articles_by_ids(state.db.pool(), &ids).await {
        Ok(articles) => Json(articles).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch articles: {e:#}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
